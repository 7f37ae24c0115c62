use std::collections::HashMap;

use pulse_core::RankedCandidate;

/// Order mention counts into a candidate list.
///
/// Sorted by count descending; equal counts order by ticker symbol ascending
/// so the result is reproducible across runs and platforms. Truncated to
/// `candidate_width`, which is sized wider than the published snapshot so
/// downstream enrichment failures can be absorbed.
pub fn rank_mentions(counts: &HashMap<String, u64>, candidate_width: usize) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = counts
        .iter()
        .map(|(ticker, &mentions)| RankedCandidate {
            ticker: ticker.clone(),
            mentions,
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.mentions
            .cmp(&a.mentions)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    candidates.truncate(candidate_width);
    candidates
}
