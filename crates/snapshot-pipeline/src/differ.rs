//! Rank movement against the previous stored snapshot.

use chrono::{DateTime, Utc};
use pulse_core::{PulseResult, SnapshotStore};

/// Movement of one ticker relative to the previous snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankDelta {
    pub is_new: bool,
    /// Signed rank movement: positive means the ticker moved toward rank 1
    /// ("up"), negative means it slid down. Always 0 for new entrants.
    pub rank_change: i64,
}

/// Compare a ticker's current 1-based rank against its position in the
/// previous snapshot's ticker list (also rank-ordered).
pub fn rank_delta(previous: &[String], ticker: &str, current_rank: i64) -> RankDelta {
    match previous.iter().position(|t| t == ticker) {
        Some(index) => {
            let previous_rank = index as i64 + 1;
            RankDelta {
                is_new: false,
                rank_change: previous_rank - current_rank,
            }
        }
        None => RankDelta {
            is_new: true,
            rank_change: 0,
        },
    }
}

/// Ticker list of the most recent snapshot captured at or before `now`, in
/// rank order. Empty on the first-ever run.
pub async fn previous_tickers<S: SnapshotStore + ?Sized>(
    store: &S,
    now: DateTime<Utc>,
) -> PulseResult<Vec<String>> {
    let Some(captured_at) = store.latest_captured_at(now).await? else {
        return Ok(Vec::new());
    };

    let entries = store.entries_at(captured_at).await?;
    Ok(entries.into_iter().map(|e| e.ticker).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prev(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn absent_ticker_is_new_with_zero_change() {
        let delta = rank_delta(&prev(&["GME", "AMC"]), "BB", 3);

        assert!(delta.is_new);
        assert_eq!(delta.rank_change, 0);
    }

    #[test]
    fn moving_toward_rank_one_is_positive() {
        // AMC was #2, now #1
        let delta = rank_delta(&prev(&["GME", "AMC"]), "AMC", 1);

        assert!(!delta.is_new);
        assert_eq!(delta.rank_change, 1);
    }

    #[test]
    fn sliding_down_is_negative() {
        // GME was #1, now #2
        let delta = rank_delta(&prev(&["GME", "AMC"]), "GME", 2);

        assert!(!delta.is_new);
        assert_eq!(delta.rank_change, -1);
    }

    #[test]
    fn unchanged_rank_is_zero() {
        let delta = rank_delta(&prev(&["GME", "AMC"]), "GME", 1);

        assert!(!delta.is_new);
        assert_eq!(delta.rank_change, 0);
    }

    #[test]
    fn empty_previous_snapshot_marks_everything_new() {
        let delta = rank_delta(&[], "GME", 1);

        assert!(delta.is_new);
        assert_eq!(delta.rank_change, 0);
    }

    #[test]
    fn deltas_are_idempotent_for_fixed_inputs() {
        let previous = prev(&["GME", "AMC", "BB"]);

        let first = rank_delta(&previous, "BB", 1);
        let second = rank_delta(&previous, "BB", 1);

        assert_eq!(first, second);
        assert_eq!(first.rank_change, 2);
    }
}
