//! Joins ranked candidates, catalog names, market fields and rank deltas
//! into the rows that get persisted.

use chrono::{DateTime, Utc};
use pulse_core::{MarketDataProvider, RankedCandidate, SnapshotEntry};
use ticker_catalog::TickerCatalog;

use crate::differ::rank_delta;

/// A built snapshot plus the candidates that enrichment dropped.
#[derive(Debug)]
pub struct BuiltSnapshot {
    pub entries: Vec<SnapshotEntry>,
    pub skipped: Vec<String>,
}

/// Enrich candidates in rank order until `output_width` entries exist or
/// candidates run out.
///
/// A candidate whose market fields cannot be fully supplied is dropped
/// without consuming an output slot; the next candidate inherits its rank.
/// Coming up short of `output_width` is accepted. Every entry carries
/// `captured_at` and its movement against `previous` (the prior snapshot's
/// ticker list in rank order).
pub async fn build_snapshot<M: MarketDataProvider + ?Sized>(
    candidates: &[RankedCandidate],
    catalog: &TickerCatalog,
    provider: &M,
    previous: &[String],
    captured_at: DateTime<Utc>,
    output_width: usize,
) -> BuiltSnapshot {
    let mut entries: Vec<SnapshotEntry> = Vec::with_capacity(output_width);
    let mut skipped = Vec::new();

    for candidate in candidates {
        if entries.len() >= output_width {
            break;
        }

        let fields = match provider.market_fields(&candidate.ticker).await {
            Ok(Some(fields)) => fields,
            Ok(None) => {
                tracing::warn!("No complete market data for {}, skipping", candidate.ticker);
                skipped.push(candidate.ticker.clone());
                continue;
            }
            Err(e) => {
                tracing::warn!("Market data lookup failed for {}: {}", candidate.ticker, e);
                skipped.push(candidate.ticker.clone());
                continue;
            }
        };

        let rank = entries.len() as i64 + 1;
        let delta = rank_delta(previous, &candidate.ticker, rank);

        entries.push(SnapshotEntry {
            rank,
            ticker: candidate.ticker.clone(),
            name: catalog
                .name_of(&candidate.ticker)
                .unwrap_or(&candidate.ticker)
                .to_string(),
            mentions: candidate.mentions as i64,
            industry: fields.industry,
            previous_close: fields.previous_close,
            fifty_day_average: fields.fifty_day_average,
            average_daily_volume_10d: fields.average_daily_volume_10d,
            captured_at,
            is_new: delta.is_new,
            rank_change: delta.rank_change,
        });
    }

    BuiltSnapshot { entries, skipped }
}
