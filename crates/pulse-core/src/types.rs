use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A forum post: title plus free-text body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Post {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A ticker with its mention count, ordered by the ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub ticker: String,
    pub mentions: u64,
}

/// The market fields required to publish a ticker. All four must be present;
/// a provider that cannot supply one of them supplies none of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketFields {
    pub industry: String,
    pub previous_close: f64,
    pub fifty_day_average: f64,
    pub average_daily_volume_10d: i64,
}

/// One published row of a ranked snapshot.
///
/// Within a snapshot, ranks are a contiguous 1-based sequence and every entry
/// shares the same `captured_at`. `rank_change` is positive when the ticker
/// moved toward rank 1 since the previous snapshot; a ticker absent from the
/// previous snapshot has `is_new = true` and `rank_change = 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub rank: i64,
    pub ticker: String,
    pub name: String,
    pub mentions: i64,
    pub industry: String,
    pub previous_close: f64,
    pub fifty_day_average: f64,
    pub average_daily_volume_10d: i64,
    pub captured_at: DateTime<Utc>,
    pub is_new: bool,
    pub rank_change: i64,
}
