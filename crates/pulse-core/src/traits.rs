use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{MarketFields, Post, PulseResult, SnapshotEntry};

/// Trait for forum post sources
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch up to `limit` currently-trending posts, most prominent first.
    async fn hot_posts(&self, limit: usize) -> PulseResult<Vec<Post>>;
}

/// Trait for market data providers
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the required market fields for a ticker. `Ok(None)` means the
    /// provider has no complete data for this symbol; `Err` means the
    /// provider itself failed. Callers treat both as "skip this ticker".
    async fn market_fields(&self, ticker: &str) -> PulseResult<Option<MarketFields>>;
}

/// Trait for the append-only snapshot store
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert one snapshot's entries atomically. All rows or none.
    async fn insert_snapshot(&self, entries: &[SnapshotEntry]) -> PulseResult<()>;

    /// The most recent capture timestamp at or before `before`, if any
    /// snapshot has been stored.
    async fn latest_captured_at(
        &self,
        before: DateTime<Utc>,
    ) -> PulseResult<Option<DateTime<Utc>>>;

    /// All entries captured at exactly `captured_at`, ordered by rank.
    async fn entries_at(&self, captured_at: DateTime<Utc>) -> PulseResult<Vec<SnapshotEntry>>;
}
