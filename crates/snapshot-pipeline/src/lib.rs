//! Single-run orchestration: posts -> mention counts -> ranked candidates ->
//! enriched, history-diffed snapshot -> store.

pub mod builder;
pub mod differ;

pub use builder::{build_snapshot, BuiltSnapshot};
pub use differ::{previous_tickers, rank_delta, RankDelta};

use chrono::{DateTime, Utc};
use mention_scanner::{count_mentions, rank_mentions};
use pulse_core::{MarketDataProvider, PostSource, PulseError, PulseResult, SnapshotEntry, SnapshotStore};
use ticker_catalog::{Blacklist, TickerCatalog};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How many hot posts to scan.
    pub post_limit: usize,
    /// Candidate width W: tickers considered for enrichment.
    pub candidate_width: usize,
    /// Output width K: entries published per snapshot. W > K so enrichment
    /// failures can be absorbed without shortening the snapshot.
    pub output_width: usize,
    /// Build and log the snapshot but skip the store.
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            post_limit: 500,
            candidate_width: 20,
            output_width: 10,
            dry_run: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> PulseResult<()> {
        if self.post_limit == 0 {
            return Err(PulseError::Config("post_limit must be positive".to_string()));
        }
        if self.output_width == 0 {
            return Err(PulseError::Config("output_width must be positive".to_string()));
        }
        if self.candidate_width <= self.output_width {
            return Err(PulseError::Config(format!(
                "candidate_width ({}) must exceed output_width ({})",
                self.candidate_width, self.output_width
            )));
        }
        Ok(())
    }
}

/// What one run did.
#[derive(Debug)]
pub struct RunSummary {
    pub captured_at: DateTime<Utc>,
    pub posts_scanned: usize,
    pub distinct_tickers: usize,
    pub entries: Vec<SnapshotEntry>,
    pub skipped: Vec<String>,
    pub persisted: bool,
}

pub struct Pipeline<P, M, S> {
    posts: P,
    market: M,
    store: S,
    config: PipelineConfig,
}

impl<P, M, S> Pipeline<P, M, S>
where
    P: PostSource,
    M: MarketDataProvider,
    S: SnapshotStore,
{
    pub fn new(posts: P, market: M, store: S, config: PipelineConfig) -> PulseResult<Self> {
        config.validate()?;
        Ok(Self {
            posts,
            market,
            store,
            config,
        })
    }

    /// Execute one full scan-rank-enrich-diff-persist cycle.
    ///
    /// Post source and store failures abort the run; nothing partial is ever
    /// written. Enrichment failures only narrow the snapshot.
    pub async fn run_once(
        &self,
        catalog: &TickerCatalog,
        blacklist: &Blacklist,
    ) -> PulseResult<RunSummary> {
        let captured_at = Utc::now();

        let posts = self.posts.hot_posts(self.config.post_limit).await?;
        tracing::info!("Scanning {} posts for ticker mentions", posts.len());

        let counts = count_mentions(&posts, catalog, blacklist);
        let candidates = rank_mentions(&counts, self.config.candidate_width);
        tracing::info!(
            "{} distinct tickers mentioned, {} candidates for enrichment",
            counts.len(),
            candidates.len()
        );

        let previous = previous_tickers(&self.store, captured_at).await?;
        if previous.is_empty() {
            tracing::info!("No previous snapshot; every entry will be marked new");
        }

        let built = build_snapshot(
            &candidates,
            catalog,
            &self.market,
            &previous,
            captured_at,
            self.config.output_width,
        )
        .await;

        if built.entries.len() < self.config.output_width {
            tracing::warn!(
                "Snapshot is short: {} of {} entries",
                built.entries.len(),
                self.config.output_width
            );
        }

        let persisted = if self.config.dry_run {
            tracing::info!("Dry run, skipping store");
            false
        } else {
            self.store.insert_snapshot(&built.entries).await?;
            true
        };

        Ok(RunSummary {
            captured_at,
            posts_scanned: posts.len(),
            distinct_tickers: counts.len(),
            entries: built.entries,
            skipped: built.skipped,
            persisted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pulse_core::{MarketFields, Post};
    use std::sync::Mutex;

    /// Serves one queued batch of posts per call.
    struct FakePosts {
        batches: Mutex<Vec<Vec<Post>>>,
    }

    impl FakePosts {
        fn with_batches(batches: Vec<Vec<Post>>) -> Self {
            Self {
                batches: Mutex::new(batches),
            }
        }

        fn with_posts(posts: Vec<Post>) -> Self {
            Self::with_batches(vec![posts])
        }
    }

    #[async_trait]
    impl PostSource for FakePosts {
        async fn hot_posts(&self, limit: usize) -> PulseResult<Vec<Post>> {
            let mut batches = self.batches.lock().unwrap();
            let batch = if batches.is_empty() {
                Vec::new()
            } else {
                batches.remove(0)
            };
            Ok(batch.into_iter().take(limit).collect())
        }
    }

    struct FakeMarket;

    #[async_trait]
    impl MarketDataProvider for FakeMarket {
        async fn market_fields(&self, _ticker: &str) -> PulseResult<Option<MarketFields>> {
            Ok(Some(MarketFields {
                industry: "Specialty Retail".to_string(),
                previous_close: 10.0,
                fifty_day_average: 11.0,
                average_daily_volume_10d: 1_000_000,
            }))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<SnapshotEntry>>,
    }

    #[async_trait]
    impl SnapshotStore for MemoryStore {
        async fn insert_snapshot(&self, entries: &[SnapshotEntry]) -> PulseResult<()> {
            self.rows.lock().unwrap().extend_from_slice(entries);
            Ok(())
        }

        async fn latest_captured_at(
            &self,
            before: DateTime<Utc>,
        ) -> PulseResult<Option<DateTime<Utc>>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.captured_at)
                .filter(|ts| *ts <= before)
                .max())
        }

        async fn entries_at(&self, captured_at: DateTime<Utc>) -> PulseResult<Vec<SnapshotEntry>> {
            let mut entries: Vec<SnapshotEntry> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.captured_at == captured_at)
                .cloned()
                .collect();
            entries.sort_by_key(|e| e.rank);
            Ok(entries)
        }
    }

    fn catalog() -> TickerCatalog {
        let mut catalog = TickerCatalog::new();
        catalog
            .load_reader("GME\tGameStop Corp.\nAMC\tAMC Entertainment\nBB\tBlackBerry\n".as_bytes())
            .unwrap();
        catalog
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            post_limit: 500,
            candidate_width: 5,
            output_width: 3,
            dry_run: false,
        }
    }

    #[test]
    fn config_rejects_candidate_width_not_above_output_width() {
        let config = PipelineConfig {
            candidate_width: 10,
            output_width: 10,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn first_run_persists_an_all_new_snapshot() {
        let pipeline = Pipeline::new(
            FakePosts::with_posts(vec![
                Post::new("GME to the moon", ""),
                Post::new("buy AMC", "GME GME"),
            ]),
            FakeMarket,
            MemoryStore::default(),
            config(),
        )
        .unwrap();

        let summary = pipeline
            .run_once(&catalog(), &Blacklist::empty())
            .await
            .unwrap();

        assert_eq!(summary.posts_scanned, 2);
        assert_eq!(summary.distinct_tickers, 2);
        assert!(summary.persisted);

        let tickers: Vec<&str> = summary.entries.iter().map(|e| e.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["GME", "AMC"]);
        assert_eq!(summary.entries[0].mentions, 3);
        assert!(summary.entries.iter().all(|e| e.is_new && e.rank_change == 0));

        let stored = pipeline
            .store
            .entries_at(summary.captured_at)
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn second_run_diffs_against_the_first() {
        // Run 1 ranks GME over AMC; run 2 has AMC overtaking and BB appearing.
        let pipeline = Pipeline::new(
            FakePosts::with_batches(vec![
                vec![Post::new("GME GME", "AMC")],
                vec![Post::new("AMC AMC AMC", "GME GME BB")],
            ]),
            FakeMarket,
            MemoryStore::default(),
            config(),
        )
        .unwrap();

        pipeline
            .run_once(&catalog(), &Blacklist::empty())
            .await
            .unwrap();
        let summary = pipeline
            .run_once(&catalog(), &Blacklist::empty())
            .await
            .unwrap();

        let amc = summary.entries.iter().find(|e| e.ticker == "AMC").unwrap();
        assert!(!amc.is_new);
        assert_eq!(amc.rank_change, 1);

        let gme = summary.entries.iter().find(|e| e.ticker == "GME").unwrap();
        assert!(!gme.is_new);
        assert_eq!(gme.rank_change, -1);

        let bb = summary.entries.iter().find(|e| e.ticker == "BB").unwrap();
        assert!(bb.is_new);
        assert_eq!(bb.rank_change, 0);
    }

    #[tokio::test]
    async fn dry_run_builds_but_does_not_persist() {
        let pipeline = Pipeline::new(
            FakePosts::with_posts(vec![Post::new("GME", "")]),
            FakeMarket,
            MemoryStore::default(),
            PipelineConfig {
                dry_run: true,
                ..config()
            },
        )
        .unwrap();

        let summary = pipeline
            .run_once(&catalog(), &Blacklist::empty())
            .await
            .unwrap();

        assert!(!summary.persisted);
        assert_eq!(summary.entries.len(), 1);
        assert!(pipeline.store.rows.lock().unwrap().is_empty());
    }
}
