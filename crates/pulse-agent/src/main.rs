//! pulse-agent: scan a subreddit's hot posts for ticker mentions, rank them,
//! enrich the top names with market data, and append a timestamped snapshot
//! to the database.
//!
//! Usage:
//!   cargo run -p pulse-agent
//!   cargo run -p pulse-agent -- --dry-run
//!   cargo run -p pulse-agent -- --db sqlite:pulse.db --limit 100

use anyhow::{Context, Result};
use reddit_client::RedditClient;
use snapshot_pipeline::{Pipeline, PipelineConfig};
use snapshot_store::SqliteSnapshotStore;
use ticker_catalog::{load_catalog_files, Blacklist};
use yahoo_client::YahooClient;

mod config;

use config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse_agent=info,snapshot_pipeline=info,snapshot_store=info,reddit_client=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");

    let db_override = args
        .iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let limit_override: Option<usize> = args
        .iter()
        .position(|a| a == "--limit")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok());

    let mut config = AgentConfig::from_env()?;
    if let Some(db) = db_override {
        config.database_url = db;
    }
    if let Some(limit) = limit_override {
        config.post_limit = limit;
    }

    tracing::info!("Starting pulse-agent");
    tracing::info!("  Subreddit: r/{}", config.subreddit);
    tracing::info!("  Post limit: {}", config.post_limit);
    tracing::info!(
        "  Widths: {} candidates -> {} published",
        config.candidate_width,
        config.output_width
    );
    if dry_run {
        tracing::info!("  Dry run: snapshot will not be stored");
    }

    let catalog =
        load_catalog_files(&config.ticker_files).context("failed to load ticker catalog")?;
    let blacklist = match &config.blacklist_override {
        Some(tokens) => Blacklist::from_tokens(tokens.iter().cloned()),
        None => Blacklist::default(),
    };

    let posts = RedditClient::new(
        config.reddit_client_id.clone(),
        config.reddit_client_secret.clone(),
        config.reddit_user_agent.clone(),
        config.subreddit.clone(),
    );
    let market = YahooClient::default();
    let store = SqliteSnapshotStore::new(&config.database_url)
        .await
        .context("failed to open snapshot store")?;

    let pipeline = Pipeline::new(
        posts,
        market,
        store,
        PipelineConfig {
            post_limit: config.post_limit,
            candidate_width: config.candidate_width,
            output_width: config.output_width,
            dry_run,
        },
    )?;

    let summary = pipeline.run_once(&catalog, &blacklist).await?;

    tracing::info!(
        "Run complete at {}: {} posts scanned, {} tickers mentioned, {} published, {} skipped",
        summary.captured_at.to_rfc3339(),
        summary.posts_scanned,
        summary.distinct_tickers,
        summary.entries.len(),
        summary.skipped.len()
    );
    for entry in &summary.entries {
        let movement = if entry.is_new {
            "new".to_string()
        } else {
            format!("{:+}", entry.rank_change)
        };
        tracing::info!(
            "  #{:<2} {:<6} {:>4} mentions  [{}]  {} | close {:.2}, 50d avg {:.2}, 10d vol {}",
            entry.rank,
            entry.ticker,
            entry.mentions,
            movement,
            entry.industry,
            entry.previous_close,
            entry.fifty_day_average,
            entry.average_daily_volume_10d
        );
    }

    Ok(())
}
