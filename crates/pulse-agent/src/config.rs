use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    // Reddit API (script app credentials)
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_user_agent: String,
    pub subreddit: String,

    // Reference data, in priority order (first file wins duplicate symbols)
    pub ticker_files: Vec<PathBuf>,
    pub blacklist_override: Option<Vec<String>>,

    // Persistence
    pub database_url: String,

    // Pipeline widths
    pub post_limit: usize,
    pub candidate_width: usize,
    pub output_width: usize,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            reddit_client_id: env::var("REDDIT_CLIENT_ID")
                .context("REDDIT_CLIENT_ID must be set")?,
            reddit_client_secret: env::var("REDDIT_CLIENT_SECRET")
                .context("REDDIT_CLIENT_SECRET must be set")?,
            reddit_user_agent: env::var("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| "stock-pulse/0.1".to_string()),
            subreddit: env::var("SUBREDDIT").unwrap_or_else(|_| "wallstreetbets".to_string()),

            ticker_files: env::var("TICKER_FILES")
                .unwrap_or_else(|_| "tickers/NASDAQ.txt,tickers/NYSE.txt".to_string())
                .split(',')
                .map(|p| PathBuf::from(p.trim()))
                .collect(),
            blacklist_override: env::var("TICKER_BLACKLIST").ok().map(|v| {
                v.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            }),

            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,

            post_limit: env::var("POST_LIMIT")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .context("POST_LIMIT must be a positive integer")?,
            candidate_width: env::var("CANDIDATE_WIDTH")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("CANDIDATE_WIDTH must be a positive integer")?,
            output_width: env::var("OUTPUT_WIDTH")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("OUTPUT_WIDTH must be a positive integer")?,
        };

        Ok(config)
    }
}
