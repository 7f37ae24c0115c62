use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Post source error: {0}")]
    PostSource(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type PulseResult<T> = Result<T, PulseError>;
