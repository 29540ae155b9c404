//! Link-Harvester: a bounded, scope-aware URL gatherer
//!
//! This crate crawls a set of seed pages, discovering hyperlinks, script
//! sources and form targets up to a bounded depth, while enforcing
//! domain/path scope rules, fetching each canonical URL at most once, and
//! capping concurrency, response size and per-request time.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Link-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No seed URLs provided")]
    NoSeeds,

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons a raw reference is rejected by the normalizer
///
/// These are not failures of the crawl: a rejected reference is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Empty reference")]
    Empty,

    #[error("Ignored reference: {0}")]
    Ignored(String),

    #[error("Failed to resolve URL: {0}")]
    Parse(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Typed failure of a single fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Non-success status: HTTP {0}")]
    NonSuccessStatus(u16),

    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

/// Failure to extract links from a fetched body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to extract links: {0}")]
pub struct ExtractError(pub String);

/// Result type alias for Link-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::{CrawlEngine, CrawlReport, CrawlTask};
pub use output::{FoundReference, ResultSink, SourceKind};
pub use state::{EngineState, TaskState};
pub use self::url::{in_scope, normalize};
