//! Vidhaul: a batch short-form video downloader
//!
//! This crate implements a sequential batch downloader that extracts video
//! URLs from heterogeneous input files (CSV, TXT, ZIP), organizes downloads
//! into fixed-size shard folders, tracks completed downloads per shard so
//! re-runs are idempotent, and retries failed fetches with a bounded
//! constant-delay policy.

pub mod batch;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod state;
pub mod tracker;

use thiserror::Error;

/// Main error type for vidhaul operations
#[derive(Debug, Error)]
pub enum VidhaulError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Collector error: {0}")]
    Collect(#[from] fetch::CollectError),

    #[error("Batch error: {0}")]
    Batch(#[from] batch::BatchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
}

/// Result type alias for vidhaul operations
pub type Result<T> = std::result::Result<T, VidhaulError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use batch::{BatchDownloader, BatchSummary};
pub use config::DownloadConfig;
pub use fetch::{Collected, DownloadError, VideoCollector};
pub use state::UrlState;
pub use tracker::DownloadTracker;
