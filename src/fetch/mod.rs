//! Fetch collaborator boundary
//!
//! This module defines the contract between the batch orchestrator and
//! whatever performs the actual network download for one URL: the
//! [`VideoCollector`] trait, the tagged result and metadata types it
//! returns, and the error taxonomy that separates retryable download
//! failures from fatal collector problems.

mod rate_limit;
mod retry;
mod ytdlp;

pub use rate_limit::RateLimiter;
pub use retry::{fetch_with_retry, FetchOutcome};
pub use ytdlp::YtDlpCollector;

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Download failures the retry wrapper is allowed to retry and, on
/// exhaustion, swallow
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("video not found or inaccessible: {0}")]
    NotFound(String),

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("download failed: {0}")]
    Other(String),
}

/// Errors a collector invocation can produce
///
/// Only the `Download` family is retryable; the remaining variants indicate
/// problems no retry can fix and propagate out of the retry wrapper
/// unmodified.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("collector unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A downloaded media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    /// Media identifier assigned by the source platform
    pub id: String,

    /// Filesystem path of the downloaded file
    pub downloaded_path: PathBuf,
}

impl fmt::Display for VideoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}\ndownloaded_path: {}",
            self.id,
            self.downloaded_path.display()
        )
    }
}

/// Descriptive metadata for a downloaded video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    /// Duration in seconds
    pub length: u64,
    pub views: u64,
    pub author: String,
    pub description: String,
    pub publish_date: String,
}

impl fmt::Display for VideoMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}\ntitle: {}\nlength: {}\nviews: {}\nauthor: {}\npublish_date: {}",
            self.id, self.title, self.length, self.views, self.author, self.publish_date
        )
    }
}

/// Successful result of one collector invocation
#[derive(Debug, Clone)]
pub struct Collected {
    pub video: VideoFile,
    pub metadata: VideoMetadata,
}

/// The external capability that downloads one video and returns its
/// metadata
///
/// Implementations perform the network fetch for a single URL into the
/// given destination directory. The orchestrator and the retry wrapper
/// depend only on this contract, which is what lets tests substitute a
/// scripted stub for the real subprocess collector.
#[async_trait]
pub trait VideoCollector: Send + Sync {
    async fn collect(&self, url: &str, destination: &Path) -> Result<Collected, CollectError>;
}
