//! Batch download orchestration
//!
//! The orchestrator composes the extractor, per-shard trackers, and the
//! retrying fetch wrapper into one strictly sequential run: extract URLs
//! once, then resolve each URL completely (skip, or fetch to success or
//! exhaustion) before moving to the next. Per-URL failures never abort
//! the batch; extraction and directory-creation failures do.

use crate::config::DownloadConfig;
use crate::extract::{extract_urls, ExtractError};
use crate::fetch::{fetch_with_retry, CollectError, FetchOutcome, VideoCollector};
use crate::state::UrlState;
use crate::tracker::{DownloadTracker, TRACKING_FILE};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the per-run failure log under the output root
pub const FAILURE_LOG_FILE: &str = "failures.csv";

/// Errors that abort a batch run
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Collector failure: {0}")]
    Collector(#[from] CollectError),
}

/// One URL that exhausted its retry budget
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub url: String,
    /// 1-based shard index the URL belonged to
    pub shard: usize,
    pub attempts: u32,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Aggregate result of one batch run
#[derive(Debug)]
pub struct BatchSummary {
    pub downloaded_count: u64,
    pub failed_count: u64,
    pub total_count: u64,

    /// Structured per-URL failure log; also persisted to
    /// [`FAILURE_LOG_FILE`] under the output root
    pub failures: Vec<FailureRecord>,
}

impl BatchSummary {
    /// Returns true if at least one URL exhausted its retries
    pub fn has_failures(&self) -> bool {
        self.failed_count > 0
    }
}

/// Computes the 1-based shard index for a 0-based URL position
pub fn shard_index(position: usize, shard_size: usize) -> usize {
    position / shard_size + 1
}

/// Shard directory name for a 1-based shard index
pub fn shard_dir_name(shard: usize) -> String {
    format!("video{shard}")
}

/// Asserts and performs a state transition; the per-URL state machine only
/// moves forward within a run
fn advance(from: UrlState, to: UrlState) -> UrlState {
    debug_assert!(
        from.can_transition_to(to),
        "illegal URL state transition {from} -> {to}"
    );
    to
}

/// Sequential batch downloader over one extracted URL list
pub struct BatchDownloader<C> {
    config: DownloadConfig,
    collector: C,
    trackers: HashMap<usize, DownloadTracker>,
}

impl<C: VideoCollector> BatchDownloader<C> {
    /// Creates a downloader for one run
    pub fn new(config: DownloadConfig, collector: C) -> Self {
        Self {
            config,
            collector,
            trackers: HashMap::new(),
        }
    }

    /// Read access to the collector, for diagnostics and tests
    pub fn collector(&self) -> &C {
        &self.collector
    }

    /// Runs the batch to completion
    ///
    /// # Returns
    ///
    /// * `Ok(BatchSummary)` - Counts and the failure log; per-URL retry
    ///   exhaustion surfaces here, not as an error
    /// * `Err(BatchError)` - Extraction failed, a directory could not be
    ///   created, or the collector hit a fatal (non-download) problem
    pub async fn run(&mut self) -> Result<BatchSummary, BatchError> {
        tracing::info!("Starting batch download...");

        let urls = extract_urls(&self.config.input_path, &self.config.extractor)?;
        tracing::info!("Found {} URLs to download", urls.len());

        create_dir(&self.config.output_root)?;

        let mut downloaded_count = 0u64;
        let mut failed_count = 0u64;
        let mut failures: Vec<FailureRecord> = Vec::new();

        for (position, url) in urls.iter().enumerate() {
            let shard = shard_index(position, self.config.shard_size);

            let state = self.process_url(shard, url, &mut failures).await?;
            match state {
                UrlState::Succeeded => downloaded_count += 1,
                UrlState::Failed => failed_count += 1,
                UrlState::Skipped => {}
                UrlState::Pending | UrlState::Fetching => {
                    unreachable!("process_url returns terminal states only")
                }
            }
        }

        let summary = BatchSummary {
            downloaded_count,
            failed_count,
            total_count: urls.len() as u64,
            failures,
        };

        self.write_failure_log(&summary.failures);

        tracing::info!(
            "Batch download complete: {} downloaded, {} failed",
            summary.downloaded_count,
            summary.failed_count
        );

        Ok(summary)
    }

    /// Resolves one URL to a terminal state
    async fn process_url(
        &mut self,
        shard: usize,
        url: &str,
        failures: &mut Vec<FailureRecord>,
    ) -> Result<UrlState, BatchError> {
        let shard_dir = self.config.output_root.join(shard_dir_name(shard));
        create_dir(&shard_dir)?;

        let tracker = self
            .trackers
            .entry(shard)
            .or_insert_with(|| DownloadTracker::open(shard_dir.join(TRACKING_FILE)));

        let state = UrlState::Pending;

        if tracker.is_processed(url) {
            tracing::info!("Skipping already processed: {}", url);
            return Ok(advance(state, UrlState::Skipped));
        }

        let state = advance(state, UrlState::Fetching);

        let outcome = fetch_with_retry(
            &self.collector,
            url,
            &shard_dir,
            self.config.max_retries,
            self.config.retry_delay,
        )
        .await?;

        match outcome {
            FetchOutcome::Fetched(collected) => {
                println!("{}", collected.metadata);
                println!(
                    "video download path: {}",
                    collected.video.downloaded_path.display()
                );

                tracker.record(url, &collected.video.downloaded_path.to_string_lossy());
                Ok(advance(state, UrlState::Succeeded))
            }
            FetchOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                tracing::warn!("Giving up on {}: {}", url, last_error);
                failures.push(FailureRecord {
                    url: url.to_string(),
                    shard,
                    attempts,
                    reason: last_error.to_string(),
                    at: Utc::now(),
                });
                Ok(advance(state, UrlState::Failed))
            }
        }
    }

    /// Persists the failure log under the output root, best-effort
    ///
    /// The log reflects the current run only and is rewritten each time.
    /// Like tracker appends, a write problem here must not fail a batch
    /// that already did its real work.
    fn write_failure_log(&self, failures: &[FailureRecord]) {
        if failures.is_empty() {
            return;
        }

        let path = self.config.output_root.join(FAILURE_LOG_FILE);
        match write_failures(&path, failures) {
            Ok(()) => tracing::info!(
                "Wrote {} failure records to {}",
                failures.len(),
                path.display()
            ),
            Err(e) => tracing::warn!("Error writing failure log {}: {}", path.display(), e),
        }
    }
}

fn create_dir(path: &Path) -> Result<(), BatchError> {
    std::fs::create_dir_all(path).map_err(|source| BatchError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_failures(path: &Path, failures: &[FailureRecord]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["url", "shard", "attempts", "reason", "recorded_at"])?;
    for failure in failures {
        writer.write_record([
            failure.url.as_str(),
            &failure.shard.to_string(),
            &failure.attempts.to_string(),
            failure.reason.as_str(),
            &failure.at.to_rfc3339(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_index_boundaries() {
        // Five URLs with shard_size = 2 land in shards 1,1,2,2,3
        let shards: Vec<usize> = (0..5).map(|p| shard_index(p, 2)).collect();
        assert_eq!(shards, vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_shard_index_default_size() {
        assert_eq!(shard_index(0, 100), 1);
        assert_eq!(shard_index(99, 100), 1);
        assert_eq!(shard_index(100, 100), 2);
        assert_eq!(shard_index(250, 100), 3);
    }

    #[test]
    fn test_shard_dir_name() {
        assert_eq!(shard_dir_name(1), "video1");
        assert_eq!(shard_dir_name(12), "video12");
    }

    #[test]
    fn test_summary_has_failures() {
        let clean = BatchSummary {
            downloaded_count: 3,
            failed_count: 0,
            total_count: 3,
            failures: Vec::new(),
        };
        assert!(!clean.has_failures());

        let partial = BatchSummary {
            downloaded_count: 2,
            failed_count: 1,
            total_count: 3,
            failures: Vec::new(),
        };
        assert!(partial.has_failures());
    }

    #[test]
    fn test_write_failures_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(FAILURE_LOG_FILE);

        let failures = vec![FailureRecord {
            url: "https://x/1".to_string(),
            shard: 1,
            attempts: 3,
            reason: "download failed: network burp".to_string(),
            at: Utc::now(),
        }];

        write_failures(&path, &failures).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("url,shard,attempts,reason,recorded_at"));
        assert!(content.contains("https://x/1"));
        assert!(content.contains("network burp"));
    }
}
