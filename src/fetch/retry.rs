//! Bounded constant-delay retry around the fetch collaborator
//!
//! Download failures are retried up to the configured attempt count with a
//! fixed delay between attempts; exhaustion is reported as a value, never
//! as an error, so one stubborn URL cannot abort a batch. Anything outside
//! the download-failure family propagates unmodified.

use crate::fetch::{Collected, CollectError, DownloadError, VideoCollector};
use std::path::Path;
use std::time::Duration;

/// Terminal outcome of a retried fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The video was downloaded within the attempt budget
    Fetched(Collected),

    /// Every attempt failed; carries the last download error for reporting
    Exhausted {
        attempts: u32,
        last_error: DownloadError,
    },
}

/// Invokes the collector for one URL with bounded, constant-delay retries
///
/// Attempts are 1-indexed. After a download error, the wrapper sleeps
/// exactly `delay` if attempts remain; the delay is constant and never
/// grows. On the final failed attempt the error is folded into
/// [`FetchOutcome::Exhausted`].
///
/// # Arguments
///
/// * `collector` - The fetch collaborator
/// * `url` - URL to download
/// * `destination` - Directory the video is downloaded into
/// * `max_attempts` - Total attempt budget (>= 1)
/// * `delay` - Fixed pause between attempts
///
/// # Returns
///
/// * `Ok(FetchOutcome)` - Download succeeded or exhausted its attempts
/// * `Err(CollectError)` - A non-download collector error occurred
pub async fn fetch_with_retry<C: VideoCollector + ?Sized>(
    collector: &C,
    url: &str,
    destination: &Path,
    max_attempts: u32,
    delay: Duration,
) -> Result<FetchOutcome, CollectError> {
    let mut last_error: Option<DownloadError> = None;

    for attempt in 1..=max_attempts {
        tracing::info!("Downloading (attempt {}/{}): {}", attempt, max_attempts, url);

        match collector.collect(url, destination).await {
            Ok(collected) => return Ok(FetchOutcome::Fetched(collected)),
            Err(CollectError::Download(e)) => {
                tracing::warn!("Download attempt {} failed for {}: {}", attempt, url, e);

                if attempt < max_attempts {
                    tracing::info!("Retrying in {} seconds...", delay.as_secs());
                    tokio::time::sleep(delay).await;
                } else {
                    tracing::error!("Failed after {} attempts: {}", max_attempts, url);
                }
                last_error = Some(e);
            }
            Err(other) => return Err(other),
        }
    }

    Ok(FetchOutcome::Exhausted {
        attempts: max_attempts,
        last_error: last_error
            .unwrap_or_else(|| DownloadError::Other("no attempts were made".to_string())),
    })
}
