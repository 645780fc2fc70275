//! yt-dlp subprocess collector
//!
//! The concrete [`VideoCollector`] implementation. Each invocation runs the
//! yt-dlp binary for one URL, parses the JSON metadata it prints, and
//! resolves the downloaded file on disk. Failures reported by the
//! subprocess are classified into the retryable download-error family from
//! its stderr; a missing binary or workspace I/O problem is fatal.

use crate::config::CollectorOptions;
use crate::fetch::{
    Collected, CollectError, DownloadError, RateLimiter, VideoCollector, VideoFile, VideoMetadata,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Hosts commonly seen in short-video URL lists; anything else is still
/// handed to yt-dlp, which supports far more extractors than this list
const KNOWN_SHORT_VIDEO_HOSTS: &[&str] = &[
    "tiktok.com",
    "douyin.com",
    "youtube.com",
    "youtu.be",
    "instagram.com",
    "vimeo.com",
    "twitter.com",
    "x.com",
];

/// Fields of interest from the yt-dlp info JSON
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    view_count: Option<u64>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
}

/// Collector that shells out to the yt-dlp binary
pub struct YtDlpCollector {
    binary: PathBuf,
    cookies_path: Option<PathBuf>,
    rate_limiter: RateLimiter,
}

impl YtDlpCollector {
    /// Creates a collector, resolving the yt-dlp binary
    ///
    /// An explicitly configured path is trusted as-is; otherwise the binary
    /// is discovered on PATH. A binary that cannot be found is a fatal
    /// `Unavailable` error; there is no point starting a batch without it.
    pub fn new(options: &CollectorOptions) -> Result<Self, CollectError> {
        let binary = match &options.binary {
            Some(path) => path.clone(),
            None => which::which("yt-dlp").map_err(|e| {
                CollectError::Unavailable(format!("yt-dlp not found on PATH: {e}"))
            })?,
        };

        tracing::debug!("Using yt-dlp binary: {}", binary.display());

        Ok(Self {
            binary,
            cookies_path: options.cookies_path.clone(),
            rate_limiter: RateLimiter::new(options.rate_limit_delay),
        })
    }

    /// Builds the yt-dlp invocation for one URL
    fn build_command(&self, url: &str, destination: &Path) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.binary);
        command
            .arg("-q")
            .arg("--no-warnings")
            .arg("--print-json")
            .arg("-f")
            .arg("bestvideo+bestaudio/best")
            .arg("-o")
            .arg(destination.join("%(id)s.%(ext)s"));

        if let Some(cookies) = &self.cookies_path {
            if cookies.exists() {
                tracing::debug!("Using cookies from: {}", cookies.display());
                command.arg("--cookies").arg(cookies);
            }
        }

        command.arg(url);
        command
    }

    /// Resolves the downloaded media file for an id, trying the container
    /// extensions yt-dlp produces for short-video sources
    fn resolve_media_file(destination: &Path, id: &str) -> Option<PathBuf> {
        for extension in ["mp4", "webm"] {
            let candidate = destination.join(format!("{id}.{extension}"));
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }
}

#[async_trait]
impl VideoCollector for YtDlpCollector {
    async fn collect(&self, url: &str, destination: &Path) -> Result<Collected, CollectError> {
        tracing::info!("Starting collection for video URL: {}", url);

        if !is_known_short_video_host(url) {
            tracing::debug!("Host of {} is not a known short-video site", url);
        }

        self.rate_limiter.throttle().await;

        std::fs::create_dir_all(destination)?;

        let output = self.build_command(url, destination).output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!("yt-dlp failed for {}: {}", url, stderr.trim());
            return Err(classify_failure(&stderr).into());
        }

        let info: YtDlpInfo = serde_json::from_slice(&output.stdout).map_err(|e| {
            DownloadError::Other(format!("unparseable yt-dlp metadata for {url}: {e}"))
        })?;

        let downloaded_path = Self::resolve_media_file(destination, &info.id).ok_or_else(|| {
            DownloadError::Other(format!(
                "video file not found after download: {}",
                info.id
            ))
        })?;

        let metadata = VideoMetadata {
            id: info.id.clone(),
            title: info.title.unwrap_or_else(|| "N/A".to_string()),
            length: info.duration.map(|d| d as u64).unwrap_or(0),
            views: info.view_count.unwrap_or(0),
            author: info.uploader.unwrap_or_else(|| "N/A".to_string()),
            description: info.description.unwrap_or_default(),
            publish_date: info.upload_date.unwrap_or_else(|| "N/A".to_string()),
        };

        tracing::info!("Collection successful for video ID: {}", info.id);
        self.rate_limiter.stamp();

        Ok(Collected {
            video: VideoFile {
                id: info.id,
                downloaded_path,
            },
            metadata,
        })
    }
}

/// Checks whether the URL's host belongs to a known short-video site
fn is_known_short_video_host(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    KNOWN_SHORT_VIDEO_HOSTS
        .iter()
        .any(|known| host == *known || host.ends_with(&format!(".{known}")))
}

/// Classifies a failed yt-dlp run into a download error kind from its
/// stderr output
fn classify_failure(stderr: &str) -> DownloadError {
    let lowered = stderr.to_lowercase();

    if lowered.contains("rate limit")
        || lowered.contains("too many requests")
        || lowered.contains("429")
    {
        return DownloadError::RateLimited(summarize_stderr(stderr));
    }

    if lowered.contains("not found")
        || lowered.contains("404")
        || lowered.contains("unavailable")
        || lowered.contains("private")
        || lowered.contains("removed")
        || lowered.contains("unable to extract")
    {
        return DownloadError::NotFound(summarize_stderr(stderr));
    }

    DownloadError::Other(summarize_stderr(stderr))
}

/// First non-empty stderr line, which is where yt-dlp puts its error message
fn summarize_stderr(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("yt-dlp exited with an error")
        .to_string()
}
