//! Per-shard download tracking
//!
//! Each shard folder carries one tracking CSV recording every URL that was
//! successfully downloaded into it. The tracker loads that file into an
//! in-memory set at construction and appends one row per new success, which
//! is what makes re-running a batch over the same input idempotent.
//!
//! Tracker I/O failures are deliberately non-fatal: a URL that was
//! downloaded but could not be recorded is simply re-downloaded on the next
//! run. Nothing already on disk is ever lost to a tracking error.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// File name of the tracking CSV inside each shard directory
pub const TRACKING_FILE: &str = "id2url.csv";

/// Header row of the tracking CSV
const HEADER: [&str; 2] = ["url", "Video Path"];

/// Tracks which URLs have already been downloaded into one shard directory
#[derive(Debug)]
pub struct DownloadTracker {
    csv_path: PathBuf,
    seen: HashSet<String>,
}

impl DownloadTracker {
    /// Opens the tracker for a shard
    ///
    /// If the tracking file exists, all rows with a non-empty `url` field
    /// are loaded; malformed rows are logged and skipped. If it does not
    /// exist, the parent directory and a header-only file are created.
    /// I/O problems are logged and degrade to an empty set rather than
    /// failing the run.
    pub fn open(csv_path: impl Into<PathBuf>) -> Self {
        let csv_path = csv_path.into();
        let mut seen = HashSet::new();

        if csv_path.exists() {
            match load_existing_urls(&csv_path) {
                Ok(urls) => {
                    tracing::info!(
                        "Loaded {} existing URLs from {}",
                        urls.len(),
                        csv_path.display()
                    );
                    seen = urls;
                }
                Err(e) => {
                    tracing::warn!(
                        "Error loading existing URLs from {}: {}",
                        csv_path.display(),
                        e
                    );
                }
            }
        } else if let Err(e) = write_header(&csv_path) {
            tracing::warn!(
                "Error creating tracking file {}: {}",
                csv_path.display(),
                e
            );
        }

        Self { csv_path, seen }
    }

    /// Exact-string membership test against the loaded set
    pub fn is_processed(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Number of URLs currently known to the tracker
    pub fn known_count(&self) -> usize {
        self.seen.len()
    }

    /// Records a successful download
    ///
    /// Appends one row to the tracking file and adds the URL to the
    /// in-memory set. An append failure is logged and swallowed; the set is
    /// only updated when the row made it to disk, so memory and file stay
    /// consistent within the run.
    pub fn record(&mut self, url: &str, video_path: &str) {
        match append_row(&self.csv_path, url, video_path) {
            Ok(()) => {
                self.seen.insert(url.to_string());
                tracing::debug!("Recorded download: {}", url);
            }
            Err(e) => {
                tracing::warn!("Error recording download for {}: {}", url, e);
            }
        }
    }
}

/// Loads the set of already-downloaded URLs from an existing tracking file
fn load_existing_urls(csv_path: &Path) -> Result<HashSet<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)?;

    let url_index = reader
        .headers()?
        .iter()
        .position(|header| header == HEADER[0]);

    let mut seen = HashSet::new();
    for record in reader.records() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!("Skipping malformed tracking row: {}", e);
                continue;
            }
        };

        let url = url_index.and_then(|index| row.get(index)).unwrap_or("");
        if !url.is_empty() {
            seen.insert(url.to_string());
        }
    }

    Ok(seen)
}

/// Creates the tracking file with its header row, including any missing
/// parent directories
fn write_header(csv_path: &Path) -> Result<(), csv::Error> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(csv_path)?;
    writer.write_record(HEADER)?;
    writer.flush()?;
    Ok(())
}

/// Appends one `(url, video path)` row to the tracking file
fn append_row(csv_path: &Path, url: &str, video_path: &str) -> Result<(), csv::Error> {
    let file = OpenOptions::new().append(true).open(csv_path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record([url, video_path])?;
    writer.flush()?;
    Ok(())
}
