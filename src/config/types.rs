use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Complete configuration for one batch download run
///
/// Constructed once at process start and threaded through every component;
/// no component reads ambient global state.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Path to the input file containing video URLs (CSV, TXT, or ZIP)
    pub input_path: PathBuf,

    /// Root directory downloads are written under
    pub output_root: PathBuf,

    /// Maximum number of URLs per shard folder
    pub shard_size: usize,

    /// Maximum fetch attempts per URL
    pub max_retries: u32,

    /// Fixed delay between fetch attempts
    pub retry_delay: Duration,

    /// URL extraction behavior
    pub extractor: ExtractorOptions,

    /// Fetch collaborator behavior
    pub collector: CollectorOptions,
}

/// How candidate URL values are validated during extraction
///
/// The two historical extraction paths disagreed on this; both behaviors
/// remain available rather than being silently unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlValidation {
    /// Require a full `http://` or `https://` scheme prefix
    FullScheme,

    /// Accept any value starting with `http`
    LenientPrefix,
}

impl UrlValidation {
    /// Returns true if `value` passes this validation mode
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::FullScheme => value.starts_with("http://") || value.starts_with("https://"),
            Self::LenientPrefix => value.starts_with("http"),
        }
    }
}

/// Last-resort column selection when no header names a URL column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnFallback {
    /// Use the first column only if its leading values look like HTTP URLs
    SampleChecked,

    /// Use the first column unconditionally
    Unconditional,
}

/// URL extractor behavior options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorOptions {
    pub url_validation: UrlValidation,
    pub column_fallback: ColumnFallback,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            url_validation: UrlValidation::LenientPrefix,
            column_fallback: ColumnFallback::SampleChecked,
        }
    }
}

/// Fetch collaborator (yt-dlp) options
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    /// Explicit path to the yt-dlp binary; discovered on PATH when absent
    pub binary: Option<PathBuf>,

    /// Cookies file passed to yt-dlp for authenticated requests
    pub cookies_path: Option<PathBuf>,

    /// Minimum interval between collector invocations
    pub rate_limit_delay: Duration,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            binary: None,
            cookies_path: None,
            rate_limit_delay: Duration::from_millis(1000),
        }
    }
}

/// Shape of the optional TOML configuration file
///
/// Every field is optional; an absent file or section means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub extractor: ExtractorSection,

    #[serde(default)]
    pub collector: CollectorSection,
}

/// `[extractor]` section of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractorSection {
    #[serde(rename = "url-validation")]
    pub url_validation: Option<UrlValidation>,

    #[serde(rename = "column-fallback")]
    pub column_fallback: Option<ColumnFallback>,
}

/// `[collector]` section of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectorSection {
    pub binary: Option<PathBuf>,

    #[serde(rename = "cookies-path")]
    pub cookies_path: Option<PathBuf>,

    #[serde(rename = "rate-limit-delay-ms")]
    pub rate_limit_delay_ms: Option<u64>,
}

impl FileConfig {
    /// Resolves the extractor options, applying defaults for absent fields
    pub fn extractor_options(&self) -> ExtractorOptions {
        let defaults = ExtractorOptions::default();
        ExtractorOptions {
            url_validation: self.extractor.url_validation.unwrap_or(defaults.url_validation),
            column_fallback: self.extractor.column_fallback.unwrap_or(defaults.column_fallback),
        }
    }

    /// Resolves the collector options, applying defaults for absent fields
    pub fn collector_options(&self) -> CollectorOptions {
        let defaults = CollectorOptions::default();
        CollectorOptions {
            binary: self.collector.binary.clone(),
            cookies_path: self.collector.cookies_path.clone(),
            rate_limit_delay: self
                .collector
                .rate_limit_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate_limit_delay),
        }
    }
}
