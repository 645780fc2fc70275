//! Vidhaul main entry point
//!
//! This is the command-line interface for the vidhaul batch video
//! downloader.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vidhaul::batch::{BatchDownloader, BatchSummary};
use vidhaul::config::{self, CollectorOptions, DownloadConfig, ExtractorOptions};
use vidhaul::fetch::YtDlpCollector;

/// Vidhaul: a batch short-form video downloader
///
/// Vidhaul extracts video URLs from CSV, TXT, or ZIP files, downloads them
/// sequentially into numbered shard folders, and keeps a per-shard tracking
/// file so interrupted or repeated runs never download the same URL twice.
#[derive(Parser, Debug)]
#[command(name = "vidhaul")]
#[command(version = "1.0.0")]
#[command(about = "Batch short-form video downloader", long_about = None)]
struct Cli {
    /// Path to input file (CSV, TXT, or ZIP) containing video URLs
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Output directory for downloaded videos
    #[arg(short, long, value_name = "PATH", default_value = "downloaded_videos")]
    output: PathBuf,

    /// Maximum videos per shard folder
    #[arg(long, value_name = "INT", default_value_t = 100)]
    max_videos: usize,

    /// Maximum download retry attempts per URL
    #[arg(long, value_name = "INT", default_value_t = 3)]
    max_retries: u32,

    /// Delay between retries in seconds
    #[arg(long, value_name = "INT", default_value_t = 5)]
    retry_delay: u64,

    /// Optional TOML file with extractor and collector options
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vidhaul=info,warn"),
            1 => EnvFilter::new("vidhaul=debug,info"),
            2 => EnvFilter::new("vidhaul=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Assembles the configuration, runs the batch, and maps the outcome to an
/// exit code: 0 clean, 1 fatal error, 2 completed with failed URLs
async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (extractor, collector_options) = load_optional_file_config(cli.config.as_deref())?;

    let download_config = DownloadConfig {
        input_path: cli.input,
        output_root: cli.output,
        shard_size: cli.max_videos,
        max_retries: cli.max_retries,
        retry_delay: Duration::from_secs(cli.retry_delay),
        extractor,
        collector: collector_options,
    };

    config::validate(&download_config).context("invalid configuration")?;

    let collector =
        YtDlpCollector::new(&download_config.collector).context("collector setup failed")?;

    let mut downloader = BatchDownloader::new(download_config, collector);
    let summary = downloader.run().await.context("batch download failed")?;

    print_summary(&summary);

    if summary.has_failures() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Loads the optional TOML configuration file, falling back to defaults
fn load_optional_file_config(
    path: Option<&std::path::Path>,
) -> anyhow::Result<(ExtractorOptions, CollectorOptions)> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (file_config, hash) = config::load_file_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok((
                file_config.extractor_options(),
                file_config.collector_options(),
            ))
        }
        None => Ok((ExtractorOptions::default(), CollectorOptions::default())),
    }
}

/// Prints the final run summary to stdout
fn print_summary(summary: &BatchSummary) {
    println!("\n=== Download Summary ===\n");
    println!("  Downloaded: {}", summary.downloaded_count);
    println!("  Failed:     {}", summary.failed_count);
    println!("  Total URLs: {}", summary.total_count);

    if !summary.failures.is_empty() {
        println!("\nFailed URLs:");
        for failure in &summary.failures {
            println!(
                "  {} ({} attempts): {}",
                failure.url, failure.attempts, failure.reason
            );
        }
    }
}
