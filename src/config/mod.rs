//! Configuration module for vidhaul
//!
//! Runtime configuration is assembled from CLI arguments plus an optional
//! TOML file for extractor strictness and collector options. The file is
//! parsed, validated, and content-hashed so runs can log exactly which
//! configuration they executed under.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_file_config, load_file_config_with_hash};
pub use types::{
    CollectorOptions, CollectorSection, ColumnFallback, DownloadConfig, ExtractorOptions,
    ExtractorSection, FileConfig, UrlValidation,
};
pub use validation::validate;
