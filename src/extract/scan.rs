//! Regex fallback for URL extraction
//!
//! When no (encoding, delimiter) combination produces a structured parse,
//! the raw file content is swept for `http(s)://` substrings under each
//! encoding in turn, decoding leniently so isolated bad bytes cannot hide
//! an otherwise URL-bearing file.

use crate::extract::{decode_lossy, ENCODINGS};
use regex::Regex;
use std::sync::OnceLock;

/// Matches an HTTP(S) URL up to the first whitespace, comma, quote, or
/// semicolon
fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"https?://[^\s,"';]+"#).expect("URL pattern is a valid regex")
    })
}

/// Sweeps the raw bytes for URLs, returning matches from the first encoding
/// that yields any, along with the encoding name for logging
pub(crate) fn scan_for_urls(bytes: &[u8]) -> Option<(Vec<String>, &'static str)> {
    for &encoding in ENCODINGS {
        let Some(text) = decode_lossy(bytes, encoding) else {
            continue;
        };

        let urls: Vec<String> = url_pattern()
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect();

        if !urls.is_empty() {
            return Some((urls, encoding));
        }

        tracing::debug!("regex sweep under encoding {} found nothing", encoding);
    }

    None
}
