//! URL extraction from heterogeneous input files
//!
//! This module turns one input file of unknown structure into an ordered
//! sequence of candidate URLs. Three strategies are tried in a fixed order,
//! first success wins:
//!
//! 1. Container detection: ZIP archives are unpacked and their CSV/TXT
//!    entries searched (see [`archive`])
//! 2. Structured-text parsing: delimited tabular text under a fixed
//!    encoding x delimiter grid (see [`table`])
//! 3. Regex fallback: a raw sweep for `http(s)://` substrings under each
//!    encoding with lenient decoding (see [`scan`])
//!
//! Encodings and delimiters are tried in fixed list order and the first
//! success short-circuits, which makes the extraction deterministic even
//! when several combinations would technically work.

mod archive;
mod scan;
mod table;

use crate::config::ExtractorOptions;
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Encodings attempted during extraction, in priority order
///
/// Labels are resolved through the WHATWG registry, so `iso-8859-1` and
/// `latin1` are aliases of the same codec, as are `gbk` and `gb2312`. The
/// full five-entry list is kept so the attempt order stays reproducible.
pub const ENCODINGS: &[&str] = &["utf-8", "iso-8859-1", "gbk", "gb2312", "latin1"];

/// Field delimiters attempted during structured-text parsing, in priority order
pub const DELIMITERS: &[u8] = &[b',', b';', b'\t'];

/// Errors that can occur during URL extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("No valid URLs found in {0}")]
    NoUrlsFound(PathBuf),

    #[error("Archive error for {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Extracts candidate URLs from a CSV, TXT, or ZIP file
///
/// # Arguments
///
/// * `path` - Path to the input file
/// * `options` - Strictness options controlling URL validation and
///   last-resort column selection
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Ordered, non-empty list of candidate URLs
/// * `Err(ExtractError)` - Input missing, archive unreadable, or every
///   strategy exhausted without finding a URL
pub fn extract_urls(path: &Path, options: &ExtractorOptions) -> ExtractResult<Vec<String>> {
    if !path.exists() {
        return Err(ExtractError::InputNotFound(path.to_path_buf()));
    }

    if archive::is_zip(path)? {
        tracing::info!("Detected ZIP archive input: {}", path.display());
        return archive::extract_from_archive(path, options);
    }

    extract_from_text_file(path, options)
}

/// Extracts URLs from a single CSV or text file
///
/// Tries structured-text parsing first, then the regex fallback. Used both
/// for direct inputs and for entries unpacked from an archive.
pub(crate) fn extract_from_text_file(
    path: &Path,
    options: &ExtractorOptions,
) -> ExtractResult<Vec<String>> {
    let bytes = std::fs::read(path)?;

    if let Some(parsed) = table::parse_delimited_text(&bytes, options) {
        tracing::info!(
            "Extracted {} URLs from {} using encoding={}, delimiter={}",
            parsed.urls.len(),
            path.display(),
            parsed.encoding,
            parsed.delimiter
        );
        return Ok(parsed.urls);
    }

    if let Some((urls, encoding)) = scan::scan_for_urls(&bytes) {
        tracing::info!(
            "Extracted {} URLs from {} via regex fallback (encoding={})",
            urls.len(),
            path.display(),
            encoding
        );
        return Ok(urls);
    }

    tracing::warn!("All extraction strategies failed for {}", path.display());
    Err(ExtractError::NoUrlsFound(path.to_path_buf()))
}

/// Decodes bytes under a named encoding, rejecting malformed sequences
///
/// Returns `None` when the label is unknown or the content contains byte
/// sequences invalid for the encoding. Used by the structured-text path,
/// which must not silently accept mojibake.
pub(crate) fn decode_strict<'a>(bytes: &'a [u8], label: &str) -> Option<Cow<'a, str>> {
    let encoding = Encoding::for_label(label.as_bytes())?;
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        None
    } else {
        Some(text)
    }
}

/// Decodes bytes under a named encoding, substituting malformed sequences
///
/// Used by the regex fallback, where a few replacement characters are
/// preferable to giving up on an otherwise URL-bearing file.
pub(crate) fn decode_lossy<'a>(bytes: &'a [u8], label: &str) -> Option<Cow<'a, str>> {
    let encoding = Encoding::for_label(label.as_bytes())?;
    let (text, _, _) = encoding.decode(bytes);
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_missing_input_file() {
        let result = extract_urls(
            Path::new("/nonexistent/urls.csv"),
            &ExtractorOptions::default(),
        );
        assert!(matches!(result, Err(ExtractError::InputNotFound(_))));
    }

    #[test]
    fn test_csv_with_url_header() {
        let dir = TempDir::new().unwrap();
        let path = write_input(
            &dir,
            "urls.csv",
            b"url,label\nhttps://example.com/v/1,first\nhttps://example.com/v/2,second\n",
        );

        let urls = extract_urls(&path, &ExtractorOptions::default()).unwrap();
        assert_eq!(
            urls,
            vec!["https://example.com/v/1", "https://example.com/v/2"]
        );
    }

    #[test]
    fn test_file_with_no_urls() {
        let dir = TempDir::new().unwrap();
        let path = write_input(&dir, "notes.txt", b"no links here\njust text\n");

        let result = extract_urls(&path, &ExtractorOptions::default());
        assert!(matches!(result, Err(ExtractError::NoUrlsFound(_))));
    }

    #[test]
    fn test_extracted_urls_respect_validation_mode() {
        let dir = TempDir::new().unwrap();
        // "httpserver" passes the lenient prefix check but not the full scheme one
        let path = write_input(
            &dir,
            "urls.csv",
            b"url\nhttpserver-notes\nhttps://example.com/v/1\n",
        );

        let lenient = extract_urls(&path, &ExtractorOptions::default()).unwrap();
        assert_eq!(lenient.len(), 2);

        let strict = ExtractorOptions {
            url_validation: crate::config::UrlValidation::FullScheme,
            ..ExtractorOptions::default()
        };
        let urls = extract_urls(&path, &strict).unwrap();
        assert_eq!(urls, vec!["https://example.com/v/1"]);
    }

    #[test]
    fn test_decode_strict_rejects_invalid_utf8() {
        // 0xC3 must be followed by a continuation byte
        assert!(decode_strict(&[0xc3, 0x28], "utf-8").is_none());
    }

    #[test]
    fn test_decode_strict_accepts_valid_utf8() {
        let decoded = decode_strict("héllo".as_bytes(), "utf-8").unwrap();
        assert_eq!(decoded, "héllo");
    }

    #[test]
    fn test_decode_lossy_substitutes_invalid_sequences() {
        let decoded = decode_lossy(&[b'h', b'i', 0xff, 0xfe], "utf-8").unwrap();
        assert!(decoded.starts_with("hi"));
    }

    #[test]
    fn test_decode_unknown_label() {
        assert!(decode_strict(b"abc", "no-such-encoding").is_none());
        assert!(decode_lossy(b"abc", "no-such-encoding").is_none());
    }
}
