//! Structured-text URL extraction
//!
//! Attempts to parse input as delimited tabular text under every
//! (encoding, delimiter) combination from the fixed lists, encoding as the
//! outer loop and delimiter as the inner one, and pulls URLs out of the most
//! plausible column of the first combination that yields any.

use crate::config::{ColumnFallback, ExtractorOptions};
use crate::extract::{decode_strict, DELIMITERS, ENCODINGS};
use csv::StringRecord;

/// Number of leading values inspected by the sample-checked column fallback
const SAMPLE_SIZE: usize = 5;

/// Outcome of a successful structured parse, with the winning combination
/// retained for logging
pub(crate) struct ParsedUrls {
    pub urls: Vec<String>,
    pub encoding: &'static str,
    pub delimiter: &'static str,
}

/// Human-readable delimiter name for logs
fn delimiter_name(delimiter: u8) -> &'static str {
    match delimiter {
        b',' => "comma",
        b';' => "semicolon",
        b'\t' => "tab",
        _ => "unknown",
    }
}

/// Tries every encoding x delimiter combination and returns URLs from the
/// first one that produces at least one valid URL
pub(crate) fn parse_delimited_text(
    bytes: &[u8],
    options: &ExtractorOptions,
) -> Option<ParsedUrls> {
    for &encoding in ENCODINGS {
        let Some(text) = decode_strict(bytes, encoding) else {
            tracing::debug!("encoding {} rejected the input, trying next", encoding);
            continue;
        };

        for &delimiter in DELIMITERS {
            if let Some(urls) = parse_with_delimiter(&text, delimiter, options) {
                return Some(ParsedUrls {
                    urls,
                    encoding,
                    delimiter: delimiter_name(delimiter),
                });
            }
        }
    }

    None
}

/// Parses text as delimited records and extracts URLs from the URL-bearing
/// column, if one can be located
///
/// The first record is treated as a header row. Records that fail to parse
/// are skipped rather than failing the whole combination.
fn parse_with_delimiter(
    text: &str,
    delimiter: u8,
    options: &ExtractorOptions,
) -> Option<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().ok()?.clone();
    if headers.is_empty() {
        return None;
    }

    let mut rows: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::debug!("skipping malformed record: {}", e);
                continue;
            }
        }
    }

    let column = find_url_column(&headers, &rows, options)?;

    let urls: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get(column))
        .map(str::trim)
        .filter(|value| !value.is_empty() && options.url_validation.accepts(value))
        .map(str::to_string)
        .collect();

    if urls.is_empty() {
        None
    } else {
        Some(urls)
    }
}

/// Locates the URL-bearing column
///
/// Selection order:
/// 1. A header named exactly `url`
/// 2. The first header containing `url` or `link`, case-insensitively
/// 3. The first column as a last resort: gated on a looks-like-a-URL
///    sample check, or taken unconditionally, per the configured fallback
fn find_url_column(
    headers: &StringRecord,
    rows: &[StringRecord],
    options: &ExtractorOptions,
) -> Option<usize> {
    if let Some(index) = headers.iter().position(|header| header == "url") {
        return Some(index);
    }

    if let Some(index) = headers.iter().position(|header| {
        let lowered = header.to_lowercase();
        lowered.contains("url") || lowered.contains("link")
    }) {
        tracing::debug!("using URL column by header match: {}", &headers[index]);
        return Some(index);
    }

    match options.column_fallback {
        ColumnFallback::Unconditional => {
            tracing::debug!("no URL column header found, using first column");
            Some(0)
        }
        ColumnFallback::SampleChecked => {
            // The sample check is always a lenient looks-like-a-URL test,
            // independent of the configured validation mode
            let sample_hit = rows
                .iter()
                .filter_map(|row| row.get(0))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .take(SAMPLE_SIZE)
                .any(|value| value.starts_with("http"));
            if sample_hit {
                tracing::debug!("first column passes the URL sample check");
                Some(0)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UrlValidation;

    fn parse(content: &str, options: &ExtractorOptions) -> Option<ParsedUrls> {
        parse_delimited_text(content.as_bytes(), options)
    }

    #[test]
    fn test_exact_url_header_wins() {
        let parsed = parse(
            "name,url\nfirst,https://example.com/1\nsecond,https://example.com/2\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        assert_eq!(
            parsed.urls,
            vec!["https://example.com/1", "https://example.com/2"]
        );
        assert_eq!(parsed.encoding, "utf-8");
        assert_eq!(parsed.delimiter, "comma");
    }

    #[test]
    fn test_header_containing_link_case_insensitive() {
        let parsed = parse(
            "id,Video LINK\n1,https://example.com/a\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        assert_eq!(parsed.urls, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let parsed = parse(
            "id;url\n1;https://example.com/a\n2;https://example.com/b\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        assert_eq!(parsed.delimiter, "semicolon");
        assert_eq!(parsed.urls.len(), 2);
    }

    #[test]
    fn test_tab_delimiter() {
        let parsed = parse(
            "id\turl\n1\thttps://example.com/a\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        assert_eq!(parsed.delimiter, "tab");
        assert_eq!(parsed.urls, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_sample_checked_fallback_accepts_url_like_first_column() {
        let parsed = parse(
            "items,count\nhttps://example.com/a,3\nhttps://example.com/b,4\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        assert_eq!(parsed.urls.len(), 2);
    }

    #[test]
    fn test_sample_checked_fallback_rejects_plain_values() {
        let result = parse(
            "items,count\napples,3\npears,4\n",
            &ExtractorOptions::default(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_unconditional_fallback_selects_first_column() {
        let options = ExtractorOptions {
            column_fallback: ColumnFallback::Unconditional,
            ..ExtractorOptions::default()
        };

        // First column has one URL among plain values; unconditional mode
        // still picks the column and validation filters the values
        let parsed = parse("items,count\napples,3\nhttps://example.com/a,4\n", &options).unwrap();
        assert_eq!(parsed.urls, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_lenient_prefix_accepts_scheme_less_values() {
        let parsed = parse(
            "url\nhttp-proxy-config\nhttps://example.com/a\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        // Lenient mode keeps anything starting with "http"
        assert_eq!(parsed.urls.len(), 2);
    }

    #[test]
    fn test_full_scheme_filters_scheme_less_values() {
        let options = ExtractorOptions {
            url_validation: UrlValidation::FullScheme,
            ..ExtractorOptions::default()
        };

        let parsed = parse("url\nhttp-proxy-config\nhttps://example.com/a\n", &options).unwrap();
        assert_eq!(parsed.urls, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_empty_and_whitespace_values_dropped() {
        let parsed = parse(
            "url\nhttps://example.com/a\n\"\"\n   \nhttps://example.com/b\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        assert_eq!(
            parsed.urls,
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_quoted_field_with_embedded_delimiter() {
        let parsed = parse(
            "url,note\n\"https://example.com/watch?a=1,b=2\",ok\n",
            &ExtractorOptions::default(),
        )
        .unwrap();

        assert_eq!(parsed.urls, vec!["https://example.com/watch?a=1,b=2"]);
    }

    #[test]
    fn test_no_urls_anywhere() {
        assert!(parse("a,b\n1,2\n", &ExtractorOptions::default()).is_none());
    }

    #[test]
    fn test_non_utf8_encoding_falls_through() {
        // Windows-1252 encoded header "vidéo url" is invalid as UTF-8, so the
        // first encoding is rejected and a later one wins
        let mut content: Vec<u8> = Vec::new();
        content.extend_from_slice(b"vid\xe9o url\n");
        content.extend_from_slice(b"https://example.com/a\n");

        let parsed = parse_delimited_text(&content, &ExtractorOptions::default()).unwrap();
        assert_eq!(parsed.encoding, "iso-8859-1");
        assert_eq!(parsed.urls, vec!["https://example.com/a"]);
    }
}
