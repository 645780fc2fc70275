//! ZIP archive handling for URL extraction
//!
//! Archives are detected by magic bytes rather than file extension, unpacked
//! to a sibling `<stem>_extracted` directory, and their entries searched for
//! URL-bearing CSV files first, then TXT files.

use crate::config::ExtractorOptions;
use crate::extract::{extract_from_text_file, ExtractError, ExtractResult};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// ZIP local-file-header magic
const ZIP_MAGIC: &[u8; 2] = b"PK";

/// Checks whether a file starts with the ZIP magic bytes
pub(crate) fn is_zip(path: &Path) -> std::io::Result<bool> {
    let mut file = File::open(path)?;
    let mut header = [0u8; 4];
    let read = file.read(&mut header)?;
    Ok(read >= 2 && &header[..2] == ZIP_MAGIC)
}

/// Extracts URLs from a ZIP archive
///
/// Unpacks the archive next to the input file, then tries every extracted
/// `.csv` entry through the text pipeline, then every `.txt` entry, in
/// sorted path order for determinism. The first entry yielding URLs wins.
pub(crate) fn extract_from_archive(
    zip_path: &Path,
    options: &ExtractorOptions,
) -> ExtractResult<Vec<String>> {
    let extract_dir = extraction_dir(zip_path);
    std::fs::create_dir_all(&extract_dir)?;

    unpack_archive(zip_path, &extract_dir)?;

    for extension in ["csv", "txt"] {
        for candidate in collect_files_with_extension(&extract_dir, extension)? {
            tracing::info!("Found {} in ZIP: {}", extension, candidate.display());
            match extract_from_text_file(&candidate, options) {
                Ok(urls) => return Ok(urls),
                Err(e) => {
                    tracing::debug!("entry {} yielded no URLs: {}", candidate.display(), e);
                    continue;
                }
            }
        }
    }

    Err(ExtractError::NoUrlsFound(zip_path.to_path_buf()))
}

/// Directory the archive contents are unpacked into: `<stem>_extracted`
/// next to the archive itself
fn extraction_dir(zip_path: &Path) -> PathBuf {
    let stem = zip_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    zip_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{stem}_extracted"))
}

/// Unpacks every entry of the archive into `dest`, skipping entries whose
/// names would escape the destination directory
fn unpack_archive(zip_path: &Path, dest: &Path) -> ExtractResult<()> {
    let file = File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ExtractError::Archive {
        path: zip_path.to_path_buf(),
        reason: format!("failed to read ZIP archive: {e}"),
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| ExtractError::Archive {
            path: zip_path.to_path_buf(),
            reason: format!("failed to read ZIP entry: {e}"),
        })?;

        let entry_path = match entry.enclosed_name() {
            Some(name) => dest.join(name),
            None => {
                tracing::warn!("skipping ZIP entry with unsafe path");
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&entry_path)?;
            continue;
        }

        if let Some(parent) = entry_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&entry_path)?;
        std::io::copy(&mut entry, &mut outfile)?;
    }

    Ok(())
}

/// Recursively collects files with the given extension under `root`,
/// sorted by path
fn collect_files_with_extension(root: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
                .unwrap_or(false)
            {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_urls;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn build_zip(dir: &TempDir, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (entry_name, content) in entries {
            writer
                .start_file(*entry_name, FileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_is_zip_detects_magic() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(&dir, "input.zip", &[("a.txt", "hello")]);
        assert!(is_zip(&zip_path).unwrap());

        let text_path = dir.path().join("plain.csv");
        std::fs::write(&text_path, "url\nhttps://example.com\n").unwrap();
        assert!(!is_zip(&text_path).unwrap());
    }

    #[test]
    fn test_is_zip_short_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiny");
        std::fs::write(&path, "P").unwrap();
        assert!(!is_zip(&path).unwrap());
    }

    #[test]
    fn test_archive_with_csv_entry() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(
            &dir,
            "input.zip",
            &[("urls.csv", "url\nhttps://example.com/v/1\n")],
        );

        let urls = extract_urls(&zip_path, &ExtractorOptions::default()).unwrap();
        assert_eq!(urls, vec!["https://example.com/v/1"]);

        // Contents land in the sibling extraction directory
        assert!(dir.path().join("input_extracted").join("urls.csv").exists());
    }

    #[test]
    fn test_archive_prefers_csv_over_txt() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(
            &dir,
            "input.zip",
            &[
                ("list.txt", "https://example.com/from-txt\n"),
                ("urls.csv", "url\nhttps://example.com/from-csv\n"),
            ],
        );

        let urls = extract_urls(&zip_path, &ExtractorOptions::default()).unwrap();
        assert_eq!(urls, vec!["https://example.com/from-csv"]);
    }

    #[test]
    fn test_archive_falls_back_to_txt() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(
            &dir,
            "input.zip",
            &[
                ("readme.csv", "a,b\n1,2\n"),
                ("list.txt", "https://example.com/from-txt\n"),
            ],
        );

        let urls = extract_urls(&zip_path, &ExtractorOptions::default()).unwrap();
        assert_eq!(urls, vec!["https://example.com/from-txt"]);
    }

    #[test]
    fn test_archive_with_nested_entry() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(
            &dir,
            "input.zip",
            &[("inner/urls.csv", "url\nhttps://example.com/nested\n")],
        );

        let urls = extract_urls(&zip_path, &ExtractorOptions::default()).unwrap();
        assert_eq!(urls, vec!["https://example.com/nested"]);
    }

    #[test]
    fn test_archive_without_url_entries() {
        let dir = TempDir::new().unwrap();
        let zip_path = build_zip(&dir, "input.zip", &[("data.bin", "0101")]);

        let result = extract_urls(&zip_path, &ExtractorOptions::default());
        assert!(matches!(result, Err(ExtractError::NoUrlsFound(_))));
    }
}
