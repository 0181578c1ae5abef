//! Utility functions for URL validation, naming, string manipulation, and file system operations.
//!
//! This module provides helper functions used throughout the application:
//! - Target URL validation before any network activity
//! - Directory and file naming for crawl artifacts
//! - String truncation for logging
//! - File system validation for output directories

use crate::error::FetchError;
use chrono::{DateTime, Local};
use std::error::Error;
use std::fs as stdfs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Accept only absolute `http://` or `https://` URLs.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for any other scheme or for text that
/// does not parse as a URL.
pub fn validate_target_url(input: &str) -> Result<Url, FetchError> {
    let input = input.trim();
    if !(input.starts_with("http://") || input.starts_with("https://")) {
        return Err(FetchError::InvalidUrl(format!(
            "{input}: the address must start with http:// or https://"
        )));
    }
    Url::parse(input).map_err(|e| FetchError::InvalidUrl(format!("{input}: {e}")))
}

/// Host of `url` with dots replaced by underscores, for directory names.
///
/// ```ignore
/// assert_eq!(sanitize_host("https://blog.ex.com:8080/x"), "blog_ex_com");
/// ```
pub fn sanitize_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.replace('.', "_")))
        .unwrap_or_else(|| "unknown_host".to_string())
}

/// Directory that receives the images of one crawl:
/// `<output_dir>/image/images_<host>_<YYYYMMDD_HHMMSS>`.
pub fn image_dir_for(output_dir: &Path, url: &str, now: DateTime<Local>) -> PathBuf {
    output_dir.join("image").join(format!(
        "images_{}_{}",
        sanitize_host(url),
        now.format("%Y%m%d_%H%M%S")
    ))
}

/// Timestamp used in CSV and report file names.
pub fn file_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with an ellipsis and byte count indicator appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
