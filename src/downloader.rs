//! Batch image download with per-item fault isolation.
//!
//! The destination directory is created once up front; failing that aborts
//! the whole batch before any request is made. After that every URL is
//! fetched independently by a small worker pool: a failed fetch or write is
//! recorded in that item's [`DownloadOutcome`] and the rest of the batch
//! carries on. Outcomes are returned in input order regardless of which
//! request finishes first.

use crate::error::{DownloadError, FetchError};
use crate::fetcher::PageFetcher;
use crate::models::{DownloadOutcome, tally};
use futures::stream::{self, StreamExt};
use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Extension used when neither the URL nor the content type gives one.
const FALLBACK_EXTENSION: &str = ".jpg";

/// Download every URL in `urls` into `destination`.
///
/// At most `concurrency` requests are in flight at once. Only a failure to
/// create `destination` is returned as an error.
#[instrument(level = "info", skip(fetcher, urls, destination), fields(count = urls.len(), destination = %destination.display()))]
pub async fn download_all(
    fetcher: &PageFetcher,
    urls: &[String],
    destination: &Path,
    concurrency: usize,
) -> Result<Vec<DownloadOutcome>, DownloadError> {
    fs::create_dir_all(destination)
        .await
        .map_err(|source| DownloadError::DestinationUnavailable {
            path: destination.to_path_buf(),
            source,
        })?;

    let names = planned_names(urls);
    let outcomes: Vec<DownloadOutcome> = stream::iter(urls.iter().zip(names).enumerate())
        .map(|(index, (url, name))| download_one(fetcher, url, index, name, destination))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let (saved, total) = tally(&outcomes);
    info!(saved, total, "Download batch finished");
    Ok(outcomes)
}

#[instrument(level = "debug", skip(fetcher, planned, destination))]
async fn download_one(
    fetcher: &PageFetcher,
    url: &str,
    index: usize,
    planned: Option<String>,
    destination: &Path,
) -> DownloadOutcome {
    let response = match fetcher.fetch_asset(url).await {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "Image download failed");
            return DownloadOutcome::failure(url, planned.unwrap_or_default(), e);
        }
    };

    let name = planned.unwrap_or_else(|| {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        synthesized_name(index, content_type)
    });

    let path = destination.join(&name);
    match write_body(response, &path).await {
        Ok(bytes) => {
            debug!(%url, file = %name, bytes, "Saved image");
            DownloadOutcome::success(url, name)
        }
        Err(e) => {
            warn!(%url, file = %name, error = %e, "Saving image failed");
            let _ = fs::remove_file(&path).await;
            DownloadOutcome::failure(url, name, e)
        }
    }
}

/// Stream the response body into a new file at `path`.
async fn write_body(mut response: Response, path: &Path) -> Result<u64, DownloadError> {
    let mut file = fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(FetchError::from)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

/// File names taken from the URLs, where the URL provides a usable one.
///
/// `None` means the name has to be synthesized from the response. Names are
/// planned for the whole batch so that no two items write the same file:
/// the `image_<index + 1>` stem of every item without a usable name is
/// reserved, and a URL name that is taken or uses a reserved stem gets
/// `_<index + 1>` appended to its stem.
fn planned_names(urls: &[String]) -> Vec<Option<String>> {
    let from_urls: Vec<Option<String>> = urls.iter().map(|url| name_from_url(url)).collect();
    let reserved: HashSet<String> = from_urls
        .iter()
        .enumerate()
        .filter(|(_, name)| name.is_none())
        .map(|(index, _)| synthesized_stem(index))
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    from_urls
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let name = name?;
            let mut candidate = name.clone();
            let mut attempt = 0;
            while taken.contains(&candidate) || reserved.contains(stem_of(&candidate)) {
                attempt += 1;
                candidate = disambiguate(&name, index, attempt);
            }
            taken.insert(candidate.clone());
            Some(candidate)
        })
        .collect()
}

/// Final path segment of `url`, if it looks like a file name with an extension.
fn name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let name = decoded.replace(['/', '\\'], "_");
    if name.is_empty() || !name.contains('.') {
        return None;
    }
    Some(name)
}

fn disambiguate(name: &str, index: usize, attempt: usize) -> String {
    let suffix = match attempt {
        1 => (index + 1).to_string(),
        n => format!("{}_{n}", index + 1),
    };
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{suffix}.{ext}"),
        _ => format!("{suffix}_{name}"),
    }
}

/// Everything before the first `.`; a synthesized extension may itself
/// contain dots.
fn stem_of(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

fn synthesized_stem(index: usize) -> String {
    format!("image_{}", index + 1)
}

/// `image_<index + 1><ext>` with the extension taken from the content type.
fn synthesized_name(index: usize, content_type: Option<&str>) -> String {
    format!("{}{}", synthesized_stem(index), extension_for(content_type))
}

/// Map `image/<subtype>` to `.<subtype>`, falling back to `.jpg`.
fn extension_for(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| {
            let essence = ct.split(';').next()?.trim().to_ascii_lowercase();
            let subtype = essence.strip_prefix("image/")?;
            // "svg+xml" -> "svg"
            let subtype = subtype.split('+').next()?;
            let valid = !subtype.is_empty()
                && subtype
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
            valid.then(|| format!(".{subtype}"))
        })
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
