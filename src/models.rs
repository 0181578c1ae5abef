//! Data models shared by the fetcher, the extractors and the downloader.
//!
//! This module defines the values passed between pipeline stages:
//! - [`ArticleRecord`]: a title/link pair found on a page
//! - [`ArticleCrawl`] / [`ImageCrawl`]: tagged results of a page crawl
//! - [`FetchOutcome`]: result of a single page GET
//! - [`DownloadOutcome`]: per-asset result of a download batch
//!
//! Everything here lives for one invocation only and is handed to the
//! display/persistence code afterwards.

use crate::error::FailureKind;
use serde::Serialize;

/// Maximum number of article records one crawl may produce.
pub const MAX_ARTICLES: usize = 20;

/// Guidance shown when neither heuristic finds anything on a page.
pub const NO_ARTICLES_GUIDANCE: &str = "No recognizable articles were found. \
The page does not follow a known article layout, so the generic selectors need tuning.
To find better selectors:
1. Open the target site in a browser.
2. Right-click an article title and choose 'Inspect'.
3. In the developer tools, find the tag and class that uniquely identify article titles and links.
4. Add a site-specific selector for those elements, e.g. `div.article-card` or `h2.post-title > a`.";

/// A title and link pair extracted from a page.
///
/// `link` is absolute, or empty when the record is the diagnostic sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// Visible heading or anchor text, whitespace-trimmed.
    pub title: String,
    /// Absolute URL the title points at.
    pub link: String,
}

impl ArticleRecord {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }

    /// The "nothing found" sentinel.
    pub fn no_content() -> Self {
        Self::new(NO_ARTICLES_GUIDANCE, "")
    }

    /// A sentinel describing a failed page fetch.
    pub fn fetch_failure(url: &str, message: &str) -> Self {
        Self::new(format!("Error while reading {url}: {message}"), "")
    }

    /// True for diagnostic records, which never carry a link.
    pub fn is_sentinel(&self) -> bool {
        self.link.is_empty()
    }
}

/// Result of fetching a single page.
#[derive(Debug)]
pub enum FetchOutcome {
    Success {
        /// Body decoded to UTF-8.
        body: String,
        /// Label of the encoding the body was decoded from.
        resolved_encoding: &'static str,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

/// Tagged result of an article crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleCrawl {
    /// One to [`MAX_ARTICLES`] records.
    Success(Vec<ArticleRecord>),
    /// The page was fetched but neither heuristic matched.
    EmptyResult,
    /// The page could not be fetched.
    NetworkFailure { kind: FailureKind, message: String },
}

impl ArticleCrawl {
    /// Flatten into the record list shown to the user.
    ///
    /// Non-success variants become exactly one sentinel record with an
    /// empty link.
    pub fn into_records(self, url: &str) -> Vec<ArticleRecord> {
        match self {
            ArticleCrawl::Success(records) => records,
            ArticleCrawl::EmptyResult => vec![ArticleRecord::no_content()],
            ArticleCrawl::NetworkFailure { message, .. } => {
                vec![ArticleRecord::fetch_failure(url, &message)]
            }
        }
    }
}

/// Tagged result of an image crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCrawl {
    /// Absolute image URLs in first-seen order; may be empty.
    Success(Vec<String>),
    NetworkFailure { kind: FailureKind, message: String },
}

/// Result of downloading one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub source_url: String,
    /// File name inside the destination directory; empty if none was derived.
    pub local_name: String,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl DownloadOutcome {
    pub fn success(source_url: &str, local_name: String) -> Self {
        Self {
            source_url: source_url.to_string(),
            local_name,
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(source_url: &str, local_name: String, error: impl ToString) -> Self {
        Self {
            source_url: source_url.to_string(),
            local_name,
            succeeded: false,
            error: Some(error.to_string()),
        }
    }
}

/// Count successful outcomes in a batch report.
pub fn tally(outcomes: &[DownloadOutcome]) -> (usize, usize) {
    let ok = outcomes.iter().filter(|o| o.succeeded).count();
    (ok, outcomes.len())
}
