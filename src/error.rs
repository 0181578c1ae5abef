//! Error types for fetching, downloading and report generation.
//!
//! Page-level fetch failures are converted into data by the extractors
//! (see [`crate::models::ArticleCrawl`]); the types here exist so that the
//! conversion keeps the failure kind and a readable message.

use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a failed page or asset fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Timeout, refused connection, DNS failure, body read error.
    Network,
    /// The server answered with a non-2xx status.
    HttpStatus,
}

/// Failure of a single HTTP GET.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success status code.
    #[error("HTTP {status} for {url}")]
    HttpStatus {
        /// Numeric status returned by the server.
        status: u16,
        /// URL that produced it.
        url: String,
    },

    /// The target was not an absolute http(s) URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Map the error to its reporting category.
    ///
    /// An invalid URL never reaches the network but is reported as a
    /// network-class failure so callers only ever branch on two kinds.
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::HttpStatus { .. } => FailureKind::HttpStatus,
            FetchError::Network(_) | FetchError::InvalidUrl(_) => FailureKind::Network,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchError::HttpStatus {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            };
        }
        if e.is_timeout() {
            FetchError::Network(format!("timed out: {e}"))
        } else if e.is_connect() {
            FetchError::Network(format!("connection failed: {e}"))
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Errors raised by the asset downloader.
///
/// Only [`DownloadError::DestinationUnavailable`] escapes `download_all`;
/// the other variants are recorded per item in a
/// [`crate::models::DownloadOutcome`].
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The destination directory could not be created.
    #[error("cannot create destination directory {}: {source}", path.display())]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fetching the asset failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Writing the asset to disk failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while producing the analysis report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No crawl data is available to analyze.
    #[error("no data to analyze: {0}")]
    NoData(String),

    /// No API key was supplied.
    #[error("an API key is required (pass --api-key or set GEMINI_API_KEY)")]
    MissingApiKey,

    /// The model API rejected the request or answered with garbage.
    #[error("model API error: {0}")]
    Api(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        ReportError::Api(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_kind() {
        let status = FetchError::HttpStatus {
            status: 404,
            url: "https://ex.com/".to_string(),
        };
        assert_eq!(status.kind(), FailureKind::HttpStatus);
        assert_eq!(status.to_string(), "HTTP 404 for https://ex.com/");

        assert_eq!(
            FetchError::Network("reset".into()).kind(),
            FailureKind::Network
        );
        assert_eq!(
            FetchError::InvalidUrl("ftp://x".into()).kind(),
            FailureKind::Network
        );
    }

    #[test]
    fn test_destination_unavailable_message() {
        let err = DownloadError::DestinationUnavailable {
            path: PathBuf::from("/nope/images"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nope/images"));
        assert!(err.to_string().contains("denied"));
    }
}
