//! Runtime configuration.
//!
//! Defaults are compiled in; an optional YAML file can override any of
//! them. The header profile is built once and handed to the
//! [`crate::fetcher::PageFetcher`] by value, never mutated afterwards.
//!
//! ```yaml
//! headers:
//!   user_agent: "Mozilla/5.0 ..."
//!   referer: "https://www.google.com/"
//! page_timeout_secs: 10
//! asset_timeout_secs: 15
//! download_concurrency: 4
//! ```

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Upper bound on parallel asset downloads.
pub const MAX_DOWNLOAD_CONCURRENCY: usize = 8;

/// Browser-like request headers sent with every fetch.
///
/// These exist to get past naive bot filters that reject obvious scripts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeaderProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
    pub do_not_track: bool,
    pub keep_alive: bool,
    pub upgrade_insecure_requests: bool,
}

impl Default for HeaderProfile {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            referer: "https://www.google.com/".to_string(),
            do_not_track: true,
            keep_alive: true,
            upgrade_insecure_requests: true,
        }
    }
}

impl HeaderProfile {
    /// Render the profile as a header map for the HTTP client.
    pub fn to_header_map(&self) -> Result<HeaderMap, header::InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        headers.insert(header::ACCEPT, HeaderValue::from_str(&self.accept)?);
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_str(&self.accept_language)?,
        );
        if !self.referer.is_empty() {
            headers.insert(header::REFERER, HeaderValue::from_str(&self.referer)?);
        }
        if self.do_not_track {
            headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
        }
        if self.keep_alive {
            headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        }
        if self.upgrade_insecure_requests {
            headers.insert(
                header::UPGRADE_INSECURE_REQUESTS,
                HeaderValue::from_static("1"),
            );
        }
        Ok(headers)
    }
}

/// Application settings, optionally loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub headers: HeaderProfile,
    pub page_timeout_secs: u64,
    pub asset_timeout_secs: u64,
    pub download_concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            headers: HeaderProfile::default(),
            page_timeout_secs: 10,
            asset_timeout_secs: 15,
            download_concurrency: 4,
        }
    }
}

impl AppConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }

    /// Worker pool size, clamped to `1..=MAX_DOWNLOAD_CONCURRENCY`.
    pub fn concurrency(&self) -> usize {
        self.download_concurrency.clamp(1, MAX_DOWNLOAD_CONCURRENCY)
    }

    /// Parse settings from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Load settings from `path`, or defaults when no path is given.
    ///
    /// A missing file falls back to defaults; a malformed one is an error.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            info!(path = %path.display(), "Config file not found; using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}
