//! HTTP fetching with a fixed browser-like header profile.
//!
//! A [`PageFetcher`] owns one `reqwest::Client` built from a
//! [`HeaderProfile`]. Page fetches and asset fetches share that client but
//! use different per-request timeouts. Page bodies are decoded with the
//! encoding sniffed from their bytes (see [`crate::encoding`]), never the
//! declared `Content-Type` charset.

use crate::config::{AppConfig, HeaderProfile};
use crate::encoding::decode_body;
use crate::error::FetchError;
use crate::models::FetchOutcome;
use reqwest::{Client, Response};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Issues GET requests for pages and assets.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    page_timeout: Duration,
    asset_timeout: Duration,
}

impl PageFetcher {
    /// Build a fetcher whose every request carries `profile`'s headers.
    pub fn new(
        profile: &HeaderProfile,
        page_timeout: Duration,
        asset_timeout: Duration,
    ) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .default_headers(profile.to_header_map()?)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            page_timeout,
            asset_timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Box<dyn Error>> {
        Self::new(
            &config.headers,
            config.page_timeout(),
            config.asset_timeout(),
        )
    }

    /// Fetch a page and decode it to text.
    ///
    /// Never fails: transport errors and non-2xx statuses come back as
    /// [`FetchOutcome::Failure`].
    #[instrument(level = "info", skip(self))]
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        match self.fetch_page(url).await {
            Ok((body, resolved_encoding)) => {
                info!(
                    bytes = body.len(),
                    encoding = resolved_encoding,
                    "Fetched page"
                );
                FetchOutcome::Success {
                    body,
                    resolved_encoding,
                }
            }
            Err(e) => {
                warn!(error = %e, "Page fetch failed");
                FetchOutcome::Failure {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<(String, &'static str), FetchError> {
        let response = self.get(url, self.page_timeout).await?;
        let bytes = response.bytes().await?;
        Ok(decode_body(&bytes))
    }

    /// Start fetching an asset and return the response for streamed reading.
    ///
    /// The status has already been checked; the body has not been read.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_asset(&self, url: &str) -> Result<Response, FetchError> {
        self.get(url, self.asset_timeout).await
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Response, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "Received response");
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> PageFetcher {
        PageFetcher::from_config(&AppConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_header_profile() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog"))
            .and(header("dnt", "1"))
            .and(header("upgrade-insecure-requests", "1"))
            .and(header("referer", "https://www.google.com/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hello</p>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = fetcher()
            .fetch(&format!("{}/blog", mock_server.uri()))
            .await;
        match outcome {
            FetchOutcome::Success { body, .. } => assert_eq!(body, "<p>hello</p>"),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_ignores_declared_charset() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_bytes(b"<h1>Caf\xE9 cr\xE8me</h1>".to_vec()),
            )
            .mount(&mock_server)
            .await;

        match fetcher().fetch(&mock_server.uri()).await {
            FetchOutcome::Success {
                body,
                resolved_encoding,
            } => {
                assert_eq!(body, "<h1>Café crème</h1>");
                assert_eq!(resolved_encoding, "windows-1252");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_http_status_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        match fetcher().fetch(&mock_server.uri()).await {
            FetchOutcome::Failure { kind, message } => {
                assert_eq!(kind, FailureKind::HttpStatus);
                assert!(message.contains("503"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_network_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::new(
            &HeaderProfile::default(),
            Duration::from_millis(200),
            Duration::from_millis(200),
        )
        .unwrap();
        match fetcher.fetch(&mock_server.uri()).await {
            FetchOutcome::Failure { kind, .. } => assert_eq!(kind, FailureKind::Network),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_asset_checks_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = fetcher()
            .fetch_asset(&format!("{}/missing.png", mock_server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::HttpStatus);
    }
}
