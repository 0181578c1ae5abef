//! Image URL discovery.
//!
//! Collects the `src` of every `<img>` in document order, resolves it
//! against the page URL and keeps it only if it is an http(s) URL whose path
//! ends in a known image extension. URLs without an extension (common on
//! CDNs) are dropped. Duplicates are removed by exact string comparison of
//! the resolved URL, query string included.

use crate::dom::{Document, resolve};
use crate::error::FailureKind;
use crate::fetcher::PageFetcher;
use crate::models::{FetchOutcome, ImageCrawl};
use itertools::Itertools;
use tracing::{debug, info, instrument};
use url::Url;

const IMAGE_EXTENSIONS: &[&str] = &[".jpeg", ".jpg", ".png", ".gif", ".webp", ".svg"];

/// Fetch `url` and collect the image URLs it references.
#[instrument(level = "info", skip(fetcher))]
pub async fn crawl_images(fetcher: &PageFetcher, url: &str) -> ImageCrawl {
    let base = match Url::parse(url) {
        Ok(base) => base,
        Err(e) => {
            return ImageCrawl::NetworkFailure {
                kind: FailureKind::Network,
                message: format!("invalid URL {url}: {e}"),
            };
        }
    };

    match fetcher.fetch(url).await {
        FetchOutcome::Success {
            body,
            resolved_encoding,
        } => {
            debug!(encoding = resolved_encoding, "Parsing page");
            ImageCrawl::Success(extract_images(&Document::parse(&body), &base))
        }
        FetchOutcome::Failure { kind, message } => ImageCrawl::NetworkFailure { kind, message },
    }
}

/// Absolute, deduplicated image URLs in first-seen order.
pub fn extract_images(document: &Document, base: &Url) -> Vec<String> {
    let urls: Vec<String> = document
        .elements_named("img")
        .filter_map(|img| img.attr("src"))
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .filter_map(|src| resolve(base, src))
        .filter(has_image_extension)
        .map(String::from)
        .unique()
        .collect();

    info!(count = urls.len(), "Extracted image URLs");
    urls
}

fn has_image_extension(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    // `Url::path` already excludes the query and fragment.
    let path = url.path().to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extract(html: &str, base: &str) -> Vec<String> {
        extract_images(&Document::parse(html), &Url::parse(base).unwrap())
    }

    #[test]
    fn test_query_variants_are_distinct() {
        let found = extract(
            r#"<img src="/img/pic.png"><img src="/img/pic.png?v=2"><img src="/img/pic.png">"#,
            "https://ex.com",
        );
        assert_eq!(
            found,
            vec!["https://ex.com/img/pic.png", "https://ex.com/img/pic.png?v=2"]
        );
    }

    #[test]
    fn test_data_uris_and_missing_src_are_skipped() {
        let found = extract(
            r#"<img src="data:image/png;base64,iVBORw0KGgo=">
               <img alt="no source">
               <img src="">
               <img src="ok.gif">"#,
            "https://ex.com/gallery/",
        );
        assert_eq!(found, vec!["https://ex.com/gallery/ok.gif"]);
    }

    #[test]
    fn test_extension_filter() {
        let found = extract(
            r#"<img src="/a.JPG">
               <img src="/b.jpeg#frag">
               <img src="/cdn/image?id=7">
               <img src="/c.png.html">
               <img src="/d.svg?size=large">
               <img src="ftp://ex.com/e.png">
               <img src="//cdn.ex.org/f.webp">"#,
            "https://ex.com/page",
        );
        assert_eq!(
            found,
            vec![
                "https://ex.com/a.JPG",
                "https://ex.com/b.jpeg#frag",
                "https://ex.com/d.svg?size=large",
                "https://cdn.ex.org/f.webp",
            ]
        );
    }

    #[test]
    fn test_no_images() {
        assert!(extract("<p>text only</p>", "https://ex.com").is_empty());
    }

    #[tokio::test]
    async fn test_crawl_images_resolves_against_page_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<img src="../img/cat.png"><img src="cat.png">"#),
            )
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::from_config(&AppConfig::default()).unwrap();
        let url = format!("{}/blog/post/", mock_server.uri());
        match crawl_images(&fetcher, &url).await {
            ImageCrawl::Success(urls) => assert_eq!(
                urls,
                vec![
                    format!("{}/blog/img/cat.png", mock_server.uri()),
                    format!("{}/blog/post/cat.png", mock_server.uri()),
                ]
            ),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_crawl_images_fetch_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::from_config(&AppConfig::default()).unwrap();
        match crawl_images(&fetcher, &mock_server.uri()).await {
            ImageCrawl::NetworkFailure { kind, message } => {
                assert_eq!(kind, FailureKind::HttpStatus);
                assert!(message.contains("503"), "unexpected message: {message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
