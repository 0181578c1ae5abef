//! Article title/link extraction.
//!
//! Two heuristic tiers, tried in order:
//!
//! 1. **Containers**: every `<article>` element that holds both a `h1`-`h4`
//!    heading and an `<a>` yields one record (first heading, first anchor).
//! 2. **Prominent links**: only if tier 1 found nothing, every anchor with a
//!    long enough label that does not look like site navigation.
//!
//! Both tiers stop at [`MAX_ARTICLES`]. Records are not deduplicated.

use crate::dom::{Document, resolve};
use crate::error::FailureKind;
use crate::fetcher::PageFetcher;
use crate::models::{ArticleCrawl, ArticleRecord, FetchOutcome, MAX_ARTICLES};
use tracing::{debug, info, instrument};
use url::Url;

const CONTAINER_TAG: &str = "article";
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4"];

/// Anchor labels must be strictly longer than this, in characters.
const MIN_LINK_TEXT_CHARS: usize = 10;

/// Case-insensitive substrings that mark an anchor as navigation chrome.
///
/// Matched anywhere in the label, so a real headline containing one of
/// these words is rejected too.
const NAV_KEYWORDS: &[&str] = &["home", "about", "contact", "privacy", "terms", "subscribe"];

/// Fetch `url` and extract article records from it.
#[instrument(level = "info", skip(fetcher))]
pub async fn crawl_articles(fetcher: &PageFetcher, url: &str) -> ArticleCrawl {
    let base = match Url::parse(url) {
        Ok(base) => base,
        Err(e) => {
            return ArticleCrawl::NetworkFailure {
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
            let document = Document::parse(&body);
            extract_articles(&document, &base)
        }
        FetchOutcome::Failure { kind, message } => ArticleCrawl::NetworkFailure { kind, message },
    }
}

/// Run both heuristic tiers over an already parsed document.
pub fn extract_articles(document: &Document, base: &Url) -> ArticleCrawl {
    let mut records = from_containers(document, base);
    if records.is_empty() {
        debug!("No article containers matched; falling back to prominent links");
        records = from_prominent_links(document, base);
    }

    if records.is_empty() {
        info!("No articles recognized");
        ArticleCrawl::EmptyResult
    } else {
        info!(count = records.len(), "Extracted articles");
        ArticleCrawl::Success(records)
    }
}

fn from_containers(document: &Document, base: &Url) -> Vec<ArticleRecord> {
    let mut records = Vec::new();
    for container in document.elements_named(CONTAINER_TAG) {
        let (Some(heading), Some(anchor)) = (
            container.find_first(HEADING_TAGS),
            container.find_first(&["a"]),
        ) else {
            continue;
        };

        let title = heading.text();
        let href = anchor.attr("href").unwrap_or_default();
        if title.is_empty() || href.is_empty() {
            continue;
        }
        let Some(link) = resolve(base, href) else {
            continue;
        };

        records.push(ArticleRecord::new(title, link));
        if records.len() >= MAX_ARTICLES {
            break;
        }
    }
    records
}

fn from_prominent_links(document: &Document, base: &Url) -> Vec<ArticleRecord> {
    let mut records = Vec::new();
    for anchor in document.elements_named("a") {
        if records.len() >= MAX_ARTICLES {
            break;
        }

        let Some(href) = anchor.attr("href").filter(|h| !h.is_empty()) else {
            continue;
        };
        let text = anchor.text();
        if !is_prominent_link(href, &text) {
            continue;
        }
        if let Some(link) = resolve(base, href) {
            records.push(ArticleRecord::new(text, link));
        }
    }
    records
}

fn is_prominent_link(href: &str, text: &str) -> bool {
    if text.chars().count() <= MIN_LINK_TEXT_CHARS {
        return false;
    }
    if !(href.starts_with("http") || href.starts_with('/')) {
        return false;
    }
    let lower = text.to_lowercase();
    !NAV_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::NO_ARTICLES_GUIDANCE;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn base() -> Url {
        Url::parse("https://blog.ex.com/posts/").unwrap()
    }

    fn records(crawl: ArticleCrawl) -> Vec<ArticleRecord> {
        match crawl {
            ArticleCrawl::Success(records) => records,
            other => panic!("expected records, got {other:?}"),
        }
    }

    #[test]
    fn test_containers_in_document_order() {
        let html = r#"
            <article><h2>First post</h2><a href="first">read</a></article>
            <article><p>no heading</p><a href="/skip">skip</a></article>
            <article><h1>No link here</h1></article>
            <article><div><h4>
                Second post </h4></div><a href="https://other.org/2">go</a><h1>ignored</h1></article>
            <a href="/a-very-long-navigation-free-link">A very long link text here</a>"#;
        let found = records(extract_articles(&Document::parse(html), &base()));
        assert_eq!(
            found,
            vec![
                ArticleRecord::new("First post", "https://blog.ex.com/posts/first"),
                ArticleRecord::new("Second post", "https://other.org/2"),
            ]
        );
    }

    #[test]
    fn test_container_with_empty_href_is_skipped() {
        let html = r#"
            <article><h2>Empty</h2><a href="">x</a></article>
            <article><h2>Missing</h2><a name="anchor">x</a></article>
            <article><h2>Kept</h2><a href="/kept">x</a></article>"#;
        let found = records(extract_articles(&Document::parse(html), &base()));
        assert_eq!(found, vec![ArticleRecord::new("Kept", "https://blog.ex.com/kept")]);
    }

    #[test]
    fn test_containers_capped_at_twenty() {
        let html: String = (0..30)
            .map(|i| format!("<article><h3>Post {i}</h3><a href=\"/p/{i}\">x</a></article>"))
            .collect();
        let found = records(extract_articles(&Document::parse(&html), &base()));
        assert_eq!(found.len(), MAX_ARTICLES);
        assert_eq!(found[0].title, "Post 0");
        assert_eq!(found[19].link, "https://blog.ex.com/p/19");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let html = r#"
            <article><h2>Same</h2><a href="/same">x</a></article>
            <article><h2>Same</h2><a href="/same">x</a></article>"#;
        let found = records(extract_articles(&Document::parse(html), &base()));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], found[1]);
    }

    #[test]
    fn test_links_tier_filters() {
        let html = r#"
            <nav><a href="/">Back to Home page please</a></nav>
            <a href="/short">Too short</a>
            <a href="/exactly10c">0123456789</a>
            <a href="/eleven">01234567890</a>
            <a href="relative/path">Relative links are not prominent</a>
            <a href="mailto:x@ex.com">Write to the editorial team</a>
            <a href="https://news.ex.org/story">  Big   story of the day  </a>
            <a href="/why">Why we SUBSCRIBE to nothing</a>
            <a>An anchor without any href at all</a>
            <a href="/guide">A guide to Rust lifetimes</a>"#;
        let found = records(extract_articles(&Document::parse(html), &base()));
        assert_eq!(
            found,
            vec![
                ArticleRecord::new("01234567890", "https://blog.ex.com/eleven"),
                ArticleRecord::new("Big   story of the day", "https://news.ex.org/story"),
                ArticleRecord::new("A guide to Rust lifetimes", "https://blog.ex.com/guide"),
            ]
        );
    }

    #[test]
    fn test_links_tier_skipped_when_containers_match() {
        let html = r#"
            <a href="/long-link">This link would pass the fallback</a>
            <article><h2>Only this</h2><a href="/only">x</a></article>"#;
        let found = records(extract_articles(&Document::parse(html), &base()));
        assert_eq!(found, vec![ArticleRecord::new("Only this", "https://blog.ex.com/only")]);
    }

    #[test]
    fn test_links_tier_capped_at_twenty() {
        let html: String = (0..25)
            .map(|i| format!("<a href=\"/story/{i}\">Story number {i:02} of many</a>"))
            .collect();
        let found = records(extract_articles(&Document::parse(&html), &base()));
        assert_eq!(found.len(), MAX_ARTICLES);
        assert_eq!(found[19].title, "Story number 19 of many");
    }

    #[test]
    fn test_link_text_length_counts_inner_spaces() {
        let base = Url::parse("https://ex.com/").unwrap();
        let found = records(extract_articles(
            &Document::parse(r#"<a href="/x">Go      now</a>"#),
            &base,
        ));
        assert_eq!(found, vec![ArticleRecord::new("Go      now", "https://ex.com/x")]);
    }

    #[test]
    fn test_nothing_found_is_empty_result() {
        let html = "<p>Just text</p><a href='/x'>short</a><article><p>no heading</p></article>";
        let crawl = extract_articles(&Document::parse(html), &base());
        assert_eq!(crawl, ArticleCrawl::EmptyResult);

        let records = crawl.into_records("https://blog.ex.com/posts/");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].link, "");
        assert_eq!(records[0].title, NO_ARTICLES_GUIDANCE);
    }

    #[tokio::test]
    async fn test_crawl_articles_end_to_end() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<article><h2>Hello</h2><a href=\"/hello\">read</a></article>",
            ))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::from_config(&AppConfig::default()).unwrap();
        let url = format!("{}/blog/", mock_server.uri());
        let found = records(crawl_articles(&fetcher, &url).await);
        assert_eq!(
            found,
            vec![ArticleRecord::new("Hello", format!("{}/hello", mock_server.uri()))]
        );
    }

    #[tokio::test]
    async fn test_crawl_articles_fetch_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::from_config(&AppConfig::default()).unwrap();
        match crawl_articles(&fetcher, &mock_server.uri()).await {
            ArticleCrawl::NetworkFailure { kind, .. } => assert_eq!(kind, FailureKind::HttpStatus),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
