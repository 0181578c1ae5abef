//! Minimal DOM view used by the extractors.
//!
//! Wraps a parsed `scraper::Html` tree and exposes only what the heuristics
//! need: elements by tag name in document order, depth-first descendant
//! search, attribute access and visible text. Document order matters
//! because it decides both the output order and which records survive
//! the article cap.

use scraper::{ElementRef, Html};
use url::Url;

/// A parsed HTML document.
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Every element named `tag`, in document order.
    pub fn elements_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = Node<'a>> + 'a {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(move |el| el.value().name().eq_ignore_ascii_case(tag))
            .map(Node)
    }
}

/// A single element in a [`Document`].
#[derive(Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }

    /// First descendant (depth-first, pre-order) whose tag is in `tags`.
    pub fn find_first(&self, tags: &[&str]) -> Option<Node<'a>> {
        self.0
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| tags.iter().any(|t| el.value().name().eq_ignore_ascii_case(t)))
            .map(Node)
    }

    /// Text content: every text node trimmed, blank ones dropped, the rest
    /// concatenated. Spacing inside a text node is left as is.
    pub fn text(&self) -> String {
        self.0
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Resolve `reference` against `base` with standard URL-join semantics.
pub fn resolve(base: &Url, reference: &str) -> Option<Url> {
    base.join(reference.trim()).ok()
}
