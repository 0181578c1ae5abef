//! Heuristic extractors for unknown pages.
//!
//! Neither extractor knows anything about specific sites. Each follows the
//! same two-step pattern:
//!
//! 1. **Crawling**: `crawl_*` fetches the page and turns fetch failures into
//!    a tagged result instead of an error
//! 2. **Extracting**: `extract_*` runs the heuristic over a parsed
//!    [`crate::dom::Document`], so it can be tested without a network
//!
//! | Extractor | Module | Output |
//! |-----------|--------|--------|
//! | Articles | [`articles`] | up to 20 title/link records |
//! | Images | [`images`] | deduplicated absolute image URLs |

pub mod articles;
pub mod images;
