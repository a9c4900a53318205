//! HTML document capability
//!
//! [`DocumentParser`] is the narrow interface the crawler needs from an HTML
//! parser: turn markup into a document, then list the `href` of every anchor.

use scraper::{Html, Selector};

/// Capability to parse markup and select anchor hrefs
pub trait DocumentParser: Send + Sync {
    /// Parsed document handle
    type Document;

    /// Parses raw markup into a document
    fn parse(&self, raw: &str) -> Self::Document;

    /// Returns the raw `href` value of every anchor element that has one
    fn select_anchors(&self, document: &Self::Document) -> Vec<String>;
}

/// [`DocumentParser`] backed by `scraper`
///
/// Parsing is lenient: malformed markup still yields a document, and every
/// `<a href>` in it is reported regardless of `rel`, `download` or scheme.
/// Deciding which links matter is the caller's job.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    type Document = Html;

    fn parse(&self, raw: &str) -> Html {
        Html::parse_document(raw)
    }

    fn select_anchors(&self, document: &Html) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}
