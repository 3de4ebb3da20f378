//! HTML parser for extracting links
//!
//! Only raw `href` values are extracted here; deciding which of them to follow
//! and resolving them against the page URL is done by `crate::url::resolve_link`.

use crate::url::resolve_link;
use scraper::{Html, Selector};
use url::Url;

/// Extracts every anchor `href` value from an HTML document, in document order
///
/// Values are returned untrimmed and unresolved; empty hrefs are included.
///
/// # Example
///
/// ```
/// use text_harvest::crawler::extract_links;
///
/// let html = r#"<html><body><a href="/page">Link</a><a>No href</a></body></html>"#;
/// assert_eq!(extract_links(html), vec!["/page".to_string()]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

/// Extracts anchors from `html` and resolves the followable ones against `base_url`
///
/// Skipped hrefs (empty, `javascript:`, fragment-only, non-HTTP) are dropped.
pub fn extract_resolved_links(html: &str, base_url: &Url) -> Vec<String> {
    extract_links(html)
        .iter()
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}
