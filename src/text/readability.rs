//! Readability-style main content extraction
//!
//! Reduces a page to its main content before text extraction:
//! 1. Boilerplate elements (navigation, headers, footers, sidebars, forms,
//!    scripts) are removed from the tree
//! 2. The first semantic content container is chosen, in priority order
//! 3. Failing that, the block holding the most paragraph text is chosen
//! 4. Failing that, `<body>` is used
//!
//! The chosen element is returned as an HTML fragment.

use crate::text::extract::extract_visible_text;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors returned when a document has nothing to summarize
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadabilityError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("No readable content found")]
    NoContent,
}

/// Elements removed before a content container is chosen
const BOILERPLATE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "form",
    "script",
    "style",
    "noscript",
    "iframe",
    "[role='navigation']",
    "[role='banner']",
    "[role='contentinfo']",
    ".sidebar",
    "#sidebar",
    ".navigation",
    ".menu",
    ".comments",
    "#comments",
    ".advertisement",
    ".cookie-notice",
];

/// Semantic content containers, in priority order
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    "#main-content",
    ".main-content",
    "#content",
    ".post-content",
    ".entry-content",
    "[itemprop='articleBody']",
];

/// Blocks considered by the paragraph-density fallback
const BLOCK_SELECTOR: &str = "div, section, td";

/// Returns the main-content fragment of `html`
///
/// # Errors
///
/// * `EmptyDocument` - `html` is empty or whitespace only
/// * `NoContent` - nothing visible remains once boilerplate is removed
///
/// # Example
///
/// ```
/// use text_harvest::text::{extract_visible_text, summarize};
///
/// let html = "<html><body><nav>Menu</nav><article><p>Story</p></article></body></html>";
/// let fragment = summarize(html).unwrap();
/// assert_eq!(extract_visible_text(&fragment), "Story");
/// ```
pub fn summarize(html: &str) -> Result<String, ReadabilityError> {
    if html.trim().is_empty() {
        return Err(ReadabilityError::EmptyDocument);
    }

    let mut document = Html::parse_document(html);
    strip_boilerplate(&mut document);

    let fragment = choose_content(&document)
        .map(|element| element.html())
        .ok_or(ReadabilityError::NoContent)?;

    if extract_visible_text(&fragment).is_empty() {
        return Err(ReadabilityError::NoContent);
    }

    Ok(fragment)
}

fn strip_boilerplate(document: &mut Html) {
    let mut doomed = Vec::new();
    for selector_str in BOILERPLATE_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            doomed.extend(document.select(&selector).map(|element| element.id()));
        }
    }

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn choose_content(document: &Html) -> Option<ElementRef<'_>> {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                return Some(element);
            }
        }
    }

    densest_block(document).or_else(|| {
        Selector::parse("body")
            .ok()
            .and_then(|body| document.select(&body).next())
    })
}

/// The block whose direct `<p>` children carry the most text
fn densest_block(document: &Html) -> Option<ElementRef<'_>> {
    let blocks = Selector::parse(BLOCK_SELECTOR).ok()?;

    document
        .select(&blocks)
        .map(|block| (paragraph_chars(block), block))
        .filter(|(score, _)| *score > 0)
        .max_by_key(|(score, _)| *score)
        .map(|(_, block)| block)
}

fn paragraph_chars(block: ElementRef<'_>) -> usize {
    block
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "p")
        .map(|p| p.text().map(|t| t.trim().chars().count()).sum::<usize>())
        .sum()
}
