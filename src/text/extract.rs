//! Visible-text extraction
//!
//! Linearizes an HTML document into the text a reader would see: script,
//! style and other non-rendered elements are dropped, block elements are
//! separated by whitespace, and all whitespace runs collapse to one space.

use ego_tree::iter::Edge;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose contents are never rendered as text
const HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "iframe", "object", "svg",
];

/// Elements that start a new line of text when rendered
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extracts the visible text of `html`, whitespace-collapsed and trimmed
///
/// # Example
///
/// ```
/// use text_harvest::text::extract_visible_text;
///
/// let html = "<html><head><title>T</title></head><body><p>Hello\n  <b>World</b></p><script>x()</script></body></html>";
/// assert_eq!(extract_visible_text(html), "Hello World");
/// ```
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    collapse_whitespace(&raw)
}

/// Collapses every run of whitespace to a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Walks the tree iteratively; nesting depth is unbounded in the wild
fn collect_text(root: ElementRef<'_>, out: &mut String) {
    // Open elements inside a hidden subtree, including its root
    let mut hidden = 0usize;

    for edge in root.traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(element) => {
                    if hidden > 0 || HIDDEN_TAGS.contains(&element.name()) {
                        hidden += 1;
                    } else if BLOCK_TAGS.contains(&element.name()) {
                        out.push(' ');
                    }
                }
                Node::Text(text) if hidden == 0 => out.push_str(text),
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(element) = node.value() {
                    if hidden > 0 {
                        hidden -= 1;
                    } else if BLOCK_TAGS.contains(&element.name()) {
                        out.push(' ');
                    }
                }
            }
        }
    }
}
