//! URL handling module for Text-Harvest
//!
//! Resolution of discovered hrefs against the page they were found on, plus the
//! basic normalization applied to every URL before it touches the visited set.
//! Anything beyond that (tracking parameters, `www.` stripping, path cleanup) is
//! deliberately left alone.

mod normalize;

pub use normalize::{is_crawlable, normalize_url, resolve_link};
