use crate::{UrlResult, UrlError};
use url::Url;

/// Normalizes an absolute URL string
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Require an `http` or `https` scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// The `url` crate already lowercases the scheme and host and fills in an empty
/// path as `/`, so `http://Example.COM` comes out as `http://example.com/`.
///
/// # Examples
///
/// ```
/// use text_harvest::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.com/page#intro").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Returns true if the string is an absolute HTTP(S) address that can be fetched
pub fn is_crawlable(url_str: &str) -> bool {
    normalize_url(url_str).is_ok()
}

/// Resolves an href found on `base_url` to an absolute, normalized URL string
///
/// Returns None if the link should be skipped:
/// - empty or whitespace-only hrefs
/// - `javascript:` hrefs (any letter case)
/// - fragment-only hrefs (same-page anchors)
/// - hrefs that fail to resolve or resolve to a non-HTTP(S) scheme
///   (`mailto:`, `tel:`, `data:`, ...)
///
/// # Examples
///
/// ```
/// use text_harvest::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/wiki/Page").unwrap();
/// assert_eq!(
///     resolve_link("Other#History", &base).as_deref(),
///     Some("https://example.com/wiki/Other")
/// );
/// assert_eq!(resolve_link("javascript:void(0)", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href
        .get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
    {
        return None;
    }

    let joined = base_url.join(href).ok()?;
    normalize_url(joined.as_str()).ok().map(String::from)
}
