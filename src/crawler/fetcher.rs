//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client (user agent, per-host pool, TLS policy)
//! - GET requests with status and Content-Type inspection
//! - Charset-aware, lossy decoding of response bodies
//! - Error classification
//!
//! There is no retry logic: a failed fetch is reported once and abandoned.

use crate::config::Config;
use reqwest::{header, Client};

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body, decoded by its declared charset with invalid bytes replaced
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, TLS failure, timeout, broken body)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds the HTTP client shared by every fetch worker
///
/// Certificate validation is disabled so that hosts with broken or
/// self-signed certificates are still crawled. The pool keeps at most
/// `connections-per-host` idle connections for each host.
///
/// # Example
///
/// ```no_run
/// use text_harvest::config::Config;
/// use text_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header.as_str())
        .danger_accept_invalid_certs(true)
        .pool_max_idle_per_host(config.crawler.connections_per_host)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value names an HTML document
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Fetches a URL and classifies the response
///
/// # Request Flow
///
/// | Condition | Result |
/// |-----------|--------|
/// | Transport error | NetworkError |
/// | Status not 2xx | HttpError |
/// | Content-Type not HTML | ContentMismatch |
/// | Body read fails | NetworkError |
/// | Otherwise | Success |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    let final_url = response.url().to_string();

    // Decodes by the declared charset (UTF-8 if none), replacing invalid bytes
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_error(&e),
    }
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        format!("Request timeout: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}
