/// Per-item outcome definitions for fetch workers
///
/// Every work item taken from the frontier ends in exactly one of these
/// outcomes. None of them is an error from the crawl's point of view: the
/// item is marked done either way.
use std::fmt;

/// Represents how a single frontier item was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    // ===== Success =====
    /// Page was fetched, its body queued for text processing and its links followed
    Fetched,

    // ===== Rejected before fetching =====
    /// Item depth is beyond the configured depth limit
    DepthExceeded,

    /// URL was already fetched (or claimed by another worker)
    AlreadyVisited,

    /// URL is not an absolute HTTP(S) address
    NotCrawlable,

    // ===== Rejected after fetching =====
    /// Response status was not 2xx
    HttpError,

    /// Response Content-Type is not HTML
    ContentMismatch,

    /// Transport failure (connection, TLS, timeout, body read)
    NetworkError,

    /// Link extraction crashed on the fetched body; nothing was queued
    ParseFailed,
}

impl ItemOutcome {
    /// Returns true if a request was sent for this item
    pub fn was_requested(&self) -> bool {
        matches!(
            self,
            Self::Fetched
                | Self::HttpError
                | Self::ContentMismatch
                | Self::NetworkError
                | Self::ParseFailed
        )
    }

    /// Returns true if the item was skipped without any request
    pub fn is_skipped(&self) -> bool {
        !self.was_requested()
    }

    /// Returns true if the item failed at the transport or HTTP level
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::HttpError | Self::NetworkError)
    }

    /// Short snake_case name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "fetched",
            Self::DepthExceeded => "depth_exceeded",
            Self::AlreadyVisited => "already_visited",
            Self::NotCrawlable => "not_crawlable",
            Self::HttpError => "http_error",
            Self::ContentMismatch => "content_mismatch",
            Self::NetworkError => "network_error",
            Self::ParseFailed => "parse_failed",
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
