//! Error types for fetching pages and normalizing extracted values.

use thiserror::Error;

/// Failure to retrieve a page body from the fetch engine.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] wreq::Error),

    #[error("request failed with status: {0}")]
    Status(u16),

    #[error("rate limited by remote server (503)")]
    RateLimited,

    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by a scraper.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A page could not be retrieved. Non-fatal to sibling pages.
    #[error("failed to visit {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A configured CSS selector does not parse.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// A page task panicked or was cancelled before reporting.
    #[error("page task failed: {0}")]
    Task(String),

    /// The HTTP engine could not be constructed.
    #[error("failed to build fetch engine: {0}")]
    Engine(String),
}

impl ScrapeError {
    /// Returns the URL of the failed page for transport errors.
    pub fn url(&self) -> Option<&str> {
        match self {
            ScrapeError::Transport { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Raw text that could not be turned into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty value")]
    Empty,

    #[error("malformed number: {0}")]
    Malformed(String),

    #[error("value out of range: {0}")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_display() {
        let err = ScrapeError::Transport {
            url: "https://shop.test/s?k=mouse".to_string(),
            source: FetchError::Status(500),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://shop.test/s?k=mouse"));
        assert!(msg.contains("500"));
        assert_eq!(err.url(), Some("https://shop.test/s?k=mouse"));
    }

    #[test]
    fn test_selector_error_has_no_url() {
        let err = ScrapeError::Selector { selector: "div[".to_string(), reason: "eof".to_string() };
        assert!(err.url().is_none());
        assert!(err.to_string().contains("div["));
    }

    #[test]
    fn test_transport_error_source() {
        use std::error::Error;

        let err = ScrapeError::Transport {
            url: "https://shop.test".to_string(),
            source: FetchError::RateLimited,
        };
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("503"));
    }
}
