// src/error.rs
// =============================================================================
// Error and rejection types for the crawl core.
//
// Two very different things can stop a page from contributing to the crawl:
//
// - CrawlError: something actually went wrong (bad URL, network failure,
//   checkpoint file problems). These are logged, never fatal.
// - Rejection: the page was fine, we just don't want it (duplicate, trap,
//   too big, too short...). These are the expected outcome for a large
//   share of pages and are only logged at debug level.
//
// The pipeline turns both into an empty link list, so the caller never has
// to treat filtered content as an error.
// =============================================================================

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The input could not be parsed as a URI (or resolved against its base)
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// Network error, timeout or unreadable body
    #[error("fetch failed for {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    /// Reading or writing the checkpoint file failed
    #[error("checkpoint I/O error at {}: {source}", path.display())]
    CheckpointIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The checkpoint file exists but does not contain a valid snapshot
    #[error("checkpoint at {} is corrupt: {source}", path.display())]
    CheckpointFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CrawlError {
    pub fn malformed(url: &str, reason: impl fmt::Display) -> Self {
        CrawlError::MalformedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn fetch(url: &str, reason: impl fmt::Display) -> Self {
        CrawlError::FetchFailure {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

// Why a page was silently dropped by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// robots.txt forbids this URL
    Disallowed,
    /// Status code in the 600-699 range
    NonStandardStatus,
    /// 3xx without a Location header
    RedirectWithoutTarget,
    /// Redirect target failed normalization or validation
    InvalidRedirect,
    /// Anything other than 200
    UnsuccessfulStatus,
    /// 200 but no body
    MissingBody,
    /// Body larger than the configured limit
    Oversized,
    /// URL matches a crawler trap signature
    TrapMatch,
    /// Too few words after text extraction
    LowContent,
    /// Near-duplicate of a page we already accepted
    DuplicateContent,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::Disallowed => "disallowed by robots.txt",
            Rejection::NonStandardStatus => "non-standard status",
            Rejection::RedirectWithoutTarget => "redirect without location",
            Rejection::InvalidRedirect => "redirect target not crawlable",
            Rejection::UnsuccessfulStatus => "unsuccessful status",
            Rejection::MissingBody => "missing body",
            Rejection::Oversized => "oversized response",
            Rejection::TrapMatch => "crawler trap",
            Rejection::LowContent => "low content",
            Rejection::DuplicateContent => "near-duplicate content",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_the_url() {
        let err = CrawlError::malformed("ht!tp://", "relative URL without a base");
        let message = err.to_string();
        assert!(message.contains("ht!tp://"));
        assert!(message.contains("relative URL without a base"));
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(Rejection::TrapMatch.to_string(), "crawler trap");
        assert_eq!(Rejection::DuplicateContent.to_string(), "near-duplicate content");
    }
}
