//! Error types for each pipeline stage.
//!
//! Failures are isolated per stage: a [`SearchError`] empties one page, an
//! [`ExtractError`] rejects one candidate, and only [`DiscoveryError`] ends a run.

use thiserror::Error;

/// Failure at the HTTP boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure to obtain a page of candidates from the search provider.
///
/// Never fatal: the discovery controller treats any of these as an empty page.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search provider unavailable (HTTP {status})")]
    ProviderUnavailable { status: u16 },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("could not parse search results: {0}")]
    Parse(String),
}

/// Why a candidate could not be turned into an article.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("blocked by challenge page titled {title:?}")]
    BlockedPage { title: String },
    #[error("extraction failed: {reason}")]
    ExtractionFailed { reason: String },
    #[error("insufficient content ({chars} characters)")]
    InsufficientContent { chars: usize },
    #[error("extraction cancelled")]
    Cancelled,
}

impl ExtractError {
    /// Only transport and parse failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExtractError::ExtractionFailed { .. })
    }
}

impl From<FetchError> for ExtractError {
    fn from(e: FetchError) -> Self {
        ExtractError::ExtractionFailed {
            reason: e.to_string(),
        }
    }
}

/// Terminal outcome of a discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no valid news articles found for {entity}")]
    NoArticlesFound { entity: String },
}
