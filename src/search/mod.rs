//! Search providers that turn a query into candidate article links.
//!
//! Each provider fetches one page of results for a `(query, offset)` pair and
//! returns [`Candidate`]s in the order the provider listed them.
//!
//! # Supported Providers
//!
//! | Provider | Module | Method | Notes |
//! |----------|--------|--------|-------|
//! | Google News tab | [`google_html`] | HTML scraping | Unwraps `/url?` redirect links |
//! | Google News RSS | [`google_rss`] | RSS feed | Paginated client-side |
//!
//! Providers drop headlines that look like block pages and duplicate links
//! within the page. Cross-page deduplication belongs to the discovery controller.
//! A non-200 response surfaces as [`SearchError::ProviderUnavailable`], which the
//! controller treats as an empty page.

use crate::error::SearchError;
use crate::models::Candidate;

pub mod google_html;
pub mod google_rss;

pub use google_html::GoogleNewsHtml;
pub use google_rss::GoogleNewsRss;

/// A source of candidate links for a query.
pub trait SearchProvider {
    /// Fetch the page of results starting at `offset`.
    async fn search(&self, query: &str, offset: usize) -> Result<Vec<Candidate>, SearchError>;
}

impl<T: SearchProvider> SearchProvider for &T {
    async fn search(&self, query: &str, offset: usize) -> Result<Vec<Candidate>, SearchError> {
        (**self).search(query, offset).await
    }
}

/// The query issued for an entity.
pub fn build_query(entity: &str) -> String {
    format!("{} company news", entity.trim())
}
