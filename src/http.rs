//! HTTP boundary shared by the search providers and the content extractor.
//!
//! The [`PageFetcher`] trait is the only way the pipeline touches the network,
//! which lets tests drive every stage with in-memory pages.

use crate::error::FetchError;
use reqwest::Client;
use reqwest::header::{REFERER, USER_AGENT};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Browser-like request identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_agent: String,
    pub referer: String,
}

impl Identity {
    pub fn new(user_agent: impl Into<String>, referer: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            referer: referer.into(),
        }
    }
}

/// Status code and raw markup of a fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// Exactly HTTP 200; search providers treat anything else as unavailable.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Performs a GET with the given identity and timeout.
pub trait PageFetcher {
    async fn fetch(
        &self,
        url: &str,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<FetchedPage, FetchError>;
}

impl<T: PageFetcher> PageFetcher for &T {
    async fn fetch(
        &self,
        url: &str,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<FetchedPage, FetchError> {
        (**self).fetch(url, identity, timeout).await
    }
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for ReqwestFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(
        &self,
        url: &str,
        identity: &Identity,
        timeout: Duration,
    ) -> Result<FetchedPage, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &identity.user_agent)
            .header(REFERER, &identity.referer)
            .timeout(timeout)
            .send()
            .await
            .inspect_err(|e| warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "GET failed"))?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(FetchedPage { status, body })
    }
}
