//! Google News RSS search provider.
//!
//! The feed returns a single list of items per query, so pages are sliced
//! client-side: `offset..offset + page_size`.

use crate::config::PipelineConfig;
use crate::error::SearchError;
use crate::http::{Identity, PageFetcher};
use crate::models::Candidate;
use crate::search::SearchProvider;
use crate::utils::{matches_signature, normalize_whitespace};
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
}

/// [`SearchProvider`] over the Google News RSS search endpoint.
#[derive(Debug)]
pub struct GoogleNewsRss<F> {
    fetcher: F,
    base_url: String,
    identity: Identity,
    timeout: Duration,
    page_size: usize,
    block_signatures: Vec<String>,
}

impl<F: PageFetcher> GoogleNewsRss<F> {
    pub fn new(fetcher: F, config: &PipelineConfig) -> Self {
        let user_agent = config.user_agents.first().cloned().unwrap_or_default();
        Self {
            fetcher,
            base_url: config.rss_base_url.clone(),
            identity: Identity::new(user_agent, config.referer.clone()),
            timeout: config.search_timeout(),
            page_size: config.page_size.max(1),
            block_signatures: config.block_signatures.clone(),
        }
    }

    fn feed_url(&self, query: &str) -> String {
        format!(
            "{}?q={}&hl=en-US&gl=US&ceid=US:en",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

impl<F: PageFetcher> SearchProvider for GoogleNewsRss<F> {
    #[instrument(level = "info", skip_all, fields(%query, offset))]
    async fn search(&self, query: &str, offset: usize) -> Result<Vec<Candidate>, SearchError> {
        let page = self
            .fetcher
            .fetch(&self.feed_url(query), &self.identity, self.timeout)
            .await?;
        if !page.is_ok() {
            warn!(status = page.status, "RSS search refused the request");
            return Err(SearchError::ProviderUnavailable {
                status: page.status,
            });
        }

        let all = parse_feed(&page.body, &self.block_signatures)?;
        let candidates: Vec<Candidate> = all.into_iter().skip(offset).take(self.page_size).collect();
        info!(count = candidates.len(), "Parsed Google News RSS items");
        Ok(candidates)
    }
}

/// Read feed items as candidates, dropping blocked titles and repeated links.
pub fn parse_feed(xml: &str, block_signatures: &[String]) -> Result<Vec<Candidate>, SearchError> {
    let rss: Rss = quick_xml::de::from_str(xml).map_err(|e| SearchError::Parse(e.to_string()))?;

    let mut candidates: Vec<Candidate> = Vec::new();
    for item in rss.channel.items {
        let title = normalize_whitespace(&item.title);
        let link = item.link.trim().to_string();
        if link.is_empty() || matches_signature(&title, block_signatures) {
            continue;
        }
        if candidates.iter().any(|c| c.url == link) {
            continue;
        }
        let title = if title.is_empty() {
            "No headline".to_string()
        } else {
            title
        };
        candidates.push(Candidate::new(title, link));
    }
    Ok(candidates)
}
