//! Google News tab scraper.
//!
//! Requests `{base}?q=<query>&tbm=nws[&start=<offset>]` and reads result
//! blocks from the returned markup.
//!
//! # Markup
//!
//! Each hit is a `div.SoaBEf` holding a `div.mCBkyc` headline and an anchor.
//! Anchors are often redirect links of the form `/url?url=<target>&...`; the
//! target is unwrapped and percent-decoded.

use crate::config::PipelineConfig;
use crate::error::SearchError;
use crate::http::{Identity, PageFetcher};
use crate::models::Candidate;
use crate::search::SearchProvider;
use crate::utils::{matches_signature, normalize_whitespace, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.SoaBEf").expect("valid selector"));
static HEADLINE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.mCBkyc").expect("valid selector"));
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));
static REDIRECT_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&](?:url|q)=([^&]+)").expect("valid regex"));

/// [`SearchProvider`] over the Google News tab.
#[derive(Debug)]
pub struct GoogleNewsHtml<F> {
    fetcher: F,
    base_url: Url,
    identity: Identity,
    timeout: Duration,
    block_signatures: Vec<String>,
}

impl<F: PageFetcher> GoogleNewsHtml<F> {
    /// Build the provider from pipeline settings.
    ///
    /// # Errors
    ///
    /// Fails when `search_base_url` is not an absolute URL.
    pub fn new(fetcher: F, config: &PipelineConfig) -> Result<Self, url::ParseError> {
        let user_agent = config.user_agents.first().cloned().unwrap_or_default();
        Ok(Self {
            fetcher,
            base_url: Url::parse(&config.search_base_url)?,
            identity: Identity::new(user_agent, config.referer.clone()),
            timeout: config.search_timeout(),
            block_signatures: config.block_signatures.clone(),
        })
    }

    fn page_url(&self, query: &str, offset: usize) -> String {
        let start = if offset > 0 {
            format!("&start={offset}")
        } else {
            String::new()
        };
        format!(
            "{}?q={}&tbm=nws{}",
            self.base_url,
            urlencoding::encode(query),
            start
        )
    }
}

impl<F: PageFetcher> SearchProvider for GoogleNewsHtml<F> {
    #[instrument(level = "info", skip_all, fields(%query, offset))]
    async fn search(&self, query: &str, offset: usize) -> Result<Vec<Candidate>, SearchError> {
        let url = self.page_url(query, offset);
        let page = self.fetcher.fetch(&url, &self.identity, self.timeout).await?;
        if !page.is_ok() {
            warn!(status = page.status, "Search provider refused the request");
            return Err(SearchError::ProviderUnavailable {
                status: page.status,
            });
        }

        let candidates = parse_results(&page.body, &self.base_url, &self.block_signatures);
        info!(count = candidates.len(), "Parsed Google News results");
        Ok(candidates)
    }
}

/// Extract candidates from a results page, in page order.
///
/// Blocked-looking headlines, empty links, and duplicate links are dropped.
pub fn parse_results(html: &str, base: &Url, block_signatures: &[String]) -> Vec<Candidate> {
    let document = Html::parse_document(html);
    let mut candidates: Vec<Candidate> = Vec::new();

    for block in document.select(&RESULT_SELECTOR) {
        let headline = block
            .select(&HEADLINE_SELECTOR)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "No headline".to_string());

        if matches_signature(&headline, block_signatures) {
            debug!(%headline, "Skipping blocked-looking headline");
            continue;
        }

        let Some(href) = block
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };
        let Some(link) = resolve_link(href, base) else {
            debug!(href = %truncate_for_log(href, 120), "Skipping unusable link");
            continue;
        };

        if candidates.iter().any(|c| c.url == link) {
            continue;
        }
        candidates.push(Candidate::new(headline, link));
    }

    candidates
}

/// Turn a result anchor's `href` into an absolute article URL.
pub fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let target = if href.starts_with("/url?") {
        let raw = REDIRECT_TARGET.captures(href)?.get(1)?.as_str();
        urlencoding::decode(raw)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    } else {
        href.to_string()
    };

    let resolved = base.join(&target).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}
