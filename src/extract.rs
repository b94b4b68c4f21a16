//! Readable-text extraction from arbitrary article pages.
//!
//! Each call runs `Fetch → ValidateNotBlocked → LocateContent → Summarize`
//! inside a bounded retry loop.
//!
//! # Retry Strategy
//!
//! - At most `max_attempts` passes (3 by default), with a randomized backoff
//!   between passes
//! - Only transport failures ([`ExtractError::ExtractionFailed`]) start a new pass
//! - A block page triggers one re-fetch with the alternate browser identity when
//!   passes remain; a second block page ends the call
//! - Short content ends the call immediately
//!
//! # Content Location
//!
//! Structural locators are tried in priority order and the first one yielding
//! paragraphs wins. When none do, every `<p>` longer than 20 characters on the
//! page is used instead.

use crate::config::PipelineConfig;
use crate::delay::{DelayKind, DelayPolicy, pause};
use crate::error::ExtractError;
use crate::http::{FetchedPage, Identity, PageFetcher};
use crate::models::ExtractedContent;
use crate::utils::{char_len, matches_signature, normalize_whitespace, take_chars, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Body text shorter than this is padded or rejected.
pub const MIN_BODY_CHARS: usize = 80;
/// Body text at or below this length is rejected outright.
pub const MIN_PADDABLE_CHARS: usize = 30;
/// Fallback paragraphs must be longer than this.
pub const MIN_FALLBACK_PARAGRAPH_CHARS: usize = 20;
pub const SUMMARY_SENTENCES: usize = 7;
pub const MAX_SUMMARY_CHARS: usize = 500;
const ELLIPSIS: &str = "...";
const UNKNOWN_TITLE: &str = "Unknown Title";

/// Structural content locators, highest priority first.
static LOCATORS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    [
        ("article", "article"),
        (
            "content-class",
            "div.article-content, div.article-body, div.story-content, div.post-content, div.entry-content",
        ),
        (
            "content-id",
            "div#article-content, div#article-body, div#story-content, div#post-content, div#entry-content",
        ),
        ("main", "main"),
        ("generic-content", "div.content, div.main-content, div.article"),
    ]
    .into_iter()
    .map(|(name, css)| (name, Selector::parse(css).expect("valid selector")))
    .collect()
});
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

/// Fetches candidate pages and turns them into [`ExtractedContent`].
#[derive(Debug)]
pub struct ContentExtractor<F> {
    fetcher: F,
    delay: Arc<dyn DelayPolicy>,
    identities: Vec<Identity>,
    timeout: Duration,
    max_attempts: usize,
    block_signatures: Vec<String>,
}

impl<F: PageFetcher> ContentExtractor<F> {
    /// Build an extractor from pipeline settings.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - HTTP seam used for every page request
    /// * `delay` - Source of backoff waits between passes and before an identity swap
    /// * `config` - Supplies identities, fetch timeout, attempt budget, and block signatures
    ///
    /// # Returns
    ///
    /// An extractor whose primary identity is the first configured user agent and
    /// whose alternate is the second. With a single user agent both are the same;
    /// with none, an empty user agent is sent.
    pub fn new(fetcher: F, delay: Arc<dyn DelayPolicy>, config: &PipelineConfig) -> Self {
        let mut identities: Vec<Identity> = config
            .user_agents
            .iter()
            .map(|ua| Identity::new(ua.clone(), config.referer.clone()))
            .collect();
        if identities.is_empty() {
            identities.push(Identity::new("", config.referer.clone()));
        }
        Self {
            fetcher,
            delay,
            identities,
            timeout: config.fetch_timeout(),
            max_attempts: config.attempts(),
            block_signatures: config.block_signatures.clone(),
        }
    }

    fn primary(&self) -> &Identity {
        &self.identities[0]
    }

    fn alternate(&self) -> &Identity {
        &self.identities[1 % self.identities.len()]
    }

    /// Extract readable content from `url`.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::ExtractionFailed`] once every pass failed in transport
    /// - [`ExtractError::BlockedPage`] when the identity swap did not help
    /// - [`ExtractError::InsufficientContent`] when the page has too little text
    /// - [`ExtractError::Cancelled`] when `cancel` fires between passes
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ExtractedContent, ExtractError> {
        let t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            if cancel.is_cancelled() {
                return Err(ExtractError::Cancelled);
            }
            let passes_remain = attempt + 1 < self.max_attempts;

            match self.attempt(url, passes_remain, cancel).await {
                Ok(content) => {
                    info!(
                        attempt = attempt + 1,
                        chars = char_len(&content.body_text),
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        "Extracted article content"
                    );
                    return Ok(content);
                }
                Err(e) if e.is_retryable() && passes_remain => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max = self.max_attempts,
                        error = %e,
                        "Extraction attempt failed; backing off"
                    );
                    if !pause(self.delay.as_ref(), DelayKind::RetryBackoff, cancel).await {
                        return Err(ExtractError::Cancelled);
                    }
                }
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        error = %e,
                        "Giving up on candidate"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        may_swap_identity: bool,
        cancel: &CancellationToken,
    ) -> Result<ExtractedContent, ExtractError> {
        let mut page = self.fetch(url, self.primary()).await?;
        let mut title = page_title(&page.body);

        if self.is_blocked(&title) {
            if !may_swap_identity {
                return Err(ExtractError::BlockedPage { title });
            }
            info!(title = %truncate_for_log(&title, 120), "Block page detected; retrying with alternate identity");
            if !pause(self.delay.as_ref(), DelayKind::RetryBackoff, cancel).await {
                return Err(ExtractError::Cancelled);
            }
            page = self.fetch(url, self.alternate()).await?;
            title = page_title(&page.body);
            if self.is_blocked(&title) {
                return Err(ExtractError::BlockedPage { title });
            }
        }

        // Block signatures take precedence over the status code.
        if page.is_server_error() {
            return Err(ExtractError::ExtractionFailed {
                reason: format!("server responded with HTTP {}", page.status),
            });
        }

        build_content(&page.body, title)
    }

    async fn fetch(&self, url: &str, identity: &Identity) -> Result<FetchedPage, ExtractError> {
        let page = self.fetcher.fetch(url, identity, self.timeout).await?;
        debug!(status = page.status, bytes = page.body.len(), "Fetched candidate page");
        Ok(page)
    }

    fn is_blocked(&self, title: &str) -> bool {
        matches_signature(title, &self.block_signatures)
    }
}

/// The page `<title>`, or `"Unknown Title"` when missing or blank.
pub fn page_title(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Locate the article body in `html` and derive its summary.
pub fn build_content(html: &str, title: String) -> Result<ExtractedContent, ExtractError> {
    let document = Html::parse_document(html);
    let (locator, paragraphs) = locate_paragraphs(&document);
    let text = paragraphs.join(" ");
    let chars = char_len(&text);
    debug!(locator, paragraphs = paragraphs.len(), chars, "Located content");

    let body_text = if chars < MIN_BODY_CHARS {
        if chars > MIN_PADDABLE_CHARS {
            format!("{title}. {text}")
        } else {
            return Err(ExtractError::InsufficientContent { chars });
        }
    } else {
        text
    };

    let summary = summarize(&body_text);
    Ok(ExtractedContent {
        title,
        body_text,
        summary,
    })
}

/// Paragraph texts from the first locator that yields any, else the fallback.
///
/// Returns the name of the strategy that matched alongside the paragraphs.
pub fn locate_paragraphs(document: &Html) -> (&'static str, Vec<String>) {
    for (name, selector) in LOCATORS.iter() {
        for container in document.select(selector) {
            let paragraphs = paragraphs_in(container);
            if !paragraphs.is_empty() {
                return (*name, paragraphs);
            }
        }
    }

    let fallback = document
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|text| char_len(text) > MIN_FALLBACK_PARAGRAPH_CHARS)
        .collect();
    ("paragraph-fallback", fallback)
}

fn paragraphs_in(container: ElementRef<'_>) -> Vec<String> {
    container
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Split on sentence-ending punctuation followed by whitespace.
///
/// The punctuation stays with the sentence it ends.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in SENTENCE_END.find_iter(text) {
        sentences.push(&text[last..m.start() + 1]);
        last = m.end();
    }
    if last < text.len() {
        sentences.push(&text[last..]);
    }
    sentences
}

/// Derive a summary of at most 500 characters from body text.
///
/// The first seven sentences are used when the text has more than seven,
/// otherwise the whole text. A summary under 80 characters drawn from a longer
/// body is replaced by the body's first 500 characters.
pub fn summarize(body_text: &str) -> String {
    let sentences = split_sentences(body_text);
    let mut summary = if sentences.len() > SUMMARY_SENTENCES {
        sentences[..SUMMARY_SENTENCES].join(" ")
    } else {
        body_text.to_string()
    };

    let body_chars = char_len(body_text);
    if char_len(&summary) < MIN_BODY_CHARS && body_chars > MIN_BODY_CHARS {
        summary = if body_chars > MAX_SUMMARY_CHARS {
            format!("{}{}", take_chars(body_text, MAX_SUMMARY_CHARS), ELLIPSIS)
        } else {
            body_text.to_string()
        };
    }

    if char_len(&summary) > MAX_SUMMARY_CHARS {
        summary = format!(
            "{}{}",
            take_chars(&summary, MAX_SUMMARY_CHARS - ELLIPSIS.len()),
            ELLIPSIS
        );
    }
    summary
}
