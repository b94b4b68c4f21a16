//! Discovery controller: paginated search, deduplication, and extraction.
//!
//! One run walks up to `max_pages` search pages. Fresh candidates from each
//! page are extracted after a politeness delay and analyzed; accepted articles
//! accumulate until `max_articles` is reached.
//!
//! # Page Loop
//!
//! - Offsets are `page * page_size`
//! - A failed search page counts as an empty page
//! - An empty first page moves on to the next page; any later empty page ends the loop
//! - Links already seen in this run are skipped, whatever page they came from
//!
//! # Concurrency
//!
//! Up to `concurrency` extractions run at once, but results are accepted one
//! at a time in discovery order, so the quota check is a single decision point.
//! With the default of one worker no candidate past the quota is fetched.

use crate::analysis::Analyzers;
use crate::config::PipelineConfig;
use crate::delay::{DelayKind, DelayPolicy, pause};
use crate::error::{DiscoveryError, ExtractError};
use crate::extract::ContentExtractor;
use crate::http::PageFetcher;
use crate::models::{AnalysisResult, Article, Candidate, QuotaShortfall};
use crate::search::{SearchProvider, build_query};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Upper bound for either article count.
pub const MAX_ARTICLES_LIMIT: usize = 50;

/// Parameters supplied by the caller for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    pub entity: String,
    pub min_articles: usize,
    pub max_articles: usize,
}

/// Rejected run parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid run parameters: {0}")]
pub struct InvalidParams(pub String);

impl RunParams {
    /// Validate `1 <= min <= max <= 50` and a non-blank entity name.
    pub fn new(
        entity: impl Into<String>,
        min_articles: usize,
        max_articles: usize,
    ) -> Result<Self, InvalidParams> {
        let entity = entity.into().trim().to_string();
        if entity.is_empty() {
            return Err(InvalidParams("entity name must not be empty".into()));
        }
        if !(1..=MAX_ARTICLES_LIMIT).contains(&min_articles) {
            return Err(InvalidParams(format!(
                "minimum articles must be between 1 and {MAX_ARTICLES_LIMIT}, got {min_articles}"
            )));
        }
        if !(min_articles..=MAX_ARTICLES_LIMIT).contains(&max_articles) {
            return Err(InvalidParams(format!(
                "maximum articles must be between {min_articles} and {MAX_ARTICLES_LIMIT}, got {max_articles}"
            )));
        }
        Ok(Self {
            entity,
            min_articles,
            max_articles,
        })
    }
}

/// Progress notifications for whoever presents the run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    PageStarted { page: usize, found: usize },
    PageEmpty { page: usize },
    CandidateStarted {
        page: usize,
        index: usize,
        of: usize,
        /// `min(0.9, found / max_articles)`.
        fraction: f64,
    },
    ArticleAccepted { found: usize, url: String },
    CandidateRejected { url: String, reason: String },
    Finished { found: usize },
}

/// Receives [`ProgressEvent`]s as the run advances.
pub trait ProgressSink {
    fn notify(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&self, _event: ProgressEvent) {}
}

/// Logs events through `tracing`, with a milestone every five articles.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn notify(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::PageStarted { page, found } => {
                info!(page = page + 1, found, "Searching page");
            }
            ProgressEvent::PageEmpty { page } => {
                warn!(page = page + 1, "No more news articles found on page");
            }
            ProgressEvent::CandidateStarted {
                page,
                index,
                of,
                fraction,
            } => {
                debug!(
                    page = page + 1,
                    candidate = index + 1,
                    of,
                    progress = format!("{:.0}%", fraction * 100.0),
                    "Processing candidate"
                );
            }
            ProgressEvent::ArticleAccepted { found, url } => {
                if found % 5 == 0 {
                    info!(found, "Found {found} valid articles...");
                } else {
                    debug!(found, %url, "Accepted article");
                }
            }
            ProgressEvent::CandidateRejected { url, reason } => {
                debug!(%url, %reason, "Rejected candidate");
            }
            ProgressEvent::Finished { found } => {
                info!(found, "Article collection complete");
            }
        }
    }
}

/// Drives search and extraction for a run.
pub struct Discovery<S, F> {
    search: S,
    extractor: ContentExtractor<F>,
    analyzers: Arc<Analyzers>,
    delay: Arc<dyn DelayPolicy>,
    max_pages: usize,
    page_size: usize,
    concurrency: usize,
}

impl<S, F> fmt::Debug for Discovery<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Discovery")
            .field("max_pages", &self.max_pages)
            .field("page_size", &self.page_size)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl<S: SearchProvider, F: PageFetcher> Discovery<S, F> {
    pub fn new(
        search: S,
        extractor: ContentExtractor<F>,
        analyzers: Arc<Analyzers>,
        delay: Arc<dyn DelayPolicy>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            search,
            extractor,
            analyzers,
            delay,
            max_pages: config.max_pages,
            page_size: config.page_size,
            concurrency: config.workers(),
        }
    }

    /// Collect and analyze articles about `params.entity`.
    ///
    /// Falling short of `min_articles` is reported on the result, not as an error.
    ///
    /// # Errors
    ///
    /// [`DiscoveryError::NoArticlesFound`] when no candidate could be extracted.
    #[instrument(level = "info", skip_all, fields(entity = %params.entity, min = params.min_articles, max = params.max_articles))]
    pub async fn discover(
        &self,
        params: &RunParams,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, DiscoveryError> {
        let t0 = Instant::now();
        let query = build_query(&params.entity);
        let mut seen: HashSet<String> = HashSet::new();
        let mut articles: Vec<Article> = Vec::new();
        let mut page = 0usize;

        while articles.len() < params.max_articles && page < self.max_pages {
            if cancel.is_cancelled() {
                warn!(page = page + 1, "Run cancelled; stopping discovery");
                break;
            }
            progress.notify(ProgressEvent::PageStarted {
                page,
                found: articles.len(),
            });

            let candidates = match self.search.search(&query, page * self.page_size).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(page = page + 1, error = %e, "Search page failed; treating as empty");
                    Vec::new()
                }
            };

            if candidates.is_empty() {
                progress.notify(ProgressEvent::PageEmpty { page });
                if page > 0 {
                    break;
                }
                page += 1;
                continue;
            }

            let listed = candidates.len();
            let fresh: Vec<Candidate> = candidates
                .into_iter()
                .filter(|c| seen.insert(c.url.clone()))
                .collect();
            debug!(page = page + 1, listed, fresh = fresh.len(), "Deduplicated candidates");

            self.process_page(page, fresh, params, &mut articles, progress, cancel)
                .await;
            page += 1;
        }

        let found = articles.len();
        progress.notify(ProgressEvent::Finished { found });
        info!(
            found,
            pages = page,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Discovery finished"
        );

        if found == 0 {
            return Err(DiscoveryError::NoArticlesFound {
                entity: params.entity.clone(),
            });
        }

        let shortfall = (found < params.min_articles).then(|| QuotaShortfall {
            requested: params.min_articles,
            found,
        });
        if let Some(shortfall) = &shortfall {
            warn!(found, requested = params.min_articles, "{shortfall}");
        }

        Ok(AnalysisResult::new(params.entity.clone(), articles, shortfall))
    }

    async fn process_page(
        &self,
        page: usize,
        fresh: Vec<Candidate>,
        params: &RunParams,
        articles: &mut Vec<Article>,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) {
        let of = fresh.len();
        let found = AtomicUsize::new(articles.len());
        let found = &found;
        let max = params.max_articles;

        let mut outcomes = stream::iter(fresh.into_iter().enumerate())
            .map(|(index, candidate)| async move {
                let fraction = (found.load(Ordering::Relaxed) as f64 / max as f64).min(0.9);
                progress.notify(ProgressEvent::CandidateStarted {
                    page,
                    index,
                    of,
                    fraction,
                });
                if !pause(self.delay.as_ref(), DelayKind::Politeness, cancel).await {
                    return (candidate, Err(ExtractError::Cancelled));
                }
                let outcome = self.extractor.extract(&candidate.url, cancel).await;
                (candidate, outcome)
            })
            .buffered(self.concurrency);

        while let Some((candidate, outcome)) = outcomes.next().await {
            match outcome {
                Ok(content) => {
                    let article = self.analyzers.analyze(candidate, content);
                    let url = article.url.clone();
                    articles.push(article);
                    found.store(articles.len(), Ordering::Relaxed);
                    progress.notify(ProgressEvent::ArticleAccepted {
                        found: articles.len(),
                        url,
                    });
                    if articles.len() >= max {
                        info!(found = articles.len(), "Reached maximum article count");
                        break;
                    }
                }
                Err(ExtractError::Cancelled) => {
                    warn!(url = %candidate.url, "Run cancelled; abandoning page");
                    break;
                }
                Err(e) => {
                    progress.notify(ProgressEvent::CandidateRejected {
                        url: candidate.url,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::NoDelay;
    use crate::error::{FetchError, SearchError};
    use crate::http::{FetchedPage, Identity};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    const BODY: &str = "Acme reported excellent quarterly revenue and strong profits. \
        Investors welcomed the great results and the shares climbed.";

    fn article_html(title: &str) -> String {
        format!("<html><head><title>{title}</title></head><body><article><p>{BODY}</p></article></body></html>")
    }

    fn blocked_html() -> String {
        "<html><head><title>Access Denied</title></head><body></body></html>".to_string()
    }

    /// Search results keyed by offset; missing offsets are empty pages.
    #[derive(Default)]
    struct FakeSearch {
        pages: HashMap<usize, Result<Vec<Candidate>, u16>>,
        offsets: Mutex<Vec<usize>>,
    }

    impl FakeSearch {
        fn page(mut self, offset: usize, urls: &[&str]) -> Self {
            let candidates = urls
                .iter()
                .map(|u| Candidate::new(format!("Headline for {u}"), *u))
                .collect();
            self.pages.insert(offset, Ok(candidates));
            self
        }

        fn failing(mut self, offset: usize, status: u16) -> Self {
            self.pages.insert(offset, Err(status));
            self
        }

        fn offsets(&self) -> Vec<usize> {
            self.offsets.lock().unwrap().clone()
        }
    }

    impl SearchProvider for FakeSearch {
        async fn search(&self, _query: &str, offset: usize) -> Result<Vec<Candidate>, SearchError> {
            self.offsets.lock().unwrap().push(offset);
            match self.pages.get(&offset) {
                Some(Ok(candidates)) => Ok(candidates.clone()),
                Some(Err(status)) => Err(SearchError::ProviderUnavailable { status: *status }),
                None => Ok(Vec::new()),
            }
        }
    }

    /// Serves scripted bodies per URL; the last body repeats. Unknown URLs fail.
    #[derive(Default)]
    struct FakeWeb {
        pages: Mutex<HashMap<String, VecDeque<String>>>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeWeb {
        fn serve(self, url: &str, bodies: Vec<String>) -> Self {
            self.pages.lock().unwrap().insert(url.to_string(), bodies.into());
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    impl PageFetcher for FakeWeb {
        async fn fetch(
            &self,
            url: &str,
            _identity: &Identity,
            _timeout: Duration,
        ) -> Result<FetchedPage, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            let mut pages = self.pages.lock().unwrap();
            let queue = pages
                .get_mut(url)
                .ok_or_else(|| FetchError::Transport(format!("no route to {url}")))?;
            let body = if queue.len() > 1 {
                queue.pop_front().unwrap_or_default()
            } else {
                queue.front().cloned().unwrap_or_default()
            };
            Ok(FetchedPage::ok(body))
        }
    }

    fn discovery<'a>(search: &'a FakeSearch, web: &'a FakeWeb) -> Discovery<&'a FakeSearch, &'a FakeWeb> {
        let config = PipelineConfig::default();
        let delay: Arc<dyn DelayPolicy> = Arc::new(NoDelay);
        let extractor = ContentExtractor::new(web, delay.clone(), &config);
        Discovery::new(search, extractor, Arc::new(Analyzers::new(&config)), delay, &config)
    }

    #[derive(Default)]
    struct RecordingProgress(Mutex<Vec<ProgressEvent>>);

    impl ProgressSink for RecordingProgress {
        fn notify(&self, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn urls(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://{prefix}.example.com/{i}")).collect()
    }

    #[test]
    fn test_run_params_validation() {
        assert!(RunParams::new("Acme", 10, 30).is_ok());
        assert!(RunParams::new("Acme", 50, 50).is_ok());
        assert!(RunParams::new("  ", 1, 1).is_err());
        assert!(RunParams::new("Acme", 0, 10).is_err());
        assert!(RunParams::new("Acme", 10, 5).is_err());
        assert!(RunParams::new("Acme", 10, 51).is_err());
        assert_eq!(RunParams::new(" Acme ", 1, 2).unwrap().entity, "Acme");
    }

    #[tokio::test]
    async fn test_stops_at_quota_without_fetching_rest() {
        let all = urls("quota", 12);
        let refs: Vec<&str> = all.iter().map(String::as_str).collect();
        let search = FakeSearch::default().page(0, &refs);
        let web = all
            .iter()
            .fold(FakeWeb::default(), |web, u| web.serve(u, vec![article_html("Acme")]));

        let params = RunParams::new("Acme", 10, 10).unwrap();
        let result = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.articles.len(), 10);
        assert!(result.shortfall.is_none());
        assert_eq!(web.fetched(), all[..10].to_vec());
        assert_eq!(search.offsets(), vec![0]);
        assert_eq!(result.sentiment_distribution.total(), 10);
    }

    #[tokio::test]
    async fn test_block_pages_recovered_by_identity_swap() {
        let all = urls("swap", 3);
        let refs: Vec<&str> = all.iter().map(String::as_str).collect();
        let search = FakeSearch::default().page(0, &refs);
        let web = all.iter().fold(FakeWeb::default(), |web, u| {
            web.serve(u, vec![blocked_html(), article_html("Recovered")])
        });

        let params = RunParams::new("Acme", 3, 3).unwrap();
        let result = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.articles.len(), 3);
        assert!(result.articles.iter().all(|a| a.title == "Recovered"));
        assert_eq!(web.fetched().len(), 6);
    }

    #[tokio::test]
    async fn test_all_failures_is_not_found() {
        let mut search = FakeSearch::default();
        for page in 0..5 {
            let page_urls = urls(&format!("fail{page}"), 2);
            let refs: Vec<&str> = page_urls.iter().map(String::as_str).collect();
            search = search.page(page * 10, &refs);
        }
        let web = FakeWeb::default();

        let params = RunParams::new("Acme", 1, 10).unwrap();
        let err = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::NoArticlesFound { .. }));
        assert_eq!(search.offsets(), vec![0, 10, 20, 30, 40]);
        // Three attempts per candidate, ten candidates.
        assert_eq!(web.fetched().len(), 30);
    }

    #[tokio::test]
    async fn test_dedup_across_pages_and_stop_on_empty_page() {
        let search = FakeSearch::default()
            .page(0, &["https://a.example.com/", "https://b.example.com/"])
            .page(10, &["https://b.example.com/", "https://c.example.com/"]);
        let web = ["https://a.example.com/", "https://b.example.com/", "https://c.example.com/"]
            .iter()
            .fold(FakeWeb::default(), |web, u| web.serve(u, vec![article_html("Acme")]));

        let params = RunParams::new("Acme", 1, 10).unwrap();
        let result = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap();

        let accepted: Vec<&str> = result.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            accepted,
            vec!["https://a.example.com/", "https://b.example.com/", "https://c.example.com/"]
        );
        assert_eq!(web.fetched().len(), 3);
        assert_eq!(search.offsets(), vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn test_failed_candidate_is_not_retried_on_later_page() {
        let search = FakeSearch::default()
            .page(0, &["https://dead.example.com/", "https://ok.example.com/"])
            .page(10, &["https://dead.example.com/"]);
        let web = FakeWeb::default().serve("https://ok.example.com/", vec![article_html("Acme")]);

        let params = RunParams::new("Acme", 1, 10).unwrap();
        let result = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.articles.len(), 1);
        let dead_fetches = web
            .fetched()
            .iter()
            .filter(|u| u.as_str() == "https://dead.example.com/")
            .count();
        assert_eq!(dead_fetches, 3);
    }

    #[tokio::test]
    async fn test_empty_first_page_moves_on() {
        let search = FakeSearch::default().page(10, &["https://late.example.com/"]);
        let web = FakeWeb::default().serve("https://late.example.com/", vec![article_html("Late")]);

        let params = RunParams::new("Acme", 1, 5).unwrap();
        let result = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.articles.len(), 1);
        assert_eq!(search.offsets(), vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_empty_page() {
        let search = FakeSearch::default().failing(0, 429).failing(10, 503);
        let web = FakeWeb::default();

        let params = RunParams::new("Acme", 1, 5).unwrap();
        let err = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DiscoveryError::NoArticlesFound { .. }));
        assert_eq!(search.offsets(), vec![0, 10]);
        assert!(web.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_shortfall_is_reported() {
        let search = FakeSearch::default().page(0, &["https://a.example.com/", "https://b.example.com/"]);
        let web = FakeWeb::default()
            .serve("https://a.example.com/", vec![article_html("A")])
            .serve("https://b.example.com/", vec![article_html("B")]);

        let params = RunParams::new("Acme", 5, 10).unwrap();
        let result = discovery(&search, &web)
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            result.shortfall,
            Some(QuotaShortfall {
                requested: 5,
                found: 2
            })
        );
    }

    /// Cancels the run as soon as the first article is accepted.
    struct CancelOnFirst(CancellationToken);

    impl ProgressSink for CancelOnFirst {
        fn notify(&self, event: ProgressEvent) {
            if matches!(event, ProgressEvent::ArticleAccepted { .. }) {
                self.0.cancel();
            }
        }
    }

    #[tokio::test]
    async fn test_cancellation_between_candidates() {
        let all = urls("cancel", 4);
        let refs: Vec<&str> = all.iter().map(String::as_str).collect();
        let search = FakeSearch::default().page(0, &refs);
        let web = all
            .iter()
            .fold(FakeWeb::default(), |web, u| web.serve(u, vec![article_html("Acme")]));

        let token = CancellationToken::new();
        let params = RunParams::new("Acme", 1, 10).unwrap();
        let result = discovery(&search, &web)
            .discover(&params, &CancelOnFirst(token.clone()), &token)
            .await
            .unwrap();

        assert_eq!(result.articles.len(), 1);
        assert_eq!(web.fetched(), vec![all[0].clone()]);
        assert_eq!(search.offsets(), vec![0]);
    }

    #[tokio::test]
    async fn test_progress_events() {
        let search = FakeSearch::default().page(0, &["https://a.example.com/", "https://gone.example.com/"]);
        let web = FakeWeb::default().serve("https://a.example.com/", vec![article_html("A")]);
        let progress = RecordingProgress::default();

        let params = RunParams::new("Acme", 1, 1).unwrap();
        discovery(&search, &web)
            .discover(&params, &progress, &CancellationToken::new())
            .await
            .unwrap();

        let events = progress.0.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                ProgressEvent::PageStarted { page: 0, found: 0 },
                ProgressEvent::CandidateStarted {
                    page: 0,
                    index: 0,
                    of: 2,
                    fraction: 0.0
                },
                ProgressEvent::ArticleAccepted {
                    found: 1,
                    url: "https://a.example.com/".to_string()
                },
                ProgressEvent::Finished { found: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_workers_keep_discovery_order() {
        let all = urls("parallel", 6);
        let refs: Vec<&str> = all.iter().map(String::as_str).collect();
        let search = FakeSearch::default().page(0, &refs);
        let web = all
            .iter()
            .fold(FakeWeb::default(), |web, u| web.serve(u, vec![article_html("Acme")]));

        let config = PipelineConfig {
            concurrency: 3,
            ..PipelineConfig::default()
        };
        let delay: Arc<dyn DelayPolicy> = Arc::new(NoDelay);
        let extractor = ContentExtractor::new(&web, delay.clone(), &config);
        let discovery = Discovery::new(&search, extractor, Arc::new(Analyzers::new(&config)), delay, &config);

        let params = RunParams::new("Acme", 1, 6).unwrap();
        let result = discovery
            .discover(&params, &NoProgress, &CancellationToken::new())
            .await
            .unwrap();

        let accepted: Vec<String> = result.articles.iter().map(|a| a.url.clone()).collect();
        assert_eq!(accepted, all);
    }
}
