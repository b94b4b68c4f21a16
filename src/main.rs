//! # News Sentiment
//!
//! Collects recent news coverage of a company, extracts the readable text of
//! each article, and compares sentiment and topics across the coverage.
//!
//! ## Usage
//!
//! ```sh
//! news_sentiment Tesla --min-articles 5 --max-articles 15 -j ./json
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: Page through news search results for the company
//! 2. **Extraction**: Fetch each fresh candidate and pull out its article text
//! 3. **Analysis**: Score sentiment and tag topics per article
//! 4. **Comparison**: Distribution, pairwise differences, topic overlap, verdict
//! 5. **Output**: Pretty JSON report to a dated file or stdout
//!
//! Ctrl-C stops discovery early; whatever was collected is still reported.

use clap::Parser;
use news_sentiment::analysis::{Analyzers, compare};
use news_sentiment::cli::Cli;
use news_sentiment::config::{PipelineConfig, ProviderKind};
use news_sentiment::delay::{DelayPolicy, NoDelay, RandomDelay};
use news_sentiment::discovery::{Discovery, RunParams, TracingProgress};
use news_sentiment::error::DiscoveryError;
use news_sentiment::extract::ContentExtractor;
use news_sentiment::http::ReqwestFetcher;
use news_sentiment::models::AnalysisResult;
use news_sentiment::outputs::json;
use news_sentiment::report::format_report;
use news_sentiment::search::{GoogleNewsHtml, GoogleNewsRss, SearchProvider};
use news_sentiment::utils::ensure_writable_dir;
use std::error::Error;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("news_sentiment starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(company = %args.company, ?args.json_output_dir, ?args.config, "Parsed CLI arguments");

    let params = match args.run_params() {
        Ok(params) => params,
        Err(e) => {
            error!(error = %e, "Rejected run parameters");
            return Err(e.into());
        }
    };

    // ---- Load config ----
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path).await?,
        None => PipelineConfig::default(),
    };
    args.apply_overrides(&mut config);
    info!(provider = ?config.provider, concurrency = config.workers(), "Configuration ready");

    // Early check: ensure JSON output dir is writable
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // ---- Cancellation on Ctrl-C ----
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received; finishing with the articles collected so far");
                cancel.cancel();
            }
        });
    }

    let delay: Arc<dyn DelayPolicy> = if args.no_delay {
        Arc::new(NoDelay)
    } else {
        Arc::new(RandomDelay::from_config(&config))
    };
    let analyzers = Arc::new(Analyzers::new(&config));
    let fetcher = ReqwestFetcher::new()?;
    let extractor = ContentExtractor::new(fetcher.clone(), delay.clone(), &config);

    // ---- Discover and analyze ----
    let outcome = match config.provider {
        ProviderKind::GoogleHtml => {
            let search = GoogleNewsHtml::new(fetcher, &config)?;
            run(search, extractor, &analyzers, delay, &config, &params, &cancel).await
        }
        ProviderKind::GoogleRss => {
            let search = GoogleNewsRss::new(fetcher, &config);
            run(search, extractor, &analyzers, delay, &config, &params, &cancel).await
        }
    };

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, company = %params.entity, "Discovery failed");
            return Err(e.into());
        }
    };

    // ---- Compare and report ----
    let comparison = compare::analyze(&result, &analyzers.sentiment);
    let report = format_report(&result, &comparison);
    info!(
        articles = report.articles.len(),
        differences = report.coverage_differences.len(),
        "Report assembled"
    );

    match &args.json_output_dir {
        Some(dir) => {
            let path = json::write_report(&report, dir).await?;
            info!(%path, "Report written");
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

async fn run<S: SearchProvider>(
    search: S,
    extractor: ContentExtractor<ReqwestFetcher>,
    analyzers: &Arc<Analyzers>,
    delay: Arc<dyn DelayPolicy>,
    config: &PipelineConfig,
    params: &RunParams,
    cancel: &CancellationToken,
) -> Result<AnalysisResult, DiscoveryError> {
    let discovery = Discovery::new(search, extractor, Arc::clone(analyzers), delay, config);
    discovery.discover(params, &TracingProgress, cancel).await
}
