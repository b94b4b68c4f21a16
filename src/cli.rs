//! Command-line interface definitions for News Sentiment.
//!
//! Arguments override the matching fields of the optional YAML config file.

use crate::config::{PipelineConfig, ProviderKind};
use crate::discovery::{InvalidParams, RunParams};
use clap::Parser;

/// Command-line arguments for a single analysis run.
///
/// # Examples
///
/// ```sh
/// # Print the report for ten to thirty articles
/// news_sentiment Tesla
///
/// # Write to ./json/{date}/tesla.json using the RSS provider
/// news_sentiment Tesla --min-articles 5 --max-articles 12 --provider google-rss -j ./json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Company or entity name to analyze
    pub company: String,

    /// Minimum number of articles to collect (1-50)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..=50))]
    pub min_articles: u16,

    /// Maximum number of articles to collect (at least the minimum, at most 50)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u16).range(1..=50))]
    pub max_articles: u16,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Search provider; overrides the config file
    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    /// Number of article extractions in flight; overrides the config file
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output directory for the JSON report; prints to stdout when omitted
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Skip politeness and backoff delays
    #[arg(long)]
    pub no_delay: bool,
}

impl Cli {
    /// Validated run parameters.
    pub fn run_params(&self) -> Result<RunParams, InvalidParams> {
        RunParams::new(
            self.company.as_str(),
            usize::from(self.min_articles),
            usize::from(self.max_articles),
        )
    }

    /// Fold command-line overrides into `config`.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
    }
}
