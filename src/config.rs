//! Pipeline configuration loaded from an optional YAML file.
//!
//! Every field carries a serde default, so an empty or partial file yields the
//! same behaviour as running without one.
//!
//! ```yaml
//! max_pages: 3
//! concurrency: 4
//! politeness_delay: [0.5, 1.0]
//! topics:
//!   - name: Supply Chain
//!     keywords: [supplier, logistics, shortage]
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Which search provider backs discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Google News tab markup.
    #[default]
    GoogleHtml,
    /// Google News RSS search feed.
    GoogleRss,
}

/// One topic category and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl TopicRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// An inclusive `[low, high]` range of seconds to draw a random wait from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondsRange(pub f64, pub f64);

impl SecondsRange {
    /// Bounds ordered and clamped to non-negative values.
    pub fn bounds(&self) -> (f64, f64) {
        let low = self.0.max(0.0);
        let high = self.1.max(0.0);
        if low <= high { (low, high) } else { (high, low) }
    }
}

/// Tunables for search, extraction, and analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub provider: ProviderKind,
    pub search_base_url: String,
    pub rss_base_url: String,
    pub max_pages: usize,
    pub page_size: usize,
    pub search_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Total extraction attempts per candidate, first try included.
    pub max_attempts: usize,
    pub politeness_delay: SecondsRange,
    pub retry_backoff: SecondsRange,
    /// Extractions allowed in flight at once; 1 keeps the run strictly sequential.
    pub concurrency: usize,
    pub referer: String,
    /// Browser identities; the first is used by default, the second on a block page.
    pub user_agents: Vec<String>,
    pub block_signatures: Vec<String>,
    pub topics: Vec<TopicRule>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::GoogleHtml,
            search_base_url: "https://www.google.com/search".to_string(),
            rss_base_url: "https://news.google.com/rss/search".to_string(),
            max_pages: 5,
            page_size: 10,
            search_timeout_secs: 10,
            fetch_timeout_secs: 15,
            max_attempts: 3,
            politeness_delay: SecondsRange(0.8, 2.0),
            retry_backoff: SecondsRange(1.5, 3.0),
            concurrency: 1,
            referer: "https://www.google.com/".to_string(),
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.6998.89 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15".to_string(),
            ],
            block_signatures: default_block_signatures(),
            topics: default_topics(),
        }
    }
}

impl PipelineConfig {
    /// Read a YAML config file, falling back to defaults for missing fields.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the YAML file given with `--config`
    ///
    /// # Returns
    ///
    /// The parsed configuration. An empty file yields [`PipelineConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML for this structure.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&raw)?;
        info!(
            provider = ?config.provider,
            max_pages = config.max_pages,
            concurrency = config.concurrency,
            topics = config.topics.len(),
            "Loaded pipeline configuration"
        );
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> usize {
        self.max_attempts.max(1)
    }

    pub fn workers(&self) -> usize {
        self.concurrency.max(1)
    }
}

pub fn default_block_signatures() -> Vec<String> {
    ["access denied", "just a moment", "interstitial", "captcha", "403 forbidden"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn default_topics() -> Vec<TopicRule> {
    vec![
        TopicRule::new(
            "Electric Vehicles",
            &["electric vehicle", "ev", "battery", "tesla model"],
        ),
        TopicRule::new("Stock Market", &["stock", "market", "shares", "invest", "trading"]),
        TopicRule::new(
            "Innovation",
            &["innovation", "technology", "new product", "research"],
        ),
        TopicRule::new(
            "Regulations",
            &["regulation", "regulatory", "law", "policy", "compliance"],
        ),
        TopicRule::new(
            "Autonomous Vehicles",
            &["autonomous", "self-driving", "driverless", "autopilot"],
        ),
        TopicRule::new("Financial", &["financial", "revenue", "profit", "sales", "earnings"]),
        TopicRule::new(
            "Partnerships",
            &["partnership", "collaboration", "deal", "agreement"],
        ),
        TopicRule::new("Legal", &["lawsuit", "legal", "court", "dispute"]),
    ]
}
