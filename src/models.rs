//! Data models for discovered candidates, analyzed articles, and run results.
//!
//! This module defines the core data structures that flow through the pipeline:
//! - [`Candidate`]: An unverified search hit (headline + link)
//! - [`ExtractedContent`]: Readable text pulled from a candidate's page
//! - [`Article`]: A candidate with extracted content, sentiment, and topics
//! - [`Sentiment`] / [`SentimentLabel`]: Lexicon-based polarity scores
//! - [`AnalysisResult`]: The finished, read-only article set for one run

use serde::{Deserialize, Serialize};
use std::fmt;

/// An unverified search result prior to extraction.
///
/// Uniqueness is enforced by `url` (exact match) for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Headline as shown by the search provider.
    pub title: String,
    /// Absolute link to the article page.
    pub url: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Readable text extracted from a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedContent {
    /// The page `<title>`, or `"Unknown Title"` when absent.
    pub title: String,
    /// Space-joined paragraph text (possibly prefixed by the title when short).
    pub body_text: String,
    /// At most 500 characters derived from `body_text`.
    pub summary: String,
}

/// Polarity label derived from a compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Threshold at or beyond which a compound score is considered polar.
    pub const THRESHOLD: f64 = 0.05;

    /// Classify a compound score: `>= 0.05` positive, `<= -0.05` negative, else neutral.
    pub fn from_compound(compound: f64) -> Self {
        if compound >= Self::THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= -Self::THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexicon-based sentiment scores for a piece of text.
///
/// `positive + negative + neutral` always sums to 1 (within float tolerance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Normalized aggregate polarity in `[-1, 1]`.
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub label: SentimentLabel,
}

impl Sentiment {
    /// The score assigned to empty text.
    pub fn neutral_zero() -> Self {
        Self {
            compound: 0.0,
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
            label: SentimentLabel::Neutral,
        }
    }
}

/// A candidate whose page was extracted and analyzed.
///
/// Immutable once built; `body_text` is never empty and `topics` never is either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Extracted page title.
    pub title: String,
    /// The search headline that led to this article.
    pub headline: String,
    pub url: String,
    pub body_text: String,
    pub summary: String,
    pub sentiment: Sentiment,
    /// Topic tags in classification-table order, without duplicates.
    pub topics: Vec<String>,
}

impl Article {
    /// Combine a candidate with its extracted content and analysis.
    pub fn assemble(
        candidate: Candidate,
        content: ExtractedContent,
        sentiment: Sentiment,
        topics: Vec<String>,
    ) -> Self {
        Self {
            title: content.title,
            headline: candidate.title,
            url: candidate.url,
            body_text: content.body_text,
            summary: content.summary,
            sentiment,
            topics,
        }
    }
}

/// Count of articles per sentiment label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn from_articles(articles: &[Article]) -> Self {
        articles.iter().fold(Self::default(), |mut dist, article| {
            dist.record(article.sentiment.label);
            dist
        })
    }

    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }

    pub fn count(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// A run that finished with fewer articles than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaShortfall {
    pub requested: usize,
    pub found: usize,
}

impl fmt::Display for QuotaShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Only found {} valid articles, which is less than the minimum {} requested.",
            self.found, self.requested
        )
    }
}

/// The finished article set of one discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub company_name: String,
    pub articles: Vec<Article>,
    pub sentiment_distribution: SentimentDistribution,
    /// Present when the run ended below the requested minimum.
    pub shortfall: Option<QuotaShortfall>,
}

impl AnalysisResult {
    pub fn new(
        company_name: impl Into<String>,
        articles: Vec<Article>,
        shortfall: Option<QuotaShortfall>,
    ) -> Self {
        let sentiment_distribution = SentimentDistribution::from_articles(&articles);
        Self {
            company_name: company_name.into(),
            articles,
            sentiment_distribution,
            shortfall,
        }
    }
}
