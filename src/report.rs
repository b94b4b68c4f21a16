//! Final report structure.
//!
//! Key names are part of the output contract and are spelled exactly as
//! consumers expect them, including the mixed-case section names.

use crate::analysis::compare::{ComparativeReport, CoverageDifference};
use crate::models::{AnalysisResult, Article, SentimentDistribution};
use crate::utils::upcase;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(rename = "COMPANY")]
    pub company: String,
    #[serde(rename = "ARTICLES")]
    pub articles: Vec<ReportArticle>,
    #[serde(rename = "COMPARATIVE_SENTIMENT_SCORE")]
    pub comparative_sentiment_score: ComparativeScore,
    #[serde(rename = "Coverage Differences")]
    pub coverage_differences: Vec<ReportDifference>,
    #[serde(rename = "Topic Overlap")]
    pub topic_overlap: ReportTopicOverlap,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_sentiment_analysis: String,
    #[serde(rename = "WARNINGS", skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportArticle {
    #[serde(rename = "TITLE")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "SUMMARY")]
    pub summary: String,
    /// Capitalized label: "Positive", "Negative" or "Neutral".
    #[serde(rename = "SENTIMENT")]
    pub sentiment: String,
    #[serde(rename = "TOPICS")]
    pub topics: Vec<String>,
}

impl From<&Article> for ReportArticle {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            url: article.url.clone(),
            summary: article.summary.clone(),
            sentiment: upcase(article.sentiment.label.as_str()),
            topics: article.topics.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparativeScore {
    #[serde(rename = "SENTIMENT_DISTRIBUTION")]
    pub sentiment_distribution: ReportDistribution,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReportDistribution {
    #[serde(rename = "POSITIVE")]
    pub positive: usize,
    #[serde(rename = "NEGATIVE")]
    pub negative: usize,
    #[serde(rename = "NEUTRAL")]
    pub neutral: usize,
}

impl From<SentimentDistribution> for ReportDistribution {
    fn from(dist: SentimentDistribution) -> Self {
        Self {
            positive: dist.positive,
            negative: dist.negative,
            neutral: dist.neutral,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDifference {
    #[serde(rename = "Comparison")]
    pub comparison: String,
    #[serde(rename = "Impact")]
    pub impact: String,
}

impl From<&CoverageDifference> for ReportDifference {
    fn from(diff: &CoverageDifference) -> Self {
        Self {
            comparison: diff.comparison.clone(),
            impact: diff.impact.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTopicOverlap {
    #[serde(rename = "Common Topics")]
    pub common_topics: Vec<String>,
    #[serde(rename = "Unique Topics")]
    pub unique_topics: UniqueTopics,
}

/// Per-article topics, serialized as `{"Article 1": [...], "Article 2": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueTopics(pub Vec<Vec<String>>);

impl Serialize for UniqueTopics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, topics) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("Article {}", i + 1), topics)?;
        }
        map.end()
    }
}

/// Assemble the report from a run result and its comparative analysis.
pub fn format_report(result: &AnalysisResult, comparison: &ComparativeReport) -> Report {
    let warnings = result
        .shortfall
        .iter()
        .map(|shortfall| shortfall.to_string())
        .collect();

    Report {
        company: result.company_name.clone(),
        articles: result.articles.iter().map(ReportArticle::from).collect(),
        comparative_sentiment_score: ComparativeScore {
            sentiment_distribution: comparison.sentiment_distribution.into(),
        },
        coverage_differences: comparison
            .coverage_differences
            .iter()
            .map(ReportDifference::from)
            .collect(),
        topic_overlap: ReportTopicOverlap {
            common_topics: comparison.topic_overlap.common_topics.clone(),
            unique_topics: UniqueTopics(comparison.topic_overlap.unique_topics.clone()),
        },
        final_sentiment_analysis: comparison.final_narrative.clone(),
        warnings,
    }
}
