//! Cross-article comparison of a finished article set.
//!
//! Produces the sentiment distribution, one coverage-difference entry per
//! unordered article pair, topic overlap, and a one-paragraph verdict.
//! Pairwise differences grow quadratically with the article count.

use crate::analysis::sentiment::SentimentScorer;
use crate::models::{AnalysisResult, Article, SentimentDistribution, SentimentLabel};
use crate::utils::take_chars;
use std::collections::HashMap;

const TITLE_PREVIEW_CHARS: usize = 30;

/// Narration of how two articles differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageDifference {
    pub comparison: String,
    pub impact: String,
}

/// Topics shared by every article and topics exclusive to one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicOverlap {
    /// Topics present in every article, in the first article's order.
    pub common_topics: Vec<String>,
    /// Index-aligned with the articles: exclusive topics, or all of the
    /// article's topics when it has none of its own.
    pub unique_topics: Vec<Vec<String>>,
}

/// Overall tone derived from the label mix and the combined compound score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    StronglyPositive,
    StronglyNegative,
    LeansPositive,
    LeansNegative,
    Balanced,
}

impl Verdict {
    /// First matching rule wins.
    pub fn decide(positive_share: f64, negative_share: f64, compound: f64) -> Self {
        if positive_share > 0.6 && compound > 0.2 {
            Verdict::StronglyPositive
        } else if negative_share > 0.6 && compound < -0.2 {
            Verdict::StronglyNegative
        } else if positive_share > negative_share && compound > 0.0 {
            Verdict::LeansPositive
        } else if negative_share > positive_share && compound < 0.0 {
            Verdict::LeansNegative
        } else {
            Verdict::Balanced
        }
    }

    pub fn sentence(&self) -> &'static str {
        match self {
            Verdict::StronglyPositive => {
                "The overall sentiment is strongly positive, suggesting good performance and potential growth."
            }
            Verdict::StronglyNegative => {
                "The overall sentiment is strongly negative, indicating significant challenges ahead."
            }
            Verdict::LeansPositive => {
                "The sentiment leans positive, indicating a generally favorable outlook with some stability."
            }
            Verdict::LeansNegative => {
                "The sentiment leans negative, suggesting caution due to prevailing challenges."
            }
            Verdict::Balanced => {
                "The sentiment is balanced, reflecting a mixed outlook with no clear trend."
            }
        }
    }
}

/// Everything the comparative analysis derives from an article set.
#[derive(Debug, Clone)]
pub struct ComparativeReport {
    pub sentiment_distribution: SentimentDistribution,
    pub coverage_differences: Vec<CoverageDifference>,
    pub topic_overlap: TopicOverlap,
    pub final_narrative: String,
}

/// Run every comparison over a finished result.
pub fn analyze(result: &AnalysisResult, scorer: &SentimentScorer) -> ComparativeReport {
    let distribution = SentimentDistribution::from_articles(&result.articles);
    ComparativeReport {
        sentiment_distribution: distribution,
        coverage_differences: coverage_differences(&result.articles),
        topic_overlap: topic_overlap(&result.articles),
        final_narrative: final_narrative(&result.company_name, &distribution, &result.articles, scorer),
    }
}

/// One entry per unordered pair `(i, j)` with `i < j`, in row-major order.
pub fn coverage_differences(articles: &[Article]) -> Vec<CoverageDifference> {
    let mut differences = Vec::new();
    for (i, first) in articles.iter().enumerate() {
        for (j, second) in articles.iter().enumerate().skip(i + 1) {
            let comparison = format!(
                "{}, while {}.",
                describe(i, first),
                describe(j, second)
            );
            let impact = format!(
                "Article {} may {}, while Article {} may {}.",
                i + 1,
                impact_phrase(first.sentiment.label),
                j + 1,
                impact_phrase(second.sentiment.label)
            );
            differences.push(CoverageDifference { comparison, impact });
        }
    }
    differences
}

fn describe(index: usize, article: &Article) -> String {
    let focus = article.topics.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
    format!(
        "Article {} ({}...) has {} sentiment focusing on {}",
        index + 1,
        take_chars(&article.title, TITLE_PREVIEW_CHARS),
        article.sentiment.label,
        focus
    )
}

fn impact_phrase(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "boost confidence",
        SentimentLabel::Negative | SentimentLabel::Neutral => "raise concerns",
    }
}

/// Intersection of all topic sets plus each article's exclusive topics.
pub fn topic_overlap(articles: &[Article]) -> TopicOverlap {
    let Some(first) = articles.first() else {
        return TopicOverlap::default();
    };

    let common_topics = first
        .topics
        .iter()
        .filter(|topic| articles.iter().all(|a| a.topics.contains(topic)))
        .cloned()
        .collect();

    let mut holders: HashMap<&str, usize> = HashMap::new();
    for article in articles {
        let mut seen: Vec<&str> = Vec::new();
        for topic in &article.topics {
            if !seen.contains(&topic.as_str()) {
                seen.push(topic.as_str());
                *holders.entry(topic.as_str()).or_default() += 1;
            }
        }
    }

    let unique_topics = articles
        .iter()
        .map(|article| {
            let exclusive: Vec<String> = article
                .topics
                .iter()
                .filter(|topic| holders.get(topic.as_str()) == Some(&1))
                .cloned()
                .collect();
            if exclusive.is_empty() {
                article.topics.clone()
            } else {
                exclusive
            }
        })
        .collect();

    TopicOverlap {
        common_topics,
        unique_topics,
    }
}

/// Natural-language verdict over the whole article set.
pub fn final_narrative(
    company: &str,
    distribution: &SentimentDistribution,
    articles: &[Article],
    scorer: &SentimentScorer,
) -> String {
    if articles.is_empty() {
        return format!("No sufficient data to analyze {company}'s news coverage.");
    }
    let total = distribution.total();
    if total == 0 {
        return format!("{company}'s news coverage analysis inconclusive due to lack of data.");
    }

    let share = |label: SentimentLabel| distribution.count(label) as f64 / total as f64;
    let positive_share = share(SentimentLabel::Positive);
    let negative_share = share(SentimentLabel::Negative);

    let combined = articles
        .iter()
        .map(|a| a.summary.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let compound = scorer.score(&combined).compound;
    let verdict = Verdict::decide(positive_share, negative_share, compound);

    format!(
        "{company}'s news coverage shows {} positive, {} negative, and {} neutral articles. {}",
        distribution.positive,
        distribution.negative,
        distribution.neutral,
        verdict.sentence()
    )
}
