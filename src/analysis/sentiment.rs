//! Lexicon-based sentiment scoring using VADER.
//!
//! VADER's compound score is mapped to a label with fixed thresholds
//! (see [`SentimentLabel::from_compound`]). Component proportions are
//! renormalized so they always sum to 1, including for text VADER has no
//! opinion about.
//!
//! # Example
//! ```rust,ignore
//! let scorer = SentimentScorer::new();
//! let s = scorer.score("Profits soared to a record high.");
//! assert_eq!(s.label, SentimentLabel::Positive);
//! ```

use crate::models::{Sentiment, SentimentLabel};
use std::fmt;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Scores text polarity. Pure: the same text always yields the same result.
pub struct SentimentScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Score `text`. Blank text yields a neutral zero score.
    pub fn score(&self, text: &str) -> Sentiment {
        if text.trim().is_empty() {
            return Sentiment::neutral_zero();
        }

        let scores = self.analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0).max(0.0);
        let compound = scores
            .get("compound")
            .copied()
            .unwrap_or(0.0)
            .clamp(-1.0, 1.0);
        let (positive, negative, neutral) = proportions(get("pos"), get("neg"), get("neu"));

        Sentiment {
            compound,
            positive,
            negative,
            neutral,
            label: SentimentLabel::from_compound(compound),
        }
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentScorer").finish_non_exhaustive()
    }
}

/// Rescale VADER's rounded proportions to sum to exactly 1.
fn proportions(pos: f64, neg: f64, neu: f64) -> (f64, f64, f64) {
    let total = pos + neg + neu;
    if total <= f64::EPSILON {
        return (0.0, 0.0, 1.0);
    }
    (pos / total, neg / total, neu / total)
}
