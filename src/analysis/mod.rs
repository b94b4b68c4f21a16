//! Per-article and cross-article analysis.
//!
//! - [`sentiment`]: VADER polarity scoring
//! - [`entities`]: heuristic named-entity recognition
//! - [`topics`]: keyword/entity topic tagging
//! - [`compare`]: sentiment distribution, pairwise differences, topic overlap, narrative
//!
//! The lexicon and recognizer are built once per process inside [`Analyzers`]
//! and shared by reference.

pub mod compare;
pub mod entities;
pub mod sentiment;
pub mod topics;

use crate::config::PipelineConfig;
use crate::models::{Article, Candidate, ExtractedContent};
use entities::EntityRecognizer;
use sentiment::SentimentScorer;
use topics::TopicClassifier;

/// Shared, immutable analysis state.
#[derive(Debug)]
pub struct Analyzers {
    pub sentiment: SentimentScorer,
    pub topics: TopicClassifier,
}

impl Analyzers {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            sentiment: SentimentScorer::new(),
            topics: TopicClassifier::new(config.topics.clone(), EntityRecognizer::new()),
        }
    }

    /// Score the body text, tag the summary, and build the article.
    pub fn analyze(&self, candidate: Candidate, content: ExtractedContent) -> Article {
        let sentiment = self.sentiment.score(&content.body_text);
        let topics = self.topics.classify(&content.summary);
        Article::assemble(candidate, content, sentiment, topics)
    }
}
