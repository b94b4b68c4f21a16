//! Topic tagging from a fixed topic → keyword table.
//!
//! A topic applies when one of its keywords occurs anywhere in the lowercased
//! summary, or when a recognized entity that occurs in the summary itself
//! contains one of the keywords. Matching is by substring, so short keywords
//! such as "ev" also fire inside longer words.

use crate::analysis::entities::EntityRecognizer;
use crate::config::TopicRule;
use itertools::Itertools;

/// Tag used when no topic matches.
pub const GENERAL_NEWS: &str = "General News";

/// Maps a summary to one or more topic tags.
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    rules: Vec<TopicRule>,
    entities: EntityRecognizer,
}

impl TopicClassifier {
    /// Build from a rule table; keywords are lowercased and blanks dropped.
    pub fn new(rules: Vec<TopicRule>, entities: EntityRecognizer) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| TopicRule {
                name: rule.name,
                keywords: rule
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self { rules, entities }
    }

    /// Topics in table order; never empty.
    pub fn classify(&self, summary: &str) -> Vec<String> {
        if summary.trim().is_empty() {
            return vec![GENERAL_NEWS.to_string()];
        }

        let lowered = summary.to_lowercase();
        let entities: Vec<String> = self
            .entities
            .recognize(summary)
            .into_iter()
            .map(|e| e.text.to_lowercase())
            .unique()
            .collect();

        let topics: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| {
                rule.keywords.iter().any(|k| lowered.contains(k.as_str()))
                    || entities.iter().any(|entity| {
                        lowered.contains(entity.as_str())
                            && rule.keywords.iter().any(|k| entity.contains(k.as_str()))
                    })
            })
            .map(|rule| rule.name.clone())
            .unique()
            .collect();

        if topics.is_empty() {
            vec![GENERAL_NEWS.to_string()]
        } else {
            topics
        }
    }
}
