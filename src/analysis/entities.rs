//! Heuristic named-entity recognition.
//!
//! Capitalized spans are pulled from the text and kept only when they look
//! like an organization, product, event, law, or geo-political entity. The
//! cues are suffixes ("Corp", "Act", "Summit"), acronyms, model numbers, and a
//! small gazetteer of places. People and other spans are discarded.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Entity categories the topic classifier cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Organization,
    Product,
    Event,
    Law,
    GeoPolitical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
}

static SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-Z][A-Za-z0-9&'\-]*(?:\s+(?:(?:of|and|for|on|the|&)\s+)?(?:[A-Z][A-Za-z0-9&'\-]*|[0-9]+[A-Za-z]*))*",
    )
    .expect("valid regex")
});

const LAW_WORDS: &[&str] = &[
    "Act", "Law", "Bill", "Code", "Regulation", "Regulations", "Directive", "Treaty", "Amendment",
];

const EVENT_WORDS: &[&str] = &[
    "Summit", "Conference", "Expo", "Olympics", "Festival", "Election", "Forum", "Games", "Cup",
    "Week", "Fair", "Championship", "Show", "Keynote",
];

const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Corp", "Corporation", "Ltd", "LLC", "PLC", "Co", "Company", "Group", "Holdings",
    "Motors", "Bank", "Technologies", "Systems", "Partners", "Capital", "Association",
    "Commission", "Agency", "Authority", "Department", "Ministry", "Court", "University",
    "Institute", "Exchange", "Fund", "Board", "Council", "Reserve", "Airlines", "Labs",
];

const PLACES: &[&str] = &[
    "us", "u.s", "usa", "uk", "eu", "america", "united states", "united kingdom", "europe",
    "european union", "china", "india", "japan", "germany", "france", "italy", "spain", "canada",
    "mexico", "brazil", "russia", "ukraine", "australia", "south korea", "korea", "taiwan",
    "singapore", "israel", "saudi arabia", "turkey", "netherlands", "sweden", "norway",
    "switzerland", "ireland", "africa", "asia", "new york", "london", "paris", "berlin",
    "beijing", "shanghai", "tokyo", "mumbai", "delhi", "new delhi", "bangalore", "seoul",
    "hong kong", "washington", "california", "texas", "florida", "nevada", "michigan",
    "silicon valley", "wall street", "shenzhen", "toronto", "sydney", "dubai",
];

const LEADING_ARTICLES: &[&str] = &["The ", "A ", "An "];

/// Extracts entities of the supported kinds from free text.
#[derive(Debug, Clone)]
pub struct EntityRecognizer {
    places: HashSet<&'static str>,
}

impl Default for EntityRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer {
    pub fn new() -> Self {
        Self {
            places: PLACES.iter().copied().collect(),
        }
    }

    /// All recognized entities in order of appearance, without duplicates.
    pub fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::new();
        for m in SPAN.find_iter(text) {
            let span = clean_span(m.as_str());
            if span.is_empty() {
                continue;
            }
            if let Some(kind) = self.classify(span) {
                if !entities.iter().any(|e| e.text == span) {
                    entities.push(Entity {
                        text: span.to_string(),
                        kind,
                    });
                }
            }
        }
        entities
    }

    fn classify(&self, span: &str) -> Option<EntityKind> {
        let words: Vec<&str> = span.split_whitespace().collect();
        let last = *words.last()?;

        if words.len() > 1 && LAW_WORDS.contains(&last) {
            return Some(EntityKind::Law);
        }
        if words.iter().any(|w| EVENT_WORDS.contains(w)) && words.len() > 1 {
            return Some(EntityKind::Event);
        }
        if self.places.contains(span.to_lowercase().trim_end_matches('.')) {
            return Some(EntityKind::GeoPolitical);
        }
        if ORG_SUFFIXES.contains(&last.trim_end_matches('.')) && words.len() > 1 {
            return Some(EntityKind::Organization);
        }
        if words.len() > 1 && is_model_designation(last) {
            return Some(EntityKind::Product);
        }
        if words.len() == 1 && is_acronym(span) {
            return Some(EntityKind::Organization);
        }
        None
    }
}

/// Strip leading articles and a trailing possessive.
fn clean_span(raw: &str) -> &str {
    let mut span = raw.trim();
    for article in LEADING_ARTICLES {
        if let Some(rest) = span.strip_prefix(article) {
            span = rest.trim_start();
            break;
        }
    }
    span.strip_suffix("'s").unwrap_or(span)
}

/// "3", "Y", "S24", "X5": a short token naming a model.
fn is_model_designation(token: &str) -> bool {
    let has_digit = token.chars().any(|c| c.is_ascii_digit());
    let single_letter = token.len() == 1 && token.chars().all(|c| c.is_ascii_uppercase());
    (has_digit && token.len() <= 5) || single_letter
}

fn is_acronym(token: &str) -> bool {
    (2..=6).contains(&token.len()) && token.chars().all(|c| c.is_ascii_uppercase())
}
