//! Deterministic field-weighted lexical scoring.
//!
//! Scores a query against an article's raw text fields with no semantic
//! modeling. Matching is case-insensitive and purely substring-based:
//!
//! | Match type | Points |
//! |------------|--------|
//! | exact query phrase in title | 100 |
//! | exact query phrase in description | 50 |
//! | each query word found in title | 20 |
//! | each query word found in description | 10 |
//! | each query word matching a tag (substring either direction) | 15 |
//! | each query word found in keywords field | 5 |
//! | query phrase is substring of the type label | 10 |
//!
//! The query is tokenized on whitespace; tokens of length ≤ 2 are dropped
//! from the per-word checks but still participate in the phrase checks.

use crate::models::Article;

const PHRASE_IN_TITLE: f64 = 100.0;
const PHRASE_IN_DESCRIPTION: f64 = 50.0;
const WORD_IN_TITLE: f64 = 20.0;
const WORD_IN_DESCRIPTION: f64 = 10.0;
const WORD_MATCHES_TAG: f64 = 15.0;
const WORD_IN_KEYWORDS: f64 = 5.0;
const PHRASE_IN_KIND: f64 = 10.0;

/// Minimum word length (exclusive) for the per-word checks.
const MIN_WORD_LEN: usize = 2;

/// Lowercased query words eligible for the per-word checks.
fn query_words(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_WORD_LEN)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Score a query against one article.
///
/// Returns `0.0` for an empty or whitespace-only query. A score of zero
/// means the article has no lexical overlap with the query at all;
/// lexical-only result sets exclude such articles.
pub fn score(query: &str, article: &Article) -> f64 {
    let phrase = query.trim().to_lowercase();
    if phrase.is_empty() {
        return 0.0;
    }

    let title = article.title.to_lowercase();
    let description = article.description.to_lowercase();
    let keywords = article.keywords.to_lowercase();
    let kind = article.kind.to_lowercase();
    let tags: Vec<String> = article.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut total = 0.0;

    if title.contains(&phrase) {
        total += PHRASE_IN_TITLE;
    }
    if description.contains(&phrase) {
        total += PHRASE_IN_DESCRIPTION;
    }

    for word in query_words(query) {
        if title.contains(&word) {
            total += WORD_IN_TITLE;
        }
        if description.contains(&word) {
            total += WORD_IN_DESCRIPTION;
        }
        if tags.iter().any(|t| t.contains(&word) || word.contains(t.as_str())) {
            total += WORD_MATCHES_TAG;
        }
        if keywords.contains(&word) {
            total += WORD_IN_KEYWORDS;
        }
    }

    if kind.contains(&phrase) {
        total += PHRASE_IN_KIND;
    }

    total
}
