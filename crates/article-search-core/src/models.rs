//! Core data models for the article retrieval engine.
//!
//! These types represent the corpus articles and the ranked results that
//! flow through the retrieval pipeline. The corpus is supplied fully in
//! memory as an ordered `Vec<Article>`; the engine only reads it.

use serde::{Deserialize, Serialize};

/// A single article in the searchable corpus.
///
/// Articles are produced by an upstream extraction process and are
/// immutable from the engine's point of view. `id` is unique and stable
/// across runs; it keys the vector cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Unique, stable identifier.
    pub id: u64,
    /// Article headline.
    pub title: String,
    /// Short summary paragraph.
    #[serde(default)]
    pub description: String,
    /// Topic tags, matched by substring in lexical scoring.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-text keyword field.
    #[serde(default)]
    pub keywords: String,
    /// Category label (serialized as `type` in corpus JSON).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Web-browsable URL, if available.
    #[serde(default)]
    pub url: Option<String>,
    /// Publication date as extracted, if known.
    #[serde(default)]
    pub date: Option<String>,
    /// Precomputed embedding vector, if the corpus file carries one.
    ///
    /// When present with the right dimensionality, the vector cache is
    /// seeded from it and the embedding backend is never consulted for
    /// this article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// A ranked search result.
///
/// Recomputed per query, never persisted. `relevance` is the fused score
/// (effectively 0–100); `similarity` is the raw cosine value and is only
/// populated on the semantic path.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// The matched article (precomputed embedding stripped).
    pub article: Article,
    /// Fused relevance score used for ordering.
    pub relevance: f64,
    /// Raw cosine similarity in `[-1.0, 1.0]`, when computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

/// How a search was actually answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Semantic similarity fused with lexical scores.
    Hybrid,
    /// The embedding backend was unavailable; lexical scores only.
    LexicalFallback,
}

/// Results of one search call, with the mode that produced them.
///
/// The mode flag surfaces degraded operation to the caller instead of
/// silently blending it away; a search is never an error for recoverable
/// causes.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub mode: SearchMode,
    pub results: Vec<SearchResult>,
}
