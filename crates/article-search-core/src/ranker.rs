//! Hybrid ranking: semantic and lexical score fusion with lexical fallback.
//!
//! The ranker operates entirely through the [`Embedder`] trait, with no
//! backend or configuration dependencies. The calling application
//! constructs an embedder, wraps it in a [`HybridRanker`], and passes the
//! corpus with each query.
//!
//! # Fusion Algorithm
//!
//! 1. An empty query returns every article with relevance 0 in original
//!    corpus order (no sort, no filter).
//! 2. Embed the query. Any embedding error degrades the whole call to
//!    lexical-only mode: scores > 0, sorted descending. Never an error to
//!    the caller.
//! 3. For every article, cosine similarity against its cached (or
//!    just-computed) vector; `semantic = round(similarity × 100)`.
//!    Articles with `semantic ≤ semantic_floor` are discarded from the
//!    semantic family before fusion — a pre-filter against near-random
//!    embeddings, not a post-filter on the fused list.
//! 4. Lexical scores are computed independently; articles with a score
//!    > 0 form the lexical family.
//! 5. Fuse over the union of both families:
//!    `fused = semantic × semantic_weight + lexical × lexical_weight`,
//!    where a family contributes 0 for articles outside it. Membership in
//!    either family alone is enough to appear in the result.
//! 6. Stable sort descending by fused score; ties keep original corpus
//!    order. No threshold is applied to the fused score itself.

use std::cmp::Ordering;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::VectorCache;
use crate::embedding::{checked_similarity, Embedder, InvalidVector};
use crate::lexical;
use crate::models::{Article, SearchMode, SearchOutcome, SearchResult};

/// Retrieval tuning parameters, decoupled from application config.
#[derive(Debug, Clone)]
pub struct RetrievalParams {
    /// Weight applied to the semantic score (0–100 scale).
    pub semantic_weight: f64,
    /// Weight applied to the lexical score.
    pub lexical_weight: f64,
    /// Semantic scores at or below this value are dropped before fusion.
    pub semantic_floor: f64,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            lexical_weight: 0.3,
            semantic_floor: 10.0,
        }
    }
}

/// Errors that abort a search call.
///
/// Only internal invariant violations abort; embedding failures are
/// recovered via the lexical fallback and never surface here.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    InvalidVector(#[from] InvalidVector),
}

/// Orchestrates the embedder, vector cache, and lexical scorer into one
/// ranked result list.
///
/// The embedder handle is shared (`Arc`): the expensive model behind it
/// is a process-wide resource constructed once and passed around, not
/// ambient global state. The ranker owns the vector cache, so repeated
/// searches against the same corpus reuse every document vector.
///
/// A new `search` call does not cancel a previous one; if callers race
/// queries, discarding stale results (last-query-wins) is their
/// responsibility.
pub struct HybridRanker {
    embedder: Arc<dyn Embedder>,
    cache: VectorCache,
    params: RetrievalParams,
}

impl HybridRanker {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_params(embedder, RetrievalParams::default())
    }

    pub fn with_params(embedder: Arc<dyn Embedder>, params: RetrievalParams) -> Self {
        Self {
            embedder,
            cache: VectorCache::new(),
            params,
        }
    }

    /// The vector cache backing this ranker.
    pub fn cache(&self) -> &VectorCache {
        &self.cache
    }

    /// Search the corpus, most relevant first.
    ///
    /// Always produces a result list for recoverable conditions (possibly
    /// empty, possibly lexical-only — see [`SearchOutcome::mode`]); the
    /// only error is an internal invariant violation.
    pub async fn search(
        &self,
        query: &str,
        corpus: &[Article],
    ) -> Result<SearchOutcome, SearchError> {
        if corpus.is_empty() {
            return Ok(SearchOutcome {
                mode: SearchMode::Hybrid,
                results: Vec::new(),
            });
        }

        if query.trim().is_empty() {
            let results = corpus
                .iter()
                .map(|article| SearchResult {
                    article: strip_vector(article),
                    relevance: 0.0,
                    similarity: None,
                })
                .collect();
            return Ok(SearchOutcome {
                mode: SearchMode::Hybrid,
                results,
            });
        }

        let query_vec = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(err) => {
                warn!(error = %err, "query embedding failed; falling back to lexical search");
                return Ok(self.lexical_only(query, corpus));
            }
        };

        if let Err(err) = self.cache.ensure_corpus(corpus, self.embedder.as_ref()).await {
            warn!(error = %err, "corpus embedding failed; falling back to lexical search");
            return Ok(self.lexical_only(query, corpus));
        }

        let mut results: Vec<SearchResult> = Vec::new();
        for article in corpus {
            let vector = match self.cache.get_or_compute(article, self.embedder.as_ref()).await {
                Ok(vector) => vector,
                Err(err) => {
                    warn!(error = %err, "article embedding failed; falling back to lexical search");
                    return Ok(self.lexical_only(query, corpus));
                }
            };

            let similarity = checked_similarity(&query_vec, &vector)?;
            let semantic = f64::from((similarity * 100.0).round());
            let lexical_score = lexical::score(query, article);

            let in_semantic = semantic > self.params.semantic_floor;
            let in_lexical = lexical_score > 0.0;
            if !in_semantic && !in_lexical {
                continue;
            }

            let semantic_part = if in_semantic { semantic } else { 0.0 };
            let fused = semantic_part * self.params.semantic_weight
                + lexical_score * self.params.lexical_weight;

            results.push(SearchResult {
                article: strip_vector(article),
                relevance: fused,
                similarity: Some(similarity),
            });
        }

        sort_descending(&mut results);
        debug!(query, results = results.len(), "hybrid search complete");
        Ok(SearchOutcome {
            mode: SearchMode::Hybrid,
            results,
        })
    }

    /// Lexical-only degraded mode: scores > 0, sorted descending.
    fn lexical_only(&self, query: &str, corpus: &[Article]) -> SearchOutcome {
        let mut results: Vec<SearchResult> = corpus
            .iter()
            .filter_map(|article| {
                let score = lexical::score(query, article);
                (score > 0.0).then(|| SearchResult {
                    article: strip_vector(article),
                    relevance: score,
                    similarity: None,
                })
            })
            .collect();
        sort_descending(&mut results);
        SearchOutcome {
            mode: SearchMode::LexicalFallback,
            results,
        }
    }
}

/// Clone an article for a result, dropping any precomputed vector so
/// results stay lean (vectors belong to the cache, not the output).
fn strip_vector(article: &Article) -> Article {
    let mut article = article.clone();
    article.embedding = None;
    article
}

/// Stable sort by relevance descending; ties keep corpus order.
fn sort_descending(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{EmbedError, ModelState};
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Stub backend mapping exact input texts to fixed vectors.
    struct StubEmbedder {
        dims: usize,
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedder {
        fn new(dims: usize, entries: &[(&str, Vec<f32>)]) -> Self {
            Self {
                dims,
                vectors: entries
                    .iter()
                    .map(|(text, vector)| (text.to_string(), vector.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        fn model_name(&self) -> &str {
            "stub"
        }

        fn dims(&self) -> usize {
            self.dims
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            texts
                .iter()
                .map(|text| {
                    self.vectors
                        .get(text)
                        .cloned()
                        .ok_or_else(|| EmbedError::Backend(format!("no stub vector for {text:?}")))
                })
                .collect()
        }
    }

    /// Backend that is permanently unavailable.
    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn model_name(&self) -> &str {
            "failing"
        }

        fn dims(&self) -> usize {
            2
        }

        fn state(&self) -> ModelState {
            ModelState::Failed
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Err(EmbedError::ModelUnavailable("stub backend is down".to_string()))
        }
    }

    fn make_article(id: u64, title: &str, description: &str) -> Article {
        Article {
            id,
            title: title.to_string(),
            description: description.to_string(),
            tags: Vec::new(),
            keywords: String::new(),
            kind: String::new(),
            url: None,
            date: None,
            embedding: None,
        }
    }

    #[tokio::test]
    async fn test_empty_query_echoes_corpus() {
        let ranker = HybridRanker::new(Arc::new(FailingEmbedder));
        let corpus = vec![
            make_article(1, "One", "a"),
            make_article(2, "Two", "b"),
            make_article(3, "Three", "c"),
        ];

        let outcome = ranker.search("   ", &corpus).await.unwrap();
        assert_eq!(outcome.mode, SearchMode::Hybrid);
        assert_eq!(outcome.results.len(), 3);
        for (result, article) in outcome.results.iter().zip(&corpus) {
            assert_eq!(result.article.id, article.id);
            assert_eq!(result.relevance, 0.0);
            assert_eq!(result.similarity, None);
        }
    }

    #[tokio::test]
    async fn test_empty_corpus_yields_empty_results() {
        let ranker = HybridRanker::new(Arc::new(FailingEmbedder));
        let outcome = ranker.search("anything", &[]).await.unwrap();
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn test_failing_embedder_degrades_to_lexical() {
        let ranker = HybridRanker::new(Arc::new(FailingEmbedder));
        let corpus = vec![
            make_article(1, "Prairie Fires", "Grassland burns of 1850."),
            make_article(2, "Courthouse History", "The old courthouse square."),
        ];

        let outcome = ranker.search("prairie", &corpus).await.unwrap();
        assert_eq!(outcome.mode, SearchMode::LexicalFallback);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].article.id, 1);
        assert_eq!(outcome.results[0].similarity, None);
    }

    #[tokio::test]
    async fn test_fallback_with_no_lexical_overlap_is_empty() {
        let ranker = HybridRanker::new(Arc::new(FailingEmbedder));
        let corpus = vec![make_article(
            1,
            "Illinois State Normal University Founding Charter",
            "Legislative act establishing Illinois' first public university in Normal.",
        )];

        let outcome = ranker.search("Beer Nuts", &corpus).await.unwrap();
        assert_eq!(outcome.mode, SearchMode::LexicalFallback);
        assert!(outcome.results.is_empty());
    }

    #[tokio::test]
    async fn test_fusion_arithmetic() {
        // similarity 0.8 → semantic 80; one title word match → lexical 20;
        // fused = 80 × 0.7 + 20 × 0.3 = 62.
        let article = make_article(1, "Lecture Notes", "Unremarkable text.");
        let embedder = StubEmbedder::new(
            2,
            &[
                ("history lecture", vec![1.0, 0.0]),
                ("Lecture Notes. Unremarkable text.", vec![0.8, 0.6]),
            ],
        );
        let ranker = HybridRanker::new(Arc::new(embedder));

        let outcome = ranker.search("history lecture", &[article]).await.unwrap();
        assert_eq!(outcome.mode, SearchMode::Hybrid);
        assert_eq!(outcome.results.len(), 1);
        assert!((outcome.results[0].relevance - 62.0).abs() < 1e-9);
        assert!((outcome.results[0].similarity.unwrap() - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_semantic_floor_discards_weak_similarity() {
        // similarity 0.05 → semantic 5 ≤ 10, and no lexical overlap: excluded.
        // similarity 0.5 → semantic 50: included with no lexical support.
        let corpus = vec![
            make_article(1, "Alpha", "aaa."),
            make_article(2, "Beta", "bbb."),
        ];
        let embedder = StubEmbedder::new(
            2,
            &[
                ("query", vec![1.0, 0.0]),
                ("Alpha. aaa.", vec![0.05, 0.99874896]),
                ("Beta. bbb.", vec![0.5, 0.8660254]),
            ],
        );
        let ranker = HybridRanker::new(Arc::new(embedder));

        let outcome = ranker.search("query", &corpus).await.unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].article.id, 2);
        assert!((outcome.results[0].relevance - 50.0 * 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ties_keep_corpus_order() {
        let corpus = vec![
            make_article(1, "First Same", "x."),
            make_article(2, "Second Same", "y."),
        ];
        let embedder = StubEmbedder::new(
            2,
            &[
                ("same", vec![1.0, 0.0]),
                ("First Same. x.", vec![0.6, 0.8]),
                ("Second Same. y.", vec![0.6, 0.8]),
            ],
        );
        let ranker = HybridRanker::new(Arc::new(embedder));

        let outcome = ranker.search("same", &corpus).await.unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].article.id, 1);
        assert_eq!(outcome.results[1].article.id, 2);
    }

    #[tokio::test]
    async fn test_repeated_search_reuses_cache() {
        let corpus = vec![make_article(1, "Cached", "doc.")];
        let embedder = Arc::new(StubEmbedder::new(
            2,
            &[("cached", vec![1.0, 0.0]), ("Cached. doc.", vec![1.0, 0.0])],
        ));
        let ranker = HybridRanker::new(embedder);

        ranker.search("cached", &corpus).await.unwrap();
        assert!(ranker.cache().contains(1));
        let outcome = ranker.search("cached", &corpus).await.unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(ranker.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_aborts() {
        // Precomputed 3-dim vector sneaks past a stub claiming dims() = 3,
        // while the query embeds to 2 dims: invariant violation.
        let mut article = make_article(1, "Broken", "doc.");
        article.embedding = Some(vec![0.1, 0.2, 0.3]);
        let embedder = StubEmbedder::new(3, &[("query", vec![1.0, 0.0])]);
        let ranker = HybridRanker::new(Arc::new(embedder));

        let err = ranker.search("query", &[article]).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidVector(_)));
    }
}
