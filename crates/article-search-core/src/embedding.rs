//! Embedder trait, model lifecycle states, and vector similarity.
//!
//! Defines the [`Embedder`] trait that all embedding backends implement,
//! the [`ModelState`] lifecycle they report, and pure helper functions for
//! similarity computation. Concrete backends (fastembed, Ollama) live in
//! the `article-search` app crate.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Article;

/// Lifecycle of an embedding backend's underlying model.
///
/// Transitions are monotonic except that `Failed → Loading` is allowed on
/// retry. `Ready` is terminal-stable: there is no forced unload.
///
/// ```text
/// Unloaded ──initialize()──▶ Loading ──success──▶ Ready
///     ▲                         │
///     │                      failure
///     └──── retry ◀──────── Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl ModelState {
    /// The model is loaded and can embed without suspension.
    pub fn is_ready(self) -> bool {
        matches!(self, ModelState::Ready)
    }

    /// A call to `initialize()` would start (or restart) a load.
    pub fn can_start_load(self) -> bool {
        matches!(self, ModelState::Unloaded | ModelState::Failed)
    }
}

/// Errors from embedding backends.
///
/// `Clone` so a shared in-flight load can hand the same failure to every
/// subscriber. The ranker treats every variant as recoverable and degrades
/// to lexical-only search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbedError {
    /// The underlying model could not be loaded or reached.
    #[error("embedding model unavailable: {0}")]
    ModelUnavailable(String),
    /// The backend accepted the request but failed to produce vectors.
    #[error("embedding backend error: {0}")]
    Backend(String),
}

/// Dimension mismatch between two vectors being compared.
///
/// This should never occur while the cache and ranker share one embedder
/// instance; it is an internal invariant violation, not a user-facing
/// condition, and aborts the search call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("embedding dimension mismatch: expected {expected}, got {actual}")]
pub struct InvalidVector {
    pub expected: usize,
    pub actual: usize,
}

/// Trait for embedding backends.
///
/// Implementations produce fixed-length, mean-pooled, L2-normalized
/// vectors; the length reported by [`dims`](Embedder::dims) is constant
/// across all vectors an instance ever produces. Backends with an
/// expensive load step trigger it lazily from `embed*` and report
/// progress through [`state`](Embedder::state).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// The model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;

    /// Embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;

    /// Current lifecycle state. Backends without a load step are always
    /// `Ready`.
    fn state(&self) -> ModelState {
        ModelState::Ready
    }

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single text. Convenience wrapper around a batch of one.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Backend("empty embedding response".to_string()))
    }
}

/// The fixed combined-field convention for embedding an article.
///
/// Title and description are joined with a single `". "` separator, for
/// documents and any re-embedded text alike, so every vector is computed
/// at the same semantic granularity.
pub fn embedding_input(article: &Article) -> String {
    format!("{}. {}", article.title, article.description)
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or when
/// either vector has (near-)zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// [`cosine_similarity`] with the length check promoted to an error.
///
/// The ranker uses this variant: a dimension mismatch means the cache and
/// the query vector came from different providers, which is a fatal
/// internal invariant violation rather than a score of zero.
pub fn checked_similarity(a: &[f32], b: &[f32]) -> Result<f32, InvalidVector> {
    if a.len() != b.len() {
        return Err(InvalidVector {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(cosine_similarity(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_symmetric() {
        let a = vec![0.3, -1.2, 0.8];
        let b = vec![1.1, 0.4, -0.2];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&b, &a), 0.0);
    }

    #[test]
    fn test_cosine_different_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_checked_similarity_rejects_mismatch() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0];
        let err = checked_similarity(&a, &b).unwrap_err();
        assert_eq!(
            err,
            InvalidVector {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_embedding_input_convention() {
        let article = Article {
            id: 7,
            title: "Route 66 Through Bloomington".to_string(),
            description: "How the Mother Road shaped local commerce.".to_string(),
            tags: Vec::new(),
            keywords: String::new(),
            kind: String::new(),
            url: None,
            date: None,
            embedding: None,
        };
        assert_eq!(
            embedding_input(&article),
            "Route 66 Through Bloomington. How the Mother Road shaped local commerce."
        );
    }

    #[test]
    fn test_model_state_predicates() {
        assert!(ModelState::Ready.is_ready());
        assert!(!ModelState::Loading.is_ready());
        assert!(ModelState::Unloaded.can_start_load());
        assert!(ModelState::Failed.can_start_load());
        assert!(!ModelState::Loading.can_start_load());
        assert!(!ModelState::Ready.can_start_load());
    }
}
