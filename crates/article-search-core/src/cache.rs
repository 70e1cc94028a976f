//! Per-article embedding vector memoization.
//!
//! [`VectorCache`] maps `Article::id` to its computed embedding vector so
//! repeated queries never re-embed a document. Entries are created on
//! first need and never invalidated within a process lifetime; a fresh
//! process clears the cache. Writes are idempotent memoization: the first
//! writer wins and entries, once written, are never overwritten, so
//! concurrent reads after a write are race-free.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::embedding::{embedding_input, EmbedError, Embedder};
use crate::models::Article;

/// In-memory memo of article embedding vectors, keyed by article id.
pub struct VectorCache {
    vectors: RwLock<HashMap<u64, Vec<f32>>>,
}

impl VectorCache {
    pub fn new() -> Self {
        Self {
            vectors: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached vectors.
    pub fn len(&self) -> usize {
        self.vectors.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a vector for `id` has been cached.
    pub fn contains(&self, id: u64) -> bool {
        self.vectors.read().unwrap().contains_key(&id)
    }

    /// Cloned cached vector for `id`, if present.
    pub fn get(&self, id: u64) -> Option<Vec<f32>> {
        self.vectors.read().unwrap().get(&id).cloned()
    }

    /// Insert a vector unless one is already present (first writer wins).
    fn insert_if_absent(&self, id: u64, vector: Vec<f32>) {
        self.vectors.write().unwrap().entry(id).or_insert(vector);
    }

    /// Seed the cache from a precomputed embedding carried by the article,
    /// if it matches the embedder's dimensionality. Vectors of the wrong
    /// length are ignored and recomputed on demand instead.
    fn seed_precomputed(&self, article: &Article, dims: usize) -> bool {
        match &article.embedding {
            Some(vector) if vector.len() == dims => {
                self.insert_if_absent(article.id, vector.clone());
                true
            }
            Some(vector) => {
                debug!(
                    id = article.id,
                    got = vector.len(),
                    expected = dims,
                    "ignoring precomputed embedding with wrong dimensionality"
                );
                false
            }
            None => false,
        }
    }

    /// Return the cached vector for an article, computing and storing it
    /// first if missing.
    ///
    /// Missing vectors are computed from the fixed combined-field input
    /// (`"title. description"`). A precomputed embedding on the article
    /// seeds the cache without consulting the backend.
    pub async fn get_or_compute(
        &self,
        article: &Article,
        embedder: &dyn Embedder,
    ) -> Result<Vec<f32>, EmbedError> {
        if let Some(vector) = self.get(article.id) {
            return Ok(vector);
        }
        if self.seed_precomputed(article, embedder.dims()) {
            if let Some(vector) = self.get(article.id) {
                return Ok(vector);
            }
        }

        let vector = embedder.embed(&embedding_input(article)).await?;
        self.insert_if_absent(article.id, vector.clone());
        // Return the stored value: if a concurrent caller won the write,
        // its vector is the one every reader must see.
        Ok(self.get(article.id).unwrap_or(vector))
    }

    /// Ensure every article in the corpus has a cached vector, embedding
    /// all missing ones in a single backend batch.
    pub async fn ensure_corpus(
        &self,
        corpus: &[Article],
        embedder: &dyn Embedder,
    ) -> Result<(), EmbedError> {
        let mut missing: Vec<&Article> = Vec::new();
        for article in corpus {
            if !self.contains(article.id) && !self.seed_precomputed(article, embedder.dims()) {
                missing.push(article);
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        debug!(count = missing.len(), "embedding uncached articles");
        let inputs: Vec<String> = missing.iter().map(|a| embedding_input(a)).collect();
        let vectors = embedder.embed_batch(&inputs).await?;
        if vectors.len() != missing.len() {
            return Err(EmbedError::Backend(format!(
                "backend returned {} vectors for {} inputs",
                vectors.len(),
                missing.len()
            )));
        }
        for (article, vector) in missing.iter().zip(vectors) {
            self.insert_if_absent(article.id, vector);
        }
        Ok(())
    }
}

impl Default for VectorCache {
    fn default() -> Self {
        Self::new()
    }
}
