//! Local inference backend via fastembed.
//!
//! The model is downloaded from Hugging Face on first use and cached;
//! after that, embedding runs entirely offline. Loading is expensive, so
//! the model is held for the life of the process behind a
//! [`SingleFlight`] cell: the first `embed*` (or an explicit
//! [`initialize`](LocalEmbedder::initialize)) starts the load, concurrent
//! callers await the same load, and a failed load may be retried later.
//! Inference runs on the blocking thread pool.

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use article_search_core::embedding::{EmbedError, Embedder, ModelState};

use super::{resolve_model, SingleFlight};
use crate::config::EmbeddingConfig;

type SharedModel = Arc<Mutex<fastembed::TextEmbedding>>;

/// Embedding backend running a sentence-embedding model in-process.
///
/// Produces fixed-length, mean-pooled, L2-normalized vectors (384 dims
/// for the default `all-minilm-l6-v2`).
pub struct LocalEmbedder {
    model_name: String,
    dims: usize,
    batch_size: usize,
    model: SingleFlight<SharedModel>,
}

impl LocalEmbedder {
    /// Create a backend for the configured model.
    ///
    /// Fails fast on unknown model names; the model itself is not loaded
    /// until first use.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let (model_name, dims) = resolve_model(config);
        if fastembed_model(&model_name).is_err() {
            bail!(
                "Unknown local embedding model: '{}'. Supported models: \
                 all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, \
                 nomic-embed-text-v1.5, multilingual-e5-small",
                model_name
            );
        }
        Ok(Self {
            model_name,
            dims,
            batch_size: config.batch_size,
            model: SingleFlight::new(),
        })
    }

    /// Load the model if it is not loaded yet.
    ///
    /// Idempotent: concurrent callers during `Loading` await the same
    /// in-flight load. After a failure the state is `Failed` and a later
    /// call starts a fresh load.
    pub async fn initialize(&self) -> Result<(), EmbedError> {
        self.model().await.map(|_| ())
    }

    async fn model(&self) -> Result<SharedModel, EmbedError> {
        let name = self.model_name.clone();
        self.model
            .get_or_load(move || Box::pin(load_model(name)))
            .await
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn state(&self) -> ModelState {
        self.model.state()
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let texts = texts.to_vec();
        let batch_size = self.batch_size;

        tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| EmbedError::Backend("embedding model mutex poisoned".to_string()))?;
            guard
                .embed(texts, Some(batch_size))
                .map_err(|e| EmbedError::Backend(format!("local embedding failed: {e}")))
        })
        .await
        .map_err(|e| EmbedError::Backend(format!("embedding task failed: {e}")))?
    }
}

/// Load the fastembed model on the blocking pool.
async fn load_model(model_name: String) -> Result<SharedModel, EmbedError> {
    info!(model = %model_name, "loading local embedding model");

    let model = fastembed_model(&model_name)?;
    let loaded = tokio::task::spawn_blocking(move || {
        fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(model).with_show_download_progress(false),
        )
    })
    .await
    .map_err(|e| EmbedError::ModelUnavailable(format!("embedding load task failed: {e}")))?
    .map_err(|e| {
        warn!(error = %e, "local embedding model failed to load");
        EmbedError::ModelUnavailable(format!("failed to initialize local embedding model: {e}"))
    })?;

    info!(model = %model_name, "local embedding model ready");
    Ok(Arc::new(Mutex::new(loaded)))
}

/// Map a configured model name to the fastembed model id.
fn fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel, EmbedError> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        "multilingual-e5-small" => Ok(fastembed::EmbeddingModel::MultilingualE5Small),
        other => Err(EmbedError::ModelUnavailable(format!(
            "unknown local embedding model: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_resolves_default_model() {
        let embedder = LocalEmbedder::new(&EmbeddingConfig::default()).unwrap();
        assert_eq!(embedder.model_name(), "all-minilm-l6-v2");
        assert_eq!(embedder.dims(), 384);
        assert_eq!(embedder.state(), ModelState::Unloaded);
    }

    #[test]
    fn test_new_rejects_unknown_model() {
        let config = EmbeddingConfig {
            model: Some("made-up-model".to_string()),
            ..EmbeddingConfig::default()
        };
        assert!(LocalEmbedder::new(&config).is_err());
    }
}
