//! The `embed` command: precompute article vectors offline.
//!
//! Loads the corpus, embeds every article through the configured backend,
//! and writes a copy of the corpus with an `embedding` array attached to
//! each article. A corpus exported this way searches without consulting
//! the backend for document vectors (only the query is embedded live).

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use article_search_core::cache::VectorCache;

use crate::config::Config;
use crate::corpus;
use crate::embedding;

pub async fn run_embed(
    config: &Config,
    corpus_path: &Path,
    output: Option<PathBuf>,
) -> Result<()> {
    if !config.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }

    let mut articles = corpus::load_corpus(corpus_path)?;
    let embedder = embedding::create_embedder(&config.embedding)?;

    let already = articles.iter().filter(|a| a.embedding.is_some()).count();
    println!(
        "Embedding {} articles ({} already carry vectors) with model {}...",
        articles.len(),
        already,
        embedder.model_name()
    );

    let cache = VectorCache::new();
    cache.ensure_corpus(&articles, embedder.as_ref()).await?;

    for article in &mut articles {
        article.embedding = cache.get(article.id);
    }

    let output = output.unwrap_or_else(|| {
        corpus_path.with_file_name("articles_with_embeddings.json")
    });
    corpus::write_corpus(&output, &articles)?;

    println!(
        "Wrote {} articles with {}-dim vectors to {}",
        articles.len(),
        embedder.dims(),
        output.display()
    );
    Ok(())
}
