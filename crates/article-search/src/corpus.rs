//! Corpus loading and export.
//!
//! The corpus is a JSON array of article objects produced by an upstream
//! extraction process. Unknown fields are ignored; an optional
//! `embedding` array per article seeds the vector cache without
//! consulting the backend.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use article_search_core::models::Article;

/// Load an `articles.json` corpus file into memory.
///
/// Fails on unreadable files, malformed JSON, or duplicate article ids —
/// a corpus with duplicate ids would silently collapse cache entries.
pub fn load_corpus(path: &Path) -> Result<Vec<Article>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;

    let articles: Vec<Article> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse corpus file: {}", path.display()))?;

    let mut seen = HashSet::new();
    for article in &articles {
        if !seen.insert(article.id) {
            anyhow::bail!(
                "Duplicate article id {} in corpus file: {}",
                article.id,
                path.display()
            );
        }
    }

    let precomputed = articles.iter().filter(|a| a.embedding.is_some()).count();
    info!(
        count = articles.len(),
        precomputed,
        path = %path.display(),
        "corpus loaded"
    );
    Ok(articles)
}

/// Write a corpus (typically with freshly attached embedding vectors)
/// back out as pretty-printed JSON.
pub fn write_corpus(path: &Path, articles: &[Article]) -> Result<()> {
    let json = serde_json::to_string_pretty(articles)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write corpus file: {}", path.display()))?;
    Ok(())
}
