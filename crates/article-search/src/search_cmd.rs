//! The `search` command: run a hybrid query and print ranked results.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

use article_search_core::models::{SearchMode, SearchOutcome};
use article_search_core::ranker::HybridRanker;

use crate::config::Config;
use crate::corpus;
use crate::embedding;

pub async fn run_search(
    config: &Config,
    corpus_path: &Path,
    query: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let articles = corpus::load_corpus(corpus_path)?;
    let embedder = embedding::create_embedder(&config.embedding)?;
    let ranker = HybridRanker::with_params(embedder, config.retrieval.params());

    let mut outcome = ranker
        .search(query, &articles)
        .await
        .context("search aborted on internal invariant violation")?;

    if outcome.mode == SearchMode::LexicalFallback {
        warn!("embedding backend unavailable; results are keyword-only");
    }

    if let Some(limit) = limit {
        outcome.results.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(outcome: &SearchOutcome) {
    if outcome.mode == SearchMode::LexicalFallback {
        println!("(semantic search unavailable — keyword results only)");
        println!();
    }

    if outcome.results.is_empty() {
        println!("No results.");
        return;
    }

    for (i, result) in outcome.results.iter().enumerate() {
        println!(
            "{}. [{:.1}] {}",
            i + 1,
            result.relevance,
            result.article.title
        );
        if !result.article.kind.is_empty() {
            println!("    type: {}", result.article.kind);
        }
        if let Some(date) = &result.article.date {
            println!("    date: {}", date);
        }
        if !result.article.tags.is_empty() {
            println!("    tags: {}", result.article.tags.join(", "));
        }
        if let Some(similarity) = result.similarity {
            println!("    similarity: {:.3}", similarity);
        }
        if let Some(url) = &result.article.url {
            println!("    url: {}", url);
        }
        println!("    id: {}", result.article.id);
        println!();
    }
}
