//! Corpus statistics and health overview.
//!
//! A quick summary of what's searchable: article counts, embedding
//! coverage, and per-category breakdowns. Used by `artsearch stats` to
//! give confidence that the corpus file is what the engine expects.

use anyhow::Result;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::corpus;

pub fn run_stats(corpus_path: &Path) -> Result<()> {
    let articles = corpus::load_corpus(corpus_path)?;

    let total = articles.len();
    let precomputed = articles.iter().filter(|a| a.embedding.is_some()).count();
    let with_url = articles.iter().filter(|a| a.url.is_some()).count();

    let distinct_tags: HashSet<&str> = articles
        .iter()
        .flat_map(|a| a.tags.iter().map(String::as_str))
        .collect();

    let mut by_kind: BTreeMap<&str, usize> = BTreeMap::new();
    for article in &articles {
        let kind = if article.kind.is_empty() {
            "(uncategorized)"
        } else {
            article.kind.as_str()
        };
        *by_kind.entry(kind).or_insert(0) += 1;
    }

    println!("Article Search — Corpus Stats");
    println!("=============================");
    println!();
    println!("  Corpus:        {}", corpus_path.display());
    println!("  Articles:      {}", total);
    println!(
        "  Precomputed:   {} / {} ({}%)",
        precomputed,
        total,
        if total > 0 { (precomputed * 100) / total } else { 0 }
    );
    println!("  With URL:      {}", with_url);
    println!("  Distinct tags: {}", distinct_tags.len());
    println!();

    if !by_kind.is_empty() {
        println!("  By type:");
        let mut kinds: Vec<(&str, usize)> = by_kind.into_iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        for (kind, count) in kinds {
            println!("    {:<24} {}", kind, count);
        }
    }

    Ok(())
}
