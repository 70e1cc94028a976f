//! # Article Search CLI (`artsearch`)
//!
//! The `artsearch` binary searches a JSON corpus of short articles with
//! hybrid semantic + keyword ranking.
//!
//! ## Usage
//!
//! ```bash
//! artsearch --corpus ./articles.json <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `artsearch search "<query>"` | Rank articles against a free-text query |
//! | `artsearch embed` | Precompute embedding vectors and export the corpus |
//! | `artsearch stats` | Print corpus summary statistics |
//!
//! ## Examples
//!
//! ```bash
//! # Hybrid search with the default local model
//! artsearch search "first courthouse fire"
//!
//! # Keyword-only search (no model download)
//! artsearch --config ./lexical-only.toml search "courthouse"
//!
//! # Precompute vectors so later searches only embed the query
//! artsearch embed --output ./articles_with_embeddings.json
//!
//! # JSON output for scripting
//! artsearch search "railroad strike" --json --limit 5
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use article_search::{config, embed_cmd, search_cmd, stats};

/// Article Search — hybrid semantic + keyword search over a fixed corpus
/// of short articles.
#[derive(Parser)]
#[command(
    name = "artsearch",
    about = "Hybrid semantic + keyword search over a fixed corpus of short articles",
    version,
    long_about = "Article Search ranks a JSON corpus of short articles against free-text \
    queries by fusing sentence-embedding similarity with deterministic keyword scoring. \
    When the embedding model is unavailable the engine degrades to keyword-only results."
)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the corpus JSON file (array of article objects).
    #[arg(long, global = true, default_value = "./articles.json")]
    corpus: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Search the corpus.
    ///
    /// Embeds the query with the configured backend, fuses cosine
    /// similarity with keyword scores, and prints ranked results. If the
    /// backend cannot be loaded, keyword-only results are returned and
    /// the degradation is noted.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to print.
        #[arg(long)]
        limit: Option<usize>,

        /// Emit the full result set as pretty-printed JSON.
        #[arg(long)]
        json: bool,
    },

    /// Precompute embedding vectors for every article.
    ///
    /// Writes a copy of the corpus with an `embedding` array per article.
    /// Searching an exported corpus only embeds the query at runtime.
    Embed {
        /// Output path (default: `articles_with_embeddings.json` next to
        /// the corpus file).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print corpus summary statistics.
    ///
    /// Shows article counts, embedding coverage, and per-category
    /// breakdowns.
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::Config::default(),
    };

    match cli.command {
        Commands::Search { query, limit, json } => {
            search_cmd::run_search(&cfg, &cli.corpus, &query, limit, json).await?;
        }
        Commands::Embed { output } => {
            embed_cmd::run_embed(&cfg, &cli.corpus, output).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cli.corpus)?;
        }
    }

    Ok(())
}
