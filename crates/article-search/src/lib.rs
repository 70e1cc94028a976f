//! # Article Search
//!
//! Hybrid semantic + lexical search over a fixed corpus of short articles.
//!
//! A free-text question is scored against every article two ways —
//! cosine similarity of sentence embeddings and deterministic keyword
//! matching — and the two score families are fused into one ranking.
//! When the embedding backend is unavailable, search degrades to
//! keyword-only results instead of failing.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────────────────────┐
//! │ articles.json│───▶│         HybridRanker          │
//! └──────────────┘    │  ┌──────────┐  ┌───────────┐  │
//!                     │  │ Lexical  │  │ Embedder  │  │
//!      query ────────▶│  │ scorer   │  │ + vector  │  │──▶ ranked results
//!                     │  └──────────┘  │   cache   │  │
//!                     │     fusion ◀───┴───────────┘  │
//!                     └───────────────────────────────┘
//! ```
//!
//! The algorithmic core lives in the `article-search-core` crate; this
//! crate supplies the embedding backends, configuration, corpus I/O, and
//! the `artsearch` CLI.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`corpus`] | Corpus JSON loading and export |
//! | [`embedding`] | Embedding backends (fastembed, Ollama, disabled) |
//! | [`search_cmd`] | The `search` command |
//! | [`embed_cmd`] | The `embed` command (offline vector export) |
//! | [`stats`] | The `stats` command |

pub mod config;
pub mod corpus;
pub mod embed_cmd;
pub mod embedding;
pub mod search_cmd;
pub mod stats;
