//! # Article Search Core
//!
//! Shared logic for the hybrid article retrieval engine: data models,
//! lexical scoring, the embedder trait and vector utilities, the
//! per-article vector cache, and the hybrid ranker.
//!
//! This crate contains no tokio, no filesystem I/O, and no inference
//! backend. Concrete embedding providers (fastembed, Ollama) live in the
//! `article-search` app crate; the core only sees them through the
//! [`embedding::Embedder`] trait.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Articles, search results, search outcomes |
//! | [`lexical`] | Deterministic field-weighted keyword scoring |
//! | [`embedding`] | Embedder trait, model lifecycle states, cosine similarity |
//! | [`cache`] | Per-article embedding vector memoization |
//! | [`ranker`] | Hybrid score fusion with lexical fallback |

pub mod cache;
pub mod embedding;
pub mod lexical;
pub mod models;
pub mod ranker;
