//! TOML configuration parsing and validation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use article_search_core::ranker::RetrievalParams;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Weight applied to the semantic score (0–100 scale).
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f64,
    /// Weight applied to the lexical score.
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f64,
    /// Semantic scores at or below this value are dropped before fusion.
    #[serde(default = "default_semantic_floor")]
    pub semantic_floor: f64,
}

fn default_semantic_weight() -> f64 {
    0.7
}
fn default_lexical_weight() -> f64 {
    0.3
}
fn default_semantic_floor() -> f64 {
    10.0
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_weight: default_semantic_weight(),
            lexical_weight: default_lexical_weight(),
            semantic_floor: default_semantic_floor(),
        }
    }
}

impl RetrievalConfig {
    /// Convert to the core ranker's parameter struct.
    pub fn params(&self) -> RetrievalParams {
        RetrievalParams {
            semantic_weight: self.semantic_weight,
            lexical_weight: self.lexical_weight,
            semantic_floor: self.semantic_floor,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// Backend: `local` (fastembed), `ollama`, or `disabled`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model name; backends fall back to `all-minilm-l6-v2` when unset.
    #[serde(default)]
    pub model: Option<String>,
    /// Vector dimensionality; resolved from the model name when unset.
    #[serde(default)]
    pub dims: Option<usize>,
    /// Ollama base URL (default `http://localhost:11434`).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.retrieval.semantic_weight < 0.0 || config.retrieval.lexical_weight < 0.0 {
        anyhow::bail!("retrieval weights must be >= 0.0");
    }
    if config.retrieval.semantic_floor < 0.0 {
        anyhow::bail!("retrieval.semantic_floor must be >= 0.0");
    }

    if let Some(dims) = config.embedding.dims {
        if dims == 0 {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "local" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, local, or ollama.",
            other
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.embedding.provider, "local");
        assert_eq!(config.retrieval.semantic_weight, 0.7);
        assert_eq!(config.retrieval.lexical_weight, 0.3);
        assert_eq!(config.retrieval.semantic_floor, 10.0);
    }

    #[test]
    fn test_load_minimal() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert!(config.embedding.is_enabled());
        assert_eq!(config.embedding.batch_size, 64);
    }

    #[test]
    fn test_load_full() {
        let file = write_config(
            r#"
            [retrieval]
            semantic_weight = 0.6
            lexical_weight = 0.4
            semantic_floor = 5.0

            [embedding]
            provider = "ollama"
            model = "nomic-embed-text"
            dims = 768
            url = "http://localhost:11434"
            "#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.embedding.provider, "ollama");
        assert_eq!(config.embedding.dims, Some(768));
        assert_eq!(config.retrieval.semantic_floor, 5.0);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let file = write_config("[embedding]\nprovider = \"openai\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_zero_dims_rejected() {
        let file = write_config("[embedding]\ndims = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let file = write_config("[retrieval]\nlexical_weight = -0.1\n");
        assert!(load_config(file.path()).is_err());
    }
}
