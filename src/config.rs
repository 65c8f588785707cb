//! TOML configuration for `pdfchunk`.
//!
//! Every section is optional; a missing file means built-in defaults. A few
//! settings can be overridden from the environment (a `.env` file is read
//! first by the binary):
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `DOCLING_URL` | `conversion.url` |
//! | `MEILISEARCH_URL` | `index.url` |
//! | `PDFCHUNK_INDEX` | `index.name` |
//! | `MISTRAL_API_KEY` | enables the default `[index.embedder]` when none is configured |
//!
//! `MEILISEARCH_INDEX` is deliberately not read: it usually names a different
//! index in shared `.env` files.
//!
//! API keys never live in the TOML file. `index.api_key_env` and
//! `index.embedder.api_key_env` name the environment variables to read.

use anyhow::{bail, Context, Result};
use pdf_chunker_core::ChunkOptions;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,
    #[serde(default = "default_split_on_headers")]
    pub split_on_headers: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            overlap_chars: default_overlap_chars(),
            split_on_headers: default_split_on_headers(),
        }
    }
}

impl ChunkingConfig {
    pub fn options(&self) -> ChunkOptions {
        ChunkOptions {
            max_chars: self.max_chars,
            overlap_chars: self.overlap_chars,
            split_on_headers: self.split_on_headers,
        }
    }
}

fn default_max_chars() -> usize {
    1200
}
fn default_overlap_chars() -> usize {
    120
}
fn default_split_on_headers() -> bool {
    true
}

/// Which converter turns a PDF into text.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConverterBackend {
    /// Remote docling-serve instance (layout, tables, headings as markdown).
    #[default]
    Docling,
    /// In-process `pdf-extract` (plain text, no heading structure).
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConversionConfig {
    #[serde(default)]
    pub backend: ConverterBackend,
    #[serde(default = "default_docling_url")]
    pub url: String,
    #[serde(default = "default_conversion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            backend: ConverterBackend::default(),
            url: default_docling_url(),
            timeout_secs: default_conversion_timeout_secs(),
        }
    }
}

fn default_docling_url() -> String {
    "http://localhost:5001".to_string()
}
fn default_conversion_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub url: String,
    #[serde(default = "default_index_name")]
    pub name: String,
    #[serde(default = "default_index_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_searchable_attributes")]
    pub searchable_attributes: Vec<String>,
    #[serde(default = "default_filterable_attributes")]
    pub filterable_attributes: Vec<String>,
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    #[serde(default)]
    pub embedder: Option<EmbedderConfig>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            name: default_index_name(),
            api_key_env: default_index_api_key_env(),
            searchable_attributes: default_searchable_attributes(),
            filterable_attributes: default_filterable_attributes(),
            task_timeout_secs: default_task_timeout_secs(),
            embedder: None,
        }
    }
}

impl IndexConfig {
    /// The index API key, if the named variable is set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        read_secret(&self.api_key_env)
    }
}

fn default_index_url() -> String {
    "http://localhost:7700".to_string()
}
fn default_index_name() -> String {
    "pdf_chunks".to_string()
}
fn default_index_api_key_env() -> String {
    "MEILISEARCH_API_KEY".to_string()
}
fn default_searchable_attributes() -> Vec<String> {
    vec!["chunk_text".to_string(), "title".to_string()]
}
fn default_filterable_attributes() -> Vec<String> {
    ["doc_id", "page", "element_type", "source_file"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_task_timeout_secs() -> u64 {
    600
}

/// REST embedder the index should use to vectorize chunks on its side.
#[derive(Debug, Deserialize, Clone)]
pub struct EmbedderConfig {
    #[serde(default = "default_embedder_name")]
    pub name: String,
    #[serde(default = "default_embedder_url")]
    pub url: String,
    #[serde(default = "default_embedder_model")]
    pub model: String,
    #[serde(default = "default_embedder_dimensions")]
    pub dimensions: usize,
    #[serde(default = "default_embedder_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_document_template")]
    pub document_template: String,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            name: default_embedder_name(),
            url: default_embedder_url(),
            model: default_embedder_model(),
            dimensions: default_embedder_dimensions(),
            api_key_env: default_embedder_api_key_env(),
            document_template: default_document_template(),
        }
    }
}

impl EmbedderConfig {
    pub fn api_key(&self) -> Option<String> {
        read_secret(&self.api_key_env)
    }
}

fn default_embedder_name() -> String {
    "mistral".to_string()
}
fn default_embedder_url() -> String {
    "https://api.mistral.ai/v1/embeddings".to_string()
}
fn default_embedder_model() -> String {
    "mistral-embed".to_string()
}
fn default_embedder_dimensions() -> usize {
    1024
}
fn default_embedder_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}
fn default_document_template() -> String {
    "{% if doc.title %}Section: {{ doc.title }}. {% endif %}\
     {% if doc.chunk_text %}{{ doc.chunk_text | truncatewords: 50 }}{% endif %}"
        .to_string()
}

fn read_secret(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Apply the environment overrides listed in the module docs.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(read_secret);
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DOCLING_URL") {
            self.conversion.url = url;
        }
        if let Some(url) = lookup("MEILISEARCH_URL") {
            self.index.url = url;
        }
        if let Some(name) = lookup("PDFCHUNK_INDEX") {
            self.index.name = name;
        }
        if self.index.embedder.is_none() && lookup(&default_embedder_api_key_env()).is_some() {
            self.index.embedder = Some(EmbedderConfig::default());
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking
            .options()
            .validate()
            .context("invalid [chunking] section")?;

        if self.conversion.timeout_secs == 0 {
            bail!("conversion.timeout_secs must be > 0");
        }
        if self.conversion.backend == ConverterBackend::Docling && self.conversion.url.is_empty() {
            bail!("conversion.url must be set for the docling backend");
        }

        if self.index.url.is_empty() {
            bail!("index.url must not be empty");
        }
        if self.index.name.is_empty() {
            bail!("index.name must not be empty");
        }
        if self.index.task_timeout_secs == 0 {
            bail!("index.task_timeout_secs must be > 0");
        }
        if let Some(embedder) = &self.index.embedder {
            if embedder.dimensions == 0 {
                bail!("index.embedder.dimensions must be > 0");
            }
        }

        Ok(())
    }
}

/// Parse and validate TOML configuration text. Does not read the
/// environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist, then apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.chunking.options(), ChunkOptions::default());
        assert_eq!(config.conversion.backend, ConverterBackend::Docling);
        assert_eq!(config.conversion.url, "http://localhost:5001");
        assert_eq!(config.index.name, "pdf_chunks");
        assert_eq!(config.index.searchable_attributes, ["chunk_text", "title"]);
        assert_eq!(
            config.index.filterable_attributes,
            ["doc_id", "page", "element_type", "source_file"]
        );
        assert!(config.index.embedder.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
[chunking]
max_chars = 800

[conversion]
backend = "local"

[index.embedder]
model = "mistral-embed-2"
"#,
        )
        .unwrap();
        assert_eq!(config.chunking.max_chars, 800);
        assert_eq!(config.chunking.overlap_chars, 120);
        assert!(config.chunking.split_on_headers);
        assert_eq!(config.conversion.backend, ConverterBackend::Local);
        let embedder = config.index.embedder.unwrap();
        assert_eq!(embedder.model, "mistral-embed-2");
        assert_eq!(embedder.name, "mistral");
        assert_eq!(embedder.dimensions, 1024);
    }

    #[test]
    fn test_rejects_overlap_not_below_max() {
        let err = parse_config("[chunking]\nmax_chars = 100\noverlap_chars = 100\n").unwrap_err();
        assert!(format!("{:#}", err).contains("overlap_chars"));
    }

    #[test]
    fn test_rejects_zero_max_chars() {
        assert!(parse_config("[chunking]\nmax_chars = 0\noverlap_chars = 0\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(parse_config("[conversion]\nbackend = \"ocr\"\n").is_err());
    }

    #[test]
    fn test_rejects_empty_index_name() {
        assert!(parse_config("[index]\nname = \"\"\n").is_err());
    }

    fn lookup(vars: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[
            ("DOCLING_URL", "http://docling:5001"),
            ("MEILISEARCH_URL", "http://meili:7700"),
            ("PDFCHUNK_INDEX", "manuals"),
        ]));
        assert_eq!(config.conversion.url, "http://docling:5001");
        assert_eq!(config.index.url, "http://meili:7700");
        assert_eq!(config.index.name, "manuals");
        assert!(config.index.embedder.is_none());
    }

    #[test]
    fn test_meilisearch_index_var_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[("MEILISEARCH_INDEX", "documents")]));
        assert_eq!(config.index.name, "pdf_chunks");
    }

    #[test]
    fn test_mistral_key_enables_default_embedder() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[("MISTRAL_API_KEY", "k")]));
        let embedder = config.index.embedder.unwrap();
        assert_eq!(embedder.name, "mistral");
        assert_eq!(embedder.model, "mistral-embed");
        assert_eq!(embedder.dimensions, 1024);
    }

    #[test]
    fn test_configured_embedder_is_kept() {
        let mut config = parse_config(r#"[index.embedder]
name = "custom"
"#).unwrap();
        config.apply_overrides_from(lookup(&[("MISTRAL_API_KEY", "k")]));
        assert_eq!(config.index.embedder.unwrap().name, "custom");
    }

    #[test]
    fn test_example_config_parses() {
        let config = parse_config(include_str!("../config/pdfchunk.example.toml")).unwrap();
        assert_eq!(config.chunking.options(), ChunkOptions::default());
        assert_eq!(config.index.task_timeout_secs, 600);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.chunking.max_chars, 1200);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[chunking\nmax_chars = ").unwrap();
        assert!(load_config(&path).is_err());
    }
}
