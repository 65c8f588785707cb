//! Search-index loader.
//!
//! The index is an external collaborator that stores [`ChunkRecord`]s and
//! does its own embedding and ranking. [`ChunkIndex`] is the only surface
//! the pipeline depends on; [`MeilisearchIndex`] implements it over the
//! Meilisearch HTTP API.
//!
//! # Load sequence
//!
//! 1. `PATCH /indexes/{name}/settings` with searchable and filterable
//!    attributes (plus the REST embedder, when configured).
//! 2. `POST /indexes/{name}/documents?primaryKey=id` with the records.
//!
//! Both calls are asynchronous on the Meilisearch side and return a task
//! uid; each task is polled on `GET /tasks/{uid}` until it settles. Failed
//! requests are not retried.
//!
//! # Search
//!
//! `POST /indexes/{name}/search` with `q` and `limit`. Semantic and hybrid
//! modes add a `hybrid` block naming the configured embedder; keyword mode
//! sends none.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use pdf_chunker_core::ChunkRecord;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::config::IndexConfig;

/// Fields returned for each search hit.
const RETRIEVED_ATTRIBUTES: [&str; 5] = ["id", "title", "chunk_text", "page", "source_file"];

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A destination for projected chunk records.
#[async_trait]
pub trait ChunkIndex: Send + Sync {
    /// Index name for logs.
    fn name(&self) -> &str;

    /// Store `records`, replacing documents with the same `id`.
    async fn ingest(&self, records: &[ChunkRecord]) -> Result<()>;

    /// Query the stored records, best match first.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;

    /// Whether the index service currently answers.
    async fn health(&self) -> Result<bool>;
}

/// How a query is matched against the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchMode {
    /// Full-text ranking only.
    Keyword,
    /// Vector similarity only (`semanticRatio` 1.0).
    Semantic,
    /// Weighted mix of full-text and vector ranking.
    Hybrid,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    pub mode: SearchMode,
    /// Share of the vector ranking in hybrid mode, `0.0..=1.0`.
    pub semantic_ratio: f64,
}

/// One record returned by a search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chunk_text: String,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub source_file: String,
    #[serde(rename = "_rankingScore", default)]
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// Meilisearch-backed [`ChunkIndex`].
pub struct MeilisearchIndex {
    base_url: String,
    index: String,
    api_key: Option<String>,
    config: IndexConfig,
    task_timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct EnqueuedTask {
    #[serde(rename = "taskUid")]
    task_uid: u64,
}

#[derive(Debug, Deserialize)]
struct TaskView {
    status: String,
    #[serde(default)]
    error: Option<TaskError>,
}

#[derive(Debug, Deserialize)]
struct TaskError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl MeilisearchIndex {
    /// Create a client from configuration.
    ///
    /// The embedder key is only needed to load documents, so it is checked by
    /// [`MeilisearchIndex::settings`] rather than here.
    pub fn new(config: &IndexConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            index: config.name.clone(),
            api_key: config.api_key(),
            config: config.clone(),
            task_timeout: Duration::from_secs(config.task_timeout_secs),
            client,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    async fn enqueue(&self, builder: reqwest::RequestBuilder, what: &str) -> Result<u64> {
        let resp = builder
            .send()
            .await
            .with_context(|| format!("Meilisearch {} request failed", what))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Meilisearch {} error {}: {}", what, status, body);
        }
        let task: EnqueuedTask = resp
            .json()
            .await
            .with_context(|| format!("Invalid Meilisearch {} response", what))?;
        Ok(task.task_uid)
    }

    /// Settings payload for this index; fails if the embedder key is missing.
    pub fn settings(&self) -> Result<Value> {
        settings_body(&self.config)
    }

    pub async fn update_settings(&self) -> Result<u64> {
        let settings = self.settings()?;
        let builder = self
            .request(reqwest::Method::PATCH, &format!("/indexes/{}/settings", self.index))
            .json(&settings);
        self.enqueue(builder, "settings").await
    }

    pub async fn add_documents(&self, records: &[ChunkRecord]) -> Result<u64> {
        let builder = self
            .request(
                reqwest::Method::POST,
                &format!("/indexes/{}/documents?primaryKey=id", self.index),
            )
            .json(records);
        self.enqueue(builder, "documents").await
    }

    /// Poll a task until it succeeds, fails, or the configured timeout
    /// elapses.
    pub async fn wait_for_task(&self, task_uid: u64) -> Result<()> {
        let started = Instant::now();
        loop {
            let resp = self
                .request(reqwest::Method::GET, &format!("/tasks/{}", task_uid))
                .send()
                .await
                .with_context(|| format!("Failed to poll Meilisearch task {}", task_uid))?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                bail!("Meilisearch task {} lookup error {}: {}", task_uid, status, body);
            }
            let task: TaskView = resp
                .json()
                .await
                .with_context(|| format!("Invalid Meilisearch task {} response", task_uid))?;

            match task.status.as_str() {
                "succeeded" => return Ok(()),
                "failed" | "canceled" => {
                    let detail = task
                        .error
                        .map(|e| match e.code {
                            Some(code) => format!("{} ({})", e.message, code),
                            None => e.message,
                        })
                        .unwrap_or_else(|| "no error detail".to_string());
                    bail!("Meilisearch task {} {}: {}", task_uid, task.status, detail);
                }
                _ => {}
            }

            if started.elapsed() >= self.task_timeout {
                bail!(
                    "Meilisearch task {} still '{}' after {}s",
                    task_uid,
                    task.status,
                    self.task_timeout.as_secs()
                );
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl ChunkIndex for MeilisearchIndex {
    fn name(&self) -> &str {
        &self.index
    }

    async fn ingest(&self, records: &[ChunkRecord]) -> Result<()> {
        if records.is_empty() {
            tracing::info!(target: "load_meilisearch", index = %self.index, "no records to load");
            return Ok(());
        }

        if self.config.embedder.is_none() {
            tracing::warn!(
                target: "load_meilisearch",
                index = %self.index,
                "no [index.embedder] configured; semantic and hybrid search will return nothing"
            );
        }

        let started = Instant::now();
        tracing::info!(target: "load_meilisearch", index = %self.index, "updating index settings");
        let task = self.update_settings().await?;
        self.wait_for_task(task).await?;
        tracing::info!(
            target: "load_meilisearch",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "settings applied"
        );

        let started = Instant::now();
        tracing::info!(target: "load_meilisearch", records = records.len(), "adding documents");
        let task = self.add_documents(records).await?;
        self.wait_for_task(task).await?;
        tracing::info!(
            target: "load_meilisearch",
            elapsed_ms = started.elapsed().as_millis() as u64,
            "documents indexed"
        );
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let embedder = self.config.embedder.as_ref().map(|e| e.name.as_str());
        let body = search_body(request, embedder)?;

        let resp = self
            .request(reqwest::Method::POST, &format!("/indexes/{}/search", self.index))
            .json(&body)
            .send()
            .await
            .context("Meilisearch search request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Meilisearch search error {}: {}", status, body);
        }
        let results: SearchResponse = resp
            .json()
            .await
            .context("Invalid Meilisearch search response")?;

        tracing::debug!(
            target: "search",
            mode = request.mode.as_str(),
            hits = results.hits.len(),
            "search finished"
        );
        Ok(results.hits)
    }

    async fn health(&self) -> Result<bool> {
        let resp = self.request(reqwest::Method::GET, "/health").send().await?;
        Ok(resp.status().is_success())
    }
}

/// Build the settings payload applied before loading documents.
pub fn settings_body(config: &IndexConfig) -> Result<Value> {
    let mut settings = json!({
        "searchableAttributes": config.searchable_attributes,
        "filterableAttributes": config.filterable_attributes,
    });

    if let Some(embedder) = &config.embedder {
        let api_key = embedder.api_key().ok_or_else(|| {
            anyhow!(
                "{} is not set (required by index.embedder '{}')",
                embedder.api_key_env,
                embedder.name
            )
        })?;
        let rest = json!({
            "source": "rest",
            "apiKey": api_key,
            "dimensions": embedder.dimensions,
            "documentTemplate": embedder.document_template,
            "url": embedder.url,
            "request": {
                "model": embedder.model,
                "input": ["{{text}}", "{{..}}"],
            },
            "response": {
                "data": [{"embedding": "{{embedding}}"}, "{{..}}"],
            },
        });
        let mut embedders = serde_json::Map::new();
        embedders.insert(embedder.name.clone(), rest);
        settings["embedders"] = Value::Object(embedders);
    }

    Ok(settings)
}

/// Build the search payload for `request`.
///
/// Semantic and hybrid modes need the name of the embedder the index was
/// configured with.
pub fn search_body(request: &SearchRequest, embedder: Option<&str>) -> Result<Value> {
    if request.limit == 0 {
        bail!("search limit must be > 0");
    }

    let mut body = json!({
        "q": request.query,
        "limit": request.limit,
        "attributesToRetrieve": RETRIEVED_ATTRIBUTES,
        "showRankingScore": true,
    });

    let ratio = match request.mode {
        SearchMode::Keyword => return Ok(body),
        SearchMode::Semantic => 1.0,
        SearchMode::Hybrid => request.semantic_ratio,
    };
    if !(0.0..=1.0).contains(&ratio) {
        bail!("semantic ratio must be between 0.0 and 1.0 (got {})", ratio);
    }
    let embedder = embedder.ok_or_else(|| {
        anyhow!(
            "Mode '{}' requires an embedder. Set [index.embedder] in config.",
            request.mode.as_str()
        )
    })?;
    body["hybrid"] = json!({"semanticRatio": ratio, "embedder": embedder});
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbedderConfig;

    fn request(mode: SearchMode) -> SearchRequest {
        SearchRequest {
            query: "seal replacement".to_string(),
            limit: 5,
            mode,
            semantic_ratio: 0.5,
        }
    }

    #[test]
    fn test_keyword_search_body() {
        let body = search_body(&request(SearchMode::Keyword), Some("mistral")).unwrap();
        assert_eq!(body["q"], "seal replacement");
        assert_eq!(body["limit"], 5);
        assert_eq!(
            body["attributesToRetrieve"],
            json!(["id", "title", "chunk_text", "page", "source_file"])
        );
        assert!(body.get("hybrid").is_none());
    }

    #[test]
    fn test_hybrid_and_semantic_search_body() {
        let body = search_body(&request(SearchMode::Hybrid), Some("mistral")).unwrap();
        assert_eq!(body["hybrid"], json!({"semanticRatio": 0.5, "embedder": "mistral"}));

        let body = search_body(&request(SearchMode::Semantic), Some("mistral")).unwrap();
        assert_eq!(body["hybrid"]["semanticRatio"], 1.0);
    }

    #[test]
    fn test_vector_modes_require_embedder() {
        let err = search_body(&request(SearchMode::Hybrid), None).unwrap_err();
        assert!(err.to_string().contains("requires an embedder"));
        assert!(search_body(&request(SearchMode::Keyword), None).is_ok());
    }

    #[test]
    fn test_rejects_bad_ratio_and_limit() {
        let mut req = request(SearchMode::Hybrid);
        req.semantic_ratio = 1.5;
        assert!(search_body(&req, Some("mistral")).is_err());

        let mut req = request(SearchMode::Keyword);
        req.limit = 0;
        assert!(search_body(&req, None).is_err());
    }

    #[test]
    fn test_new_does_not_need_embedder_key() {
        let config = IndexConfig {
            embedder: Some(EmbedderConfig {
                api_key_env: "PDFCHUNK_TEST_SEARCH_ONLY_KEY_ABSENT".to_string(),
                ..EmbedderConfig::default()
            }),
            ..IndexConfig::default()
        };
        let index = MeilisearchIndex::new(&config).unwrap();
        assert!(index.settings().is_err());
    }

    #[test]
    fn test_settings_without_embedder() {
        let settings = settings_body(&IndexConfig::default()).unwrap();
        assert_eq!(
            settings,
            json!({
                "searchableAttributes": ["chunk_text", "title"],
                "filterableAttributes": ["doc_id", "page", "element_type", "source_file"],
            })
        );
    }

    #[test]
    fn test_settings_with_embedder() {
        let var = "PDFCHUNK_TEST_EMBEDDER_KEY_PRESENT";
        std::env::set_var(var, "secret-key");
        let config = IndexConfig {
            embedder: Some(EmbedderConfig {
                name: "mistral".to_string(),
                url: "https://api.mistral.ai/v1/embeddings".to_string(),
                model: "mistral-embed".to_string(),
                dimensions: 1024,
                api_key_env: var.to_string(),
                document_template: "{{ doc.chunk_text }}".to_string(),
            }),
            ..IndexConfig::default()
        };

        let settings = settings_body(&config).unwrap();
        let embedder = &settings["embedders"]["mistral"];
        assert_eq!(embedder["source"], "rest");
        assert_eq!(embedder["apiKey"], "secret-key");
        assert_eq!(embedder["dimensions"], 1024);
        assert_eq!(embedder["request"]["model"], "mistral-embed");
        assert_eq!(embedder["request"]["input"], json!(["{{text}}", "{{..}}"]));
    }

    #[test]
    fn test_embedder_without_key_is_error() {
        let config = IndexConfig {
            embedder: Some(EmbedderConfig {
                name: "mistral".to_string(),
                url: "https://example.invalid".to_string(),
                model: "m".to_string(),
                dimensions: 8,
                api_key_env: "PDFCHUNK_TEST_EMBEDDER_KEY_ABSENT".to_string(),
                document_template: String::new(),
            }),
            ..IndexConfig::default()
        };
        let err = settings_body(&config).unwrap_err();
        assert!(err.to_string().contains("PDFCHUNK_TEST_EMBEDDER_KEY_ABSENT"));
    }
}
