//! PDF conversion: turn a PDF file into text the chunker can consume.
//!
//! Conversion is an external concern. The chunker only needs plain text
//! (ideally markdown, so headings survive), so backends sit behind the
//! [`DocumentConverter`] trait:
//!
//! - **[`DoclingConverter`]** posts the file to a docling-serve instance and
//!   reads back markdown with layout, tables, and headings.
//! - **[`LocalPdfConverter`]** extracts plain text in-process with
//!   `pdf-extract`. No service needed, but no heading structure either.
//!
//! Errors never panic; they surface as [`ConvertError`] and the caller
//! decides whether to abort.

use async_trait::async_trait;
use pdf_chunker_core::{ElementType, RawElement};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::{ConversionConfig, ConverterBackend};

pub const MIME_PDF: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("expected a PDF file, got {0}")]
    NotPdf(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("conversion service error: {0}")]
    Service(String),
}

/// Result of converting one file.
#[derive(Debug, Clone)]
pub struct ConvertedDocument {
    /// File stem, used as the document id.
    pub doc_id: String,
    /// File name, verbatim.
    pub source_file: String,
    pub elements: Vec<RawElement>,
}

impl ConvertedDocument {
    /// Full document text: element texts separated by blank lines.
    pub fn text(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A backend that converts a PDF file into raw elements.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Short backend name for logs (e.g. `"docling"`).
    fn name(&self) -> &str;

    async fn convert(&self, path: &Path) -> Result<ConvertedDocument, ConvertError>;

    /// Whether the backend can currently serve requests.
    async fn health(&self) -> Result<bool, ConvertError> {
        Ok(true)
    }
}

/// Document id for a file: its stem (`reports/q3.pdf` → `q3`).
pub fn doc_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// File name of `path`, verbatim.
pub fn source_file_for(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reject anything without a `.pdf` extension (case-insensitive).
pub fn ensure_pdf(path: &Path) -> Result<(), ConvertError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => Ok(()),
        Some(ext) => Err(ConvertError::NotPdf(format!(".{}", ext))),
        None => Err(ConvertError::NotPdf(path.display().to_string())),
    }
}

async fn read_pdf(path: &Path) -> Result<Vec<u8>, ConvertError> {
    ensure_pdf(path)?;
    tokio::fs::read(path).await.map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn single_element(path: &Path, text: String) -> ConvertedDocument {
    let source_file = source_file_for(path);
    ConvertedDocument {
        doc_id: doc_id_for(path),
        elements: vec![RawElement {
            text,
            page: None,
            element_type: ElementType::Text,
            source_file: source_file.clone(),
        }],
        source_file,
    }
}

// ============ Docling ============

/// Client for a docling-serve instance.
///
/// Calls `POST {url}/v1/convert/file` with the PDF as a multipart `files`
/// part and `to_formats=md`, and reads `document.md_content` from the
/// response.
pub struct DoclingConverter {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DoclingResponse {
    #[serde(default)]
    document: DoclingDocument,
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct DoclingDocument {
    #[serde(default)]
    md_content: Option<String>,
}

impl DoclingConverter {
    pub fn new(config: &ConversionConfig) -> Result<Self, ConvertError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConvertError::Service(e.to_string()))?;
        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn parse_response(body: &str) -> Result<String, ConvertError> {
        let resp: DoclingResponse = serde_json::from_str(body)
            .map_err(|e| ConvertError::Service(format!("invalid docling response: {}", e)))?;

        if matches!(resp.status.as_str(), "failure" | "skipped") {
            return Err(ConvertError::Service(format!(
                "docling reported status '{}': {}",
                resp.status,
                serde_json::Value::Array(resp.errors)
            )));
        }

        resp.document
            .md_content
            .ok_or_else(|| ConvertError::Service("docling response has no md_content".to_string()))
    }
}

#[async_trait]
impl DocumentConverter for DoclingConverter {
    fn name(&self) -> &str {
        "docling"
    }

    async fn convert(&self, path: &Path) -> Result<ConvertedDocument, ConvertError> {
        let bytes = read_pdf(path).await?;
        let size_kb = bytes.len() as f64 / 1024.0;
        tracing::info!(target: "parse_pdf", file = %source_file_for(path), size_kb, "converting PDF to markdown via docling");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(source_file_for(path))
            .mime_str(MIME_PDF)
            .map_err(|e| ConvertError::Service(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("to_formats", "md")
            .part("files", part);

        let resp = self
            .client
            .post(format!("{}/v1/convert/file", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ConvertError::Service(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ConvertError::Service(e.to_string()))?;
        if !status.is_success() {
            return Err(ConvertError::Service(format!("docling returned {}: {}", status, body)));
        }

        let markdown = Self::parse_response(&body)?;
        Ok(single_element(path, markdown))
    }

    async fn health(&self) -> Result<bool, ConvertError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ConvertError::Service(e.to_string()))?;
        Ok(resp.status().is_success())
    }
}

// ============ Local ============

/// In-process text extraction with `pdf-extract`.
pub struct LocalPdfConverter;

#[async_trait]
impl DocumentConverter for LocalPdfConverter {
    fn name(&self) -> &str {
        "local"
    }

    async fn convert(&self, path: &Path) -> Result<ConvertedDocument, ConvertError> {
        let bytes = read_pdf(path).await?;
        tracing::info!(target: "parse_pdf", file = %source_file_for(path), "extracting PDF text locally");

        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ConvertError::Pdf(e.to_string()))?
            .map_err(|e| ConvertError::Pdf(e.to_string()))?;

        Ok(single_element(path, text))
    }
}

/// Build the converter selected by `conversion.backend`.
pub fn create_converter(
    config: &ConversionConfig,
) -> Result<Box<dyn DocumentConverter>, ConvertError> {
    match config.backend {
        ConverterBackend::Docling => Ok(Box::new(DoclingConverter::new(config)?)),
        ConverterBackend::Local => Ok(Box::new(LocalPdfConverter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_and_source_file() {
        let path = Path::new("/data/reports/Q3 Report.v2.pdf");
        assert_eq!(doc_id_for(path), "Q3 Report.v2");
        assert_eq!(source_file_for(path), "Q3 Report.v2.pdf");
    }

    #[test]
    fn test_ensure_pdf() {
        assert!(ensure_pdf(Path::new("a.pdf")).is_ok());
        assert!(ensure_pdf(Path::new("A.PDF")).is_ok());
        assert!(matches!(
            ensure_pdf(Path::new("notes.txt")),
            Err(ConvertError::NotPdf(ext)) if ext == ".txt"
        ));
        assert!(matches!(ensure_pdf(Path::new("README")), Err(ConvertError::NotPdf(_))));
    }

    #[test]
    fn test_converted_text_joins_elements() {
        let element = |text: &str| RawElement {
            text: text.to_string(),
            page: Some(1),
            element_type: ElementType::Text,
            source_file: "a.pdf".to_string(),
        };
        let doc = ConvertedDocument {
            doc_id: "a".to_string(),
            source_file: "a.pdf".to_string(),
            elements: vec![element("first"), element("  "), element("second")],
        };
        assert_eq!(doc.text(), "first\n\nsecond");
    }

    #[test]
    fn test_parse_docling_response() {
        let body = r###"{"document": {"filename": "a.pdf", "md_content": "## Intro\nHi"}, "status": "success", "errors": []}"###;
        assert_eq!(DoclingConverter::parse_response(body).unwrap(), "## Intro\nHi");
    }

    #[test]
    fn test_parse_docling_failure() {
        let body = r#"{"document": {}, "status": "failure", "errors": [{"message": "bad pdf"}]}"#;
        let err = DoclingConverter::parse_response(body).unwrap_err();
        assert!(err.to_string().contains("bad pdf"));

        let body = r#"{"document": {"md_content": null}, "status": "success"}"#;
        assert!(DoclingConverter::parse_response(body).is_err());
    }

    #[tokio::test]
    async fn test_local_rejects_non_pdf() {
        let err = LocalPdfConverter.convert(Path::new("notes.md")).await.unwrap_err();
        assert!(matches!(err, ConvertError::NotPdf(_)));
    }

    #[tokio::test]
    async fn test_local_missing_file_is_io_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = LocalPdfConverter
            .convert(&tmp.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[tokio::test]
    async fn test_local_invalid_pdf_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = LocalPdfConverter.convert(&path).await.unwrap_err();
        assert!(matches!(err, ConvertError::Pdf(_)));
    }
}
