//! External service status for `pdfchunk check`.

use anyhow::Result;

use crate::config::{Config, ConverterBackend};
use crate::extract::create_converter;
use crate::index::{ChunkIndex, MeilisearchIndex};

/// Health of one collaborator the pipeline talks to.
#[derive(Debug, Clone)]
pub struct ServiceStatus {
    pub name: String,
    pub target: String,
    pub healthy: bool,
    pub notes: Option<String>,
}

/// Probe the configured converter and index.
///
/// Never fails: connection errors are reported as unhealthy with the error
/// text in `notes`.
pub async fn get_services(config: &Config) -> Vec<ServiceStatus> {
    let mut services = Vec::new();

    let converter_target = match config.conversion.backend {
        ConverterBackend::Docling => config.conversion.url.clone(),
        ConverterBackend::Local => "in-process".to_string(),
    };
    let converter = match create_converter(&config.conversion) {
        Ok(converter) => match converter.health().await {
            Ok(healthy) => ServiceStatus {
                name: format!("converter:{}", converter.name()),
                target: converter_target,
                healthy,
                notes: None,
            },
            Err(e) => ServiceStatus {
                name: format!("converter:{}", converter.name()),
                target: converter_target,
                healthy: false,
                notes: Some(e.to_string()),
            },
        },
        Err(e) => ServiceStatus {
            name: "converter".to_string(),
            target: converter_target,
            healthy: false,
            notes: Some(e.to_string()),
        },
    };
    services.push(converter);

    let index_name = format!("index:{}", config.index.name);
    let index = match MeilisearchIndex::new(&config.index) {
        Ok(index) => match index.health().await {
            Ok(healthy) => ServiceStatus {
                name: index_name,
                target: config.index.url.clone(),
                healthy,
                notes: None,
            },
            Err(e) => ServiceStatus {
                name: index_name,
                target: config.index.url.clone(),
                healthy: false,
                notes: Some(e.to_string()),
            },
        },
        Err(e) => ServiceStatus {
            name: index_name,
            target: config.index.url.clone(),
            healthy: false,
            notes: Some(format!("{:#}", e)),
        },
    };
    services.push(index);

    services
}

pub async fn list_services(config: &Config) -> Result<()> {
    let services = get_services(config).await;

    println!("{:<24} {:<32} {:<8} NOTES", "SERVICE", "TARGET", "HEALTHY");
    for s in &services {
        println!(
            "{:<24} {:<32} {:<8} {}",
            s.name,
            s.target,
            s.healthy,
            s.notes.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_backend_is_always_healthy() {
        let mut config = Config::default();
        config.conversion.backend = ConverterBackend::Local;
        // Nothing listens on port 9; the index probe must fail without erroring.
        config.index.url = "http://127.0.0.1:9".to_string();

        let services = get_services(&config).await;
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "converter:local");
        assert!(services[0].healthy);
        assert_eq!(services[1].name, "index:pdf_chunks");
        assert!(!services[1].healthy);
        assert!(services[1].notes.is_some());
    }
}
