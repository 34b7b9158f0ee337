//! Cached schema reads from the backend's `/schemas` endpoints.

use async_trait::async_trait;
use neuroform_core::error::{NeuroformError, Result};
use neuroform_core::schema::{SchemaSource, SectionSchema};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches and memoizes section schemas.
///
/// Schemas are immutable for the process lifetime, so each distinct section
/// name costs one network call. Two concurrent first fetches of the same
/// section may race; the last insert wins, which is harmless for identical
/// documents.
pub struct SchemaCatalog {
    client: Client,
    base_url: String,
    cache: RwLock<HashMap<String, SectionSchema>>,
}

impl SchemaCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn fetch_remote(&self, section: &str) -> Result<SectionSchema> {
        let url = format!("{}/schemas/{}", self.base_url, section);
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| NeuroformError::schema_unavailable(section, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(NeuroformError::schema_unavailable(
                section,
                format!("status {}: {}", status, message),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| NeuroformError::schema_unavailable(section, e.to_string()))
    }
}

#[async_trait]
impl SchemaSource for SchemaCatalog {
    async fn fetch(&self, section: &str) -> Result<SectionSchema> {
        if let Some(schema) = self.cache.read().await.get(section) {
            return Ok(schema.clone());
        }

        let schema = self.fetch_remote(section).await?;
        tracing::debug!(
            "[SchemaCatalog] Fetched schema for section '{}' ({} properties)",
            section,
            schema.properties.len()
        );

        self.cache
            .write()
            .await
            .insert(section.to_string(), schema.clone());

        Ok(schema)
    }
}
