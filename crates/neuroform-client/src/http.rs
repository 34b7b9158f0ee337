//! HTTP implementation of the remote session store.

use crate::config::RemoteConfig;
use async_trait::async_trait;
use neuroform_core::error::{NeuroformError, Result};
use neuroform_core::session::{
    SectionValues, SessionDocument, SessionId, SessionIdStore, SessionStore,
};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Session store client talking to the backend's `/session` endpoints.
///
/// Owns resolution of the session id: every call reads the cached id first,
/// creates a session lazily when none exists, and writes replacement ids
/// back through the [`SessionIdStore`].
#[derive(Clone)]
pub struct HttpSessionStore {
    client: Client,
    base_url: String,
    id_store: Arc<dyn SessionIdStore>,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    session_id: SessionId,
}

#[derive(Debug, Default, Deserialize)]
struct PatchAck {
    #[serde(default)]
    session_id: Option<SessionId>,
}

impl HttpSessionStore {
    /// Creates a store against an explicit backend URL.
    pub fn new(base_url: impl Into<String>, id_store: Arc<dyn SessionIdStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            id_store,
        }
    }

    /// Creates a store from loaded configuration.
    pub fn from_config(config: &RemoteConfig, id_store: Arc<dyn SessionIdStore>) -> Self {
        Self::new(config.backend_url.clone(), id_store)
    }

    /// The id all outbound calls will use, creating a session when none is
    /// cached yet (first page load, or the cache was cleared).
    async fn ensure_session_id(&self) -> Result<SessionId> {
        if let Some(id) = self.id_store.cached_id()? {
            return Ok(id);
        }
        self.create().await
    }

    fn transport_error(err: reqwest::Error) -> NeuroformError {
        NeuroformError::remote_unavailable(err.to_string())
    }

    async fn status_error(response: reqwest::Response) -> NeuroformError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        NeuroformError::session_unreachable(status, message)
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn create(&self) -> Result<SessionId> {
        let url = format!("{}/session", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let created: SessionCreated = response
            .json()
            .await
            .map_err(|e| NeuroformError::Serialization {
                format: "JSON".to_string(),
                message: e.to_string(),
            })?;

        self.id_store.set_cached_id(&created.session_id)?;
        tracing::info!("[SessionStore] Created session {}", created.session_id);

        Ok(created.session_id)
    }

    async fn load(&self) -> Result<SessionDocument> {
        let sid = self.ensure_session_id().await?;
        let url = format!("{}/session/{}", self.base_url, sid);
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let document: SessionDocument =
            response
                .json()
                .await
                .map_err(|e| NeuroformError::Serialization {
                    format: "JSON".to_string(),
                    message: e.to_string(),
                })?;

        // Backend restart recovery: the body names the session we actually
        // got, which may not be the one we asked for.
        if let Some(new_id) = &document.session_id
            && *new_id != sid
        {
            self.id_store.set_cached_id(new_id)?;
            tracing::info!(
                "[SessionStore] Adopted replacement session id {} (was {})",
                new_id,
                sid
            );
        }

        Ok(document)
    }

    async fn patch(&self, section: &str, values: &SectionValues) -> Result<Option<SessionId>> {
        let sid = self.ensure_session_id().await?;
        let url = format!("{}/session/{}/{}", self.base_url, sid, section);
        let response = self
            .client
            .patch(&url)
            .json(values)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        // The ack body is loose: `{"ok": true}` normally, `{"session_id"}`
        // after a server-side restart. Anything unreadable means no
        // replacement.
        let ack: PatchAck = response.json().await.unwrap_or_default();

        Ok(ack.session_id.filter(|new_id| *new_id != sid))
    }
}
