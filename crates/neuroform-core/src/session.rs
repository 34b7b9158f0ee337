//! Session document model and the remote/local store contracts.
//!
//! A session is owned by the remote store and identified by an opaque token.
//! The client holds only a cached copy of the id, persisted locally so it
//! survives a reload; the server may recycle the id at any time, in which
//! case responses carry a replacement to adopt.

use crate::error::Result;
use crate::value::FieldValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// Opaque session token minted by the remote store.
pub type SessionId = String;

/// One section's current values, keyed by field name.
pub type SectionValues = HashMap<String, FieldValue>;

/// The full server-held session document.
///
/// Sections are untyped on the wire; `session_id`, when present in a
/// response body, signals a replacement id the client must adopt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    #[serde(flatten)]
    pub sections: HashMap<String, serde_json::Value>,
}

impl SessionDocument {
    /// Projects one section to its scalar field values.
    ///
    /// Missing and `null` sections yield an empty mapping; nested entries
    /// (server-computed aggregates) are dropped.
    pub fn scalar_values(&self, section: &str) -> SectionValues {
        let Some(serde_json::Value::Object(map)) = self.sections.get(section) else {
            return SectionValues::new();
        };

        map.iter()
            .filter_map(|(name, value)| {
                FieldValue::from_json(value).map(|v| (name.clone(), v))
            })
            .collect()
    }
}

/// The remote session store.
///
/// Implementations resolve the session id through a [`SessionIdStore`],
/// creating a session lazily when none is cached. No call is retried here;
/// retry policy belongs to the sync layer.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Requests a new session and persists its id before returning it.
    ///
    /// # Errors
    ///
    /// `RemoteUnavailable` when the transport fails, `SessionUnreachable`
    /// on a non-success status.
    async fn create(&self) -> Result<SessionId>;

    /// Fetches the full session document, creating a session first when no
    /// id is cached. A replacement id in the body is adopted as a side
    /// effect before the document is returned.
    async fn load(&self) -> Result<SessionDocument>;

    /// Partially updates one section server-side.
    ///
    /// Returns the replacement id when the server signals one; the caller
    /// is responsible for adopting it.
    async fn patch(&self, section: &str, values: &SectionValues) -> Result<Option<SessionId>>;
}

/// Durable client-local storage for the cached session id.
///
/// `set_cached_id` is idempotent and the sole mutator of the persisted id.
pub trait SessionIdStore: Send + Sync {
    fn cached_id(&self) -> Result<Option<SessionId>>;

    fn set_cached_id(&self, id: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// In-memory [`SessionIdStore`] for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemorySessionIdStore {
    id: RwLock<Option<SessionId>>,
}

impl MemorySessionIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<SessionId>) -> Self {
        Self {
            id: RwLock::new(Some(id.into())),
        }
    }
}

impl SessionIdStore for MemorySessionIdStore {
    fn cached_id(&self) -> Result<Option<SessionId>> {
        Ok(self.id.read().expect("id lock poisoned").clone())
    }

    fn set_cached_id(&self, id: &str) -> Result<()> {
        *self.id.write().expect("id lock poisoned") = Some(id.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.id.write().expect("id lock poisoned") = None;
        Ok(())
    }
}
