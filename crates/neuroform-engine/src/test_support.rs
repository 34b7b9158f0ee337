//! Shared in-memory doubles for engine tests.

use async_trait::async_trait;
use neuroform_core::error::{NeuroformError, Result};
use neuroform_core::schema::{SchemaSource, SectionSchema};
use neuroform_core::session::{
    SectionValues, SessionDocument, SessionId, SessionStore,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// A `SessionStore` that behaves like the backend's in-memory session map
/// and records everything it is asked to do.
pub struct RecordingSessionStore {
    document: Mutex<SessionDocument>,
    patches: Mutex<Vec<(String, SectionValues)>>,
    attempts: AtomicUsize,
    replacement: Mutex<Option<SessionId>>,
    fail_patches: AtomicBool,
    fail_loads: AtomicBool,
    patch_delay: Mutex<Option<Duration>>,
    load_delay: Mutex<Option<Duration>>,
}

impl RecordingSessionStore {
    pub fn new() -> Self {
        Self {
            document: Mutex::new(SessionDocument::default()),
            patches: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            replacement: Mutex::new(None),
            fail_patches: AtomicBool::new(false),
            fail_loads: AtomicBool::new(false),
            patch_delay: Mutex::new(None),
            load_delay: Mutex::new(None),
        }
    }

    pub fn with_document(document: SessionDocument) -> Self {
        let store = Self::new();
        *store.document.lock().unwrap() = document;
        store
    }

    /// Recorded successful patches, oldest first.
    pub fn patches(&self) -> Vec<(String, SectionValues)> {
        self.patches.lock().unwrap().clone()
    }

    /// Patch attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn document(&self) -> SessionDocument {
        self.document.lock().unwrap().clone()
    }

    /// The next successful patch will answer with this replacement id.
    pub fn set_replacement(&self, id: &str) {
        *self.replacement.lock().unwrap() = Some(id.to_string());
    }

    pub fn fail_patches(&self, fail: bool) {
        self.fail_patches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn set_patch_delay(&self, delay: Duration) {
        *self.patch_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl SessionStore for RecordingSessionStore {
    async fn create(&self) -> Result<SessionId> {
        Ok("test-session".to_string())
    }

    async fn load(&self) -> Result<SessionDocument> {
        let delay = *self.load_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(NeuroformError::remote_unavailable("injected load failure"));
        }

        Ok(self.document.lock().unwrap().clone())
    }

    async fn patch(&self, section: &str, values: &SectionValues) -> Result<Option<SessionId>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let delay = *self.patch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_patches.load(Ordering::SeqCst) {
            return Err(NeuroformError::remote_unavailable("injected patch failure"));
        }

        self.patches
            .lock()
            .unwrap()
            .push((section.to_string(), values.clone()));

        // The backend replaces the whole section with the payload.
        self.document.lock().unwrap().sections.insert(
            section.to_string(),
            serde_json::to_value(values).expect("section values encode"),
        );

        Ok(self.replacement.lock().unwrap().take())
    }
}

/// A `SchemaSource` serving fixed documents.
pub struct StaticSchemaSource {
    schemas: HashMap<String, SectionSchema>,
    fail: AtomicBool,
}

impl StaticSchemaSource {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
            fail: AtomicBool::new(false),
        }
    }

    pub fn with_schema(mut self, section: &str, schema: serde_json::Value) -> Self {
        self.schemas.insert(
            section.to_string(),
            serde_json::from_value(schema).expect("schema fixture"),
        );
        self
    }

    pub fn failing() -> Self {
        let source = Self::new();
        source.fail.store(true, Ordering::SeqCst);
        source
    }
}

#[async_trait]
impl SchemaSource for StaticSchemaSource {
    async fn fetch(&self, section: &str) -> Result<SectionSchema> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NeuroformError::schema_unavailable(
                section,
                "injected schema failure",
            ));
        }

        self.schemas
            .get(section)
            .cloned()
            .ok_or_else(|| NeuroformError::schema_unavailable(section, "no such fixture"))
    }
}

/// The filter section schema as the backend serves it, trimmed to the
/// fields the tests touch.
pub fn filter_schema() -> serde_json::Value {
    serde_json::json!({
        "title": "FilterParams",
        "properties": {
            "l_freq": {"ui": "number", "group": "filter", "default": 4.0, "unit": "Hz"},
            "h_freq": {"ui": "number", "group": "filter", "default": 30.0, "unit": "Hz"},
            "notch": {"ui": "number", "group": "filter", "default": null, "placeholder": "60.0"},
            "channels": {"ui": "text", "group": "channels", "default": "69-76,81-83,88,89"},
            "interpolate": {"ui": "checkbox", "group": "cleaning", "default": false}
        }
    })
}

pub fn epochs_schema() -> serde_json::Value {
    serde_json::json!({
        "title": "EpochParams",
        "properties": {
            "tmin": {"ui": "number", "group": "epochs", "default": -2.0, "unit": "sec"},
            "tmax": {"ui": "number", "group": "epochs", "default": 0.0, "unit": "sec"},
            "stimulus": {
                "ui": "list",
                "group": "epochs",
                "default": "None",
                "options": ["None", "open", "close"]
            }
        }
    })
}
