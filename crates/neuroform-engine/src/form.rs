//! Per-section form lifecycle and the per-action form workspace.
//!
//! `FormSession` owns everything one open section needs: the fetched schema,
//! the edit cache, the sync scheduler, and the one-time hydration of
//! previously saved values. `ActionForms` opens the set of sections an
//! action requires and tracks the active tab.

use crate::renderer::{FieldBinding, section_bindings};
use crate::scheduler::{SyncOptions, SyncScheduler};
use futures::future::try_join_all;
use neuroform_core::actions;
use neuroform_core::cache::FieldValueCache;
use neuroform_core::error::Result;
use neuroform_core::schema::{SchemaSource, SectionSchema};
use neuroform_core::session::{SessionIdStore, SessionStore};
use neuroform_core::value::FieldValue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The shared services a form session runs against.
#[derive(Clone)]
pub struct FormServices {
    pub sessions: Arc<dyn SessionStore>,
    pub ids: Arc<dyn SessionIdStore>,
    pub schemas: Arc<dyn SchemaSource>,
}

/// Outcome of the one-time hydration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationState {
    /// The load has not resolved yet.
    Pending,
    /// Saved values (possibly an empty mapping) were installed.
    Hydrated,
    /// The load failed; the section renders as absent. Edits are still
    /// accepted and sync normally.
    Failed,
}

/// One open schema section: edit surface plus background synchronization.
///
/// Opening returns immediately after the schema fetch; hydration resolves in
/// the background so a user can start typing before the load request
/// completes. The load result is consumed exactly once — values the user
/// already touched are never overwritten by it.
pub struct FormSession {
    section: String,
    schema: SectionSchema,
    cache: Arc<FieldValueCache>,
    hydration: watch::Receiver<HydrationState>,
    scheduler: SyncScheduler,
    hydrator: JoinHandle<()>,
}

impl std::fmt::Debug for FormSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSession")
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}

impl FormSession {
    /// Opens a section: fetches its schema, wires the sync scheduler, and
    /// starts hydration.
    ///
    /// # Errors
    ///
    /// Returns `SchemaUnavailable` when the schema cannot be fetched; the
    /// caller must treat that as "do not render this section yet".
    pub async fn open(
        section: impl Into<String>,
        services: FormServices,
        options: SyncOptions,
    ) -> Result<Self> {
        let section = section.into();
        let schema = services.schemas.fetch(&section).await?;

        let cache = Arc::new(FieldValueCache::new(section.clone()));
        let scheduler = SyncScheduler::spawn(
            section.clone(),
            cache.subscribe(),
            services.sessions.clone(),
            services.ids.clone(),
            options,
        );

        let (status_tx, hydration) = watch::channel(HydrationState::Pending);
        let hydrator = tokio::spawn(hydrate(
            section.clone(),
            cache.clone(),
            services.sessions.clone(),
            status_tx,
        ));

        Ok(Self {
            section,
            schema,
            cache,
            hydration,
            scheduler,
            hydrator,
        })
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn schema(&self) -> &SectionSchema {
        &self.schema
    }

    pub fn cache(&self) -> &Arc<FieldValueCache> {
        &self.cache
    }

    /// Records a user edit. Usable before hydration resolves.
    pub fn set_field(&self, name: &str, value: FieldValue) {
        self.cache.set_field(name, value);
    }

    pub fn hydration_state(&self) -> HydrationState {
        *self.hydration.borrow()
    }

    /// Waits until the hydration attempt has resolved, one way or the
    /// other.
    pub async fn hydrated(&self) -> HydrationState {
        let mut rx = self.hydration.clone();
        loop {
            let state = *rx.borrow();
            if state != HydrationState::Pending {
                return state;
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }

    /// Widget bindings for the given schema groups. Empty until hydration
    /// resolves with data.
    pub fn bindings(&self, groups: &[&str]) -> Vec<FieldBinding> {
        section_bindings(&self.schema, groups, &self.cache)
    }

    /// Tears the section down: the pending debounce (if any) is discarded,
    /// a patch already in flight completes first.
    pub async fn close(self) {
        self.hydrator.abort();
        self.cache.close();
        self.scheduler.join().await;
    }
}

async fn hydrate(
    section: String,
    cache: Arc<FieldValueCache>,
    sessions: Arc<dyn SessionStore>,
    status: watch::Sender<HydrationState>,
) {
    let state = match sessions.load().await {
        Ok(document) => {
            let values = document.scalar_values(&section);
            match cache.hydrate(values) {
                Ok(()) => HydrationState::Hydrated,
                Err(e) => {
                    tracing::warn!("[FormSession] {}: hydration rejected: {}", section, e);
                    HydrationState::Failed
                }
            }
        }
        Err(e) => {
            tracing::warn!(
                "[FormSession] {}: hydration failed, rendering section as absent: {}",
                section,
                e
            );
            HydrationState::Failed
        }
    };

    let _ = status.send(state);
}

/// The configuration surface for one selected action: every schema-backed
/// tab it requires, opened concurrently, plus active-tab tracking.
///
/// Reselecting an action re-derives the tab list and resets the active tab
/// to its head; a previous position is not preserved.
pub struct ActionForms {
    action: String,
    tabs: Vec<&'static str>,
    forms: HashMap<&'static str, FormSession>,
    active: Option<&'static str>,
}

impl ActionForms {
    /// Opens every schema-backed tab the action requires.
    ///
    /// An unknown action yields an empty surface: no tabs, no forms.
    pub async fn open(action: &str, services: FormServices, options: SyncOptions) -> Result<Self> {
        let tabs: Vec<&'static str> = actions::required_tabs(action).to_vec();

        let backed: Vec<(&'static str, &'static str)> = tabs
            .iter()
            .filter_map(|tab| actions::tab_spec(tab))
            .filter_map(|spec| spec.section.map(|section| (spec.name, section)))
            .collect();

        let sessions = try_join_all(
            backed
                .iter()
                .map(|(_, section)| FormSession::open(*section, services.clone(), options)),
        )
        .await?;

        let forms = backed
            .iter()
            .map(|(name, _)| *name)
            .zip(sessions)
            .collect();

        Ok(Self {
            action: action.to_string(),
            active: tabs.first().copied(),
            tabs,
            forms,
        })
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// All required tabs in configuration order, schema-backed or not.
    pub fn tabs(&self) -> &[&'static str] {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&'static str> {
        self.active
    }

    /// Activates a tab; returns false when the tab is not part of this
    /// action's surface.
    pub fn select_tab(&mut self, tab: &str) -> bool {
        match self.tabs.iter().copied().find(|t| *t == tab) {
            Some(found) => {
                self.active = Some(found);
                true
            }
            None => false,
        }
    }

    /// Resets the active tab to the head of the list.
    pub fn reset_active(&mut self) {
        self.active = self.tabs.first().copied();
    }

    /// The form behind a schema-backed tab.
    pub fn form(&self, tab: &str) -> Option<&FormSession> {
        self.forms.get(tab)
    }

    /// Closes every open form.
    pub async fn close(self) {
        for (_, form) in self.forms {
            form.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        RecordingSessionStore, StaticSchemaSource, epochs_schema, filter_schema,
    };
    use neuroform_core::session::{MemorySessionIdStore, SessionDocument, SessionStore};
    use std::time::Duration;
    use tokio::time::sleep;

    fn services(
        store: Arc<RecordingSessionStore>,
        schemas: StaticSchemaSource,
    ) -> FormServices {
        FormServices {
            sessions: store,
            ids: Arc::new(MemorySessionIdStore::new()),
            schemas: Arc::new(schemas),
        }
    }

    fn saved_document(json: serde_json::Value) -> SessionDocument {
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_hydrates_saved_values() {
        let store = Arc::new(RecordingSessionStore::with_document(saved_document(
            serde_json::json!({"filter": {"l_freq": 7.5}}),
        )));
        let schemas = StaticSchemaSource::new().with_schema("filter", filter_schema());

        let form = FormSession::open("filter", services(store, schemas), SyncOptions::default())
            .await
            .unwrap();

        assert_eq!(form.hydrated().await, HydrationState::Hydrated);
        assert_eq!(form.cache().get("l_freq"), Some(FieldValue::Number(7.5)));

        form.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_fails_without_schema() {
        let store = Arc::new(RecordingSessionStore::new());
        let err = FormSession::open(
            "filter",
            services(store, StaticSchemaSource::failing()),
            SyncOptions::default(),
        )
        .await
        .unwrap_err();

        assert!(err.is_schema_unavailable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_hydration_renders_absent_but_accepts_edits() {
        let store = Arc::new(RecordingSessionStore::new());
        store.fail_loads(true);
        let schemas = StaticSchemaSource::new().with_schema("filter", filter_schema());

        let form = FormSession::open(
            "filter",
            services(store.clone(), schemas),
            SyncOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(form.hydrated().await, HydrationState::Failed);
        assert!(form.bindings(&["filter"]).is_empty());

        // Edits still reach the store.
        form.set_field("l_freq", FieldValue::Number(2.0));
        sleep(Duration::from_millis(200)).await;
        assert_eq!(store.patches().len(), 1);

        form.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_racing_hydration_wins_for_its_field() {
        // Scenario D: the user sets tmax before the load resolves; the
        // resolved load carries tmin. Both must end up in the cache.
        let store = Arc::new(RecordingSessionStore::with_document(saved_document(
            serde_json::json!({"epochs": {"tmin": -0.2}}),
        )));
        store.set_load_delay(Duration::from_millis(250));
        let schemas = StaticSchemaSource::new().with_schema("epochs", epochs_schema());

        let form = FormSession::open(
            "epochs",
            services(store.clone(), schemas),
            SyncOptions::default(),
        )
        .await
        .unwrap();

        form.set_field("tmax", FieldValue::Number(0.8));
        assert_eq!(form.hydration_state(), HydrationState::Pending);

        assert_eq!(form.hydrated().await, HydrationState::Hydrated);
        assert_eq!(form.cache().get("tmin"), Some(FieldValue::Number(-0.2)));
        assert_eq!(form.cache().get("tmax"), Some(FieldValue::Number(0.8)));

        // Hydration resolving later produced no extra patch.
        let patches_after_hydration = store.patches().len();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(store.patches().len(), patches_after_hydration);

        form.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_lets_inflight_patch_finish() {
        let store = Arc::new(RecordingSessionStore::new());
        store.set_patch_delay(Duration::from_millis(300));
        let schemas = StaticSchemaSource::new().with_schema("filter", filter_schema());

        let form = FormSession::open(
            "filter",
            services(store.clone(), schemas),
            SyncOptions::default(),
        )
        .await
        .unwrap();
        form.hydrated().await;

        form.set_field("l_freq", FieldValue::Number(2.0));
        // Let the debounce fire so the request is in flight, then close.
        sleep(Duration::from_millis(150)).await;
        form.close().await;

        assert_eq!(store.patches().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_patch_is_idempotent_on_the_document() {
        let store = RecordingSessionStore::new();
        let mut values = neuroform_core::session::SectionValues::new();
        values.insert("l_freq".to_string(), FieldValue::Number(1.5));

        store.patch("filter", &values).await.unwrap();
        let after_once = store.document();

        store.patch("filter", &values).await.unwrap();
        let after_twice = store.document();

        assert_eq!(
            after_once.scalar_values("filter"),
            after_twice.scalar_values("filter")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_forms_open_schema_backed_tabs() {
        let store = Arc::new(RecordingSessionStore::new());
        let schemas = StaticSchemaSource::new()
            .with_schema("filter", filter_schema())
            .with_schema("epochs", epochs_schema());

        let forms = ActionForms::open(
            "Epoch Plot",
            services(store, schemas),
            SyncOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(forms.tabs(), &["Filtering and Cleaning", "Epochs"]);
        assert_eq!(forms.active_tab(), Some("Filtering and Cleaning"));
        assert!(forms.form("Filtering and Cleaning").is_some());
        assert!(forms.form("Epochs").is_some());

        forms.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_forms_tab_selection_resets_to_head() {
        let store = Arc::new(RecordingSessionStore::new());
        let schemas = StaticSchemaSource::new()
            .with_schema("filter", filter_schema())
            .with_schema("epochs", epochs_schema());

        let mut forms = ActionForms::open(
            "Epoch Plot",
            services(store, schemas),
            SyncOptions::default(),
        )
        .await
        .unwrap();

        assert!(forms.select_tab("Epochs"));
        assert_eq!(forms.active_tab(), Some("Epochs"));

        assert!(!forms.select_tab("Topomap"));
        assert_eq!(forms.active_tab(), Some("Epochs"));

        forms.reset_active();
        assert_eq!(forms.active_tab(), Some("Filtering and Cleaning"));

        forms.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_action_has_empty_surface() {
        let store = Arc::new(RecordingSessionStore::new());
        let schemas = StaticSchemaSource::new();

        let forms = ActionForms::open(
            "Spectrogram",
            services(store, schemas),
            SyncOptions::default(),
        )
        .await
        .unwrap();

        assert!(forms.tabs().is_empty());
        assert_eq!(forms.active_tab(), None);

        forms.close().await;
    }
}
