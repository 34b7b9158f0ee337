//! The reactive per-section edit cache.
//!
//! `FieldValueCache` is the object every input widget reads from and writes
//! to: hydration installs previously saved values once, user edits flow in
//! field-by-field afterwards, and each mutation is announced to subscribers
//! with a detached snapshot. Whether a change came from hydration or from an
//! edit is a structural fact (two different entry points), never a value
//! comparison — a user retyping the hydrated value is still an edit.

use crate::error::{NeuroformError, Result};
use crate::session::SectionValues;
use crate::value::FieldValue;
use std::collections::HashSet;
use std::sync::{Mutex, RwLock};
use tokio::sync::mpsc;

/// Where a cache change originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The one-time bulk install of previously saved values. Never echoed
    /// back to the remote store.
    Hydration,
    /// A genuine user edit, eligible for persistence.
    Edit,
}

/// A change notification carrying a stable snapshot.
///
/// The snapshot is detached at emission time, so a subscriber holds a value
/// that stays valid even while the cache keeps mutating.
#[derive(Debug, Clone)]
pub struct CacheChange {
    pub origin: ChangeOrigin,
    /// Monotonic per-cache change counter.
    pub revision: u64,
    pub snapshot: SectionValues,
}

#[derive(Debug, Default)]
struct Inner {
    values: SectionValues,
    touched: HashSet<String>,
    hydrated: bool,
    revision: u64,
}

/// Reactive mapping from field name to current edited value for one section.
pub struct FieldValueCache {
    section: String,
    inner: RwLock<Inner>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<CacheChange>>>,
}

impl FieldValueCache {
    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            inner: RwLock::new(Inner::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// Whether the one-time hydration has completed. Renderers must not
    /// build widgets off this cache before it has.
    pub fn is_hydrated(&self) -> bool {
        self.inner.read().expect("cache lock poisoned").hydrated
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.inner
            .read()
            .expect("cache lock poisoned")
            .values
            .get(name)
            .cloned()
    }

    /// Read-only copy of the current values; never aliases internal state.
    pub fn snapshot(&self) -> SectionValues {
        self.inner
            .read()
            .expect("cache lock poisoned")
            .values
            .clone()
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CacheChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .push(tx);
        rx
    }

    /// Installs the hydration result. Consumed at most once per cache
    /// instance; a second call is an error.
    ///
    /// Fields the user already touched are left alone — hydration resolving
    /// after a first edit must not clobber it. Emits exactly one
    /// `Hydration` notification regardless of how many fields it installs.
    pub fn hydrate(&self, values: SectionValues) -> Result<()> {
        let change = {
            let mut inner = self.inner.write().expect("cache lock poisoned");
            if inner.hydrated {
                return Err(NeuroformError::internal(format!(
                    "hydration already consumed for section '{}'",
                    self.section
                )));
            }

            for (name, value) in values {
                if !inner.touched.contains(&name) {
                    inner.values.insert(name, value);
                }
            }
            inner.hydrated = true;
            inner.revision += 1;

            CacheChange {
                origin: ChangeOrigin::Hydration,
                revision: inner.revision,
                snapshot: inner.values.clone(),
            }
        };

        self.notify(change);
        Ok(())
    }

    /// Merges one field edit.
    ///
    /// The empty-string sentinel is normalized to `Null` before storage, so
    /// "cleared" and "never set" are indistinguishable downstream.
    pub fn set_field(&self, name: &str, value: FieldValue) {
        let change = {
            let mut inner = self.inner.write().expect("cache lock poisoned");
            inner.values.insert(name.to_string(), value.normalized());
            inner.touched.insert(name.to_string());
            inner.revision += 1;

            CacheChange {
                origin: ChangeOrigin::Edit,
                revision: inner.revision,
                snapshot: inner.values.clone(),
            }
        };

        self.notify(change);
    }

    /// Drops all subscriptions. Used at section teardown so downstream
    /// consumers observe end-of-stream and release their timers.
    pub fn close(&self) {
        self.subscribers
            .lock()
            .expect("subscriber lock poisoned")
            .clear();
    }

    fn notify(&self, change: CacheChange) {
        let mut subscribers = self.subscribers.lock().expect("subscriber lock poisoned");
        subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}
