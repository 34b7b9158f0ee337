//! Debounced write-through synchronization of cache edits to the remote
//! session store.
//!
//! One scheduler serves one (session, section) pair. It turns the cache's
//! change stream into a correctly-ordered, coalesced, loop-free sequence of
//! remote patches:
//!
//! - an edit arms (or re-arms) a debounce timer; only the latest snapshot at
//!   the moment the timer fires is ever sent;
//! - hydration changes never arm the timer, so the values loaded from the
//!   server are not echoed back to it;
//! - at most one patch request is in flight at a time; edits arriving while
//!   a request is outstanding queue up and re-arm the timer afterwards;
//! - a failed patch is logged and dropped. The next edit resends the full
//!   latest snapshot, which heals the loss; a section closed after a failed
//!   patch with no further edits is an accepted data-loss window.

use neuroform_core::cache::{CacheChange, ChangeOrigin};
use neuroform_core::session::{SectionValues, SessionIdStore, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Tuning for the sync scheduler.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Quiet interval after the last edit before a write goes out.
    pub debounce: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
        }
    }
}

enum Wake {
    Change(Option<CacheChange>),
    Deadline,
}

/// Handle to a spawned per-section sync task.
///
/// The task ends when the cache closes its change stream; a debounce timer
/// pending at that point is discarded, while a patch already in flight runs
/// to completion.
pub struct SyncScheduler {
    handle: JoinHandle<()>,
}

impl SyncScheduler {
    /// Spawns the sync task for `section`, consuming one cache
    /// subscription.
    pub fn spawn(
        section: impl Into<String>,
        changes: mpsc::UnboundedReceiver<CacheChange>,
        sessions: Arc<dyn SessionStore>,
        ids: Arc<dyn SessionIdStore>,
        options: SyncOptions,
    ) -> Self {
        let section = section.into();
        let handle = tokio::spawn(run(section, changes, sessions, ids, options));
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the task to finish. Call after closing the cache to get a
    /// deterministic teardown.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

async fn run(
    section: String,
    mut changes: mpsc::UnboundedReceiver<CacheChange>,
    sessions: Arc<dyn SessionStore>,
    ids: Arc<dyn SessionIdStore>,
    options: SyncOptions,
) {
    let mut pending: Option<SectionValues> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let wake = match deadline {
            Some(at) => tokio::select! {
                change = changes.recv() => Wake::Change(change),
                _ = tokio::time::sleep_until(at) => Wake::Deadline,
            },
            None => Wake::Change(changes.recv().await),
        };

        match wake {
            Wake::Change(Some(change)) => match change.origin {
                ChangeOrigin::Hydration => {
                    // Hydration already matches the server; echoing it back
                    // would start a patch-then-reload loop.
                    tracing::trace!(
                        "[SyncScheduler] {}: hydration change rev={} not scheduled",
                        section,
                        change.revision
                    );
                }
                ChangeOrigin::Edit => {
                    pending = Some(change.snapshot);
                    deadline = Some(Instant::now() + options.debounce);
                }
            },
            Wake::Change(None) => {
                if pending.is_some() {
                    tracing::debug!(
                        "[SyncScheduler] {}: section closed, discarding pending snapshot",
                        section
                    );
                }
                break;
            }
            Wake::Deadline => {
                deadline = None;
                if let Some(snapshot) = pending.take() {
                    // Awaited inline: nothing else is processed while the
                    // request is outstanding, so at most one is in flight
                    // and queued edits re-arm the timer afterwards.
                    push(&section, snapshot, sessions.as_ref(), ids.as_ref()).await;
                }
            }
        }
    }
}

async fn push(
    section: &str,
    snapshot: SectionValues,
    sessions: &dyn SessionStore,
    ids: &dyn SessionIdStore,
) {
    match sessions.patch(section, &snapshot).await {
        Ok(Some(new_id)) => {
            // The server recycled the session. The patch just sent counts
            // as applied to the new session and is not resent; everything
            // after this uses the adopted id.
            match ids.set_cached_id(&new_id) {
                Ok(()) => tracing::info!(
                    "[SyncScheduler] {}: adopted replacement session id {}",
                    section,
                    new_id
                ),
                Err(e) => tracing::warn!(
                    "[SyncScheduler] {}: failed to persist replacement session id: {}",
                    section,
                    e
                ),
            }
        }
        Ok(None) => {
            tracing::debug!(
                "[SyncScheduler] {}: synced {} fields",
                section,
                snapshot.len()
            );
        }
        Err(e) => {
            // At-most-once delivery: the next edit carries the full latest
            // snapshot, so one lost patch heals itself.
            tracing::warn!(
                "[SyncScheduler] {}: patch failed, dropping snapshot: {}",
                section,
                e
            );
        }
    }
}
