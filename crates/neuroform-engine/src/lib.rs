//! The Neuroform form engine: per-section form sessions with debounced
//! write-through synchronization to the remote session store.
//!
//! The flow, end to end: an action selection resolves to an ordered set of
//! configuration tabs; each schema-backed tab opens a [`form::FormSession`],
//! which fetches the section schema, hydrates the edit cache from the saved
//! session exactly once, and hands every subsequent edit to the
//! [`scheduler::SyncScheduler`] for coalesced, loop-free persistence.

pub mod form;
pub mod renderer;
pub mod scheduler;

#[cfg(test)]
mod test_support;

pub use form::{ActionForms, FormServices, FormSession, HydrationState};
pub use renderer::{FieldBinding, FieldWidget, section_bindings};
pub use scheduler::{SyncOptions, SyncScheduler};
