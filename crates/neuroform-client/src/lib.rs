//! Remote-facing implementations for the Neuroform form engine: the HTTP
//! session store, the caching schema catalog, file-backed session-id
//! persistence, and endpoint configuration.

pub mod catalog;
pub mod config;
pub mod http;
pub mod id_store;

pub use catalog::SchemaCatalog;
pub use config::RemoteConfig;
pub use http::HttpSessionStore;
pub use id_store::FileSessionIdStore;
