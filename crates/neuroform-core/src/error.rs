//! Error types for the Neuroform client stack.

use thiserror::Error;

/// A shared error type for the entire Neuroform client.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum NeuroformError {
    /// Transport-level failure: the remote store could not be reached at all.
    #[error("remote unavailable: {message}")]
    RemoteUnavailable { message: String },

    /// A session endpoint answered with a non-success status.
    #[error("session endpoint returned status {status}: {message}")]
    SessionUnreachable { status: u16, message: String },

    /// A schema document could not be fetched or decoded.
    #[error("schema for section '{section}' unavailable: {message}")]
    SchemaUnavailable { section: String, message: String },

    /// A raw widget value could not be parsed for its declared field kind.
    #[error("invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// IO error (client-local persistence).
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl NeuroformError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a RemoteUnavailable error
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
        }
    }

    /// Creates a SessionUnreachable error
    pub fn session_unreachable(status: u16, message: impl Into<String>) -> Self {
        Self::SessionUnreachable {
            status,
            message: message.into(),
        }
    }

    /// Creates a SchemaUnavailable error
    pub fn schema_unavailable(section: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaUnavailable {
            section: section.into(),
            message: message.into(),
        }
    }

    /// Creates an InvalidValue error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a RemoteUnavailable error
    pub fn is_remote_unavailable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }

    /// Check if this is a SessionUnreachable error
    pub fn is_session_unreachable(&self) -> bool {
        matches!(self, Self::SessionUnreachable { .. })
    }

    /// Check if this is a SchemaUnavailable error
    pub fn is_schema_unavailable(&self) -> bool {
        matches!(self, Self::SchemaUnavailable { .. })
    }

    /// Check if this error means the remote store could not serve the request,
    /// either because the transport failed or the endpoint rejected it.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable { .. } | Self::SessionUnreachable { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for NeuroformError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for NeuroformError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for NeuroformError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for NeuroformError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, NeuroformError>`.
pub type Result<T> = std::result::Result<T, NeuroformError>;
