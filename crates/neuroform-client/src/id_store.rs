//! Durable client-local persistence for the session id.
//!
//! The browser original kept the id under a fixed localStorage key; this
//! client keeps it as a single-line file so it survives process restarts.

use neuroform_core::error::Result;
use neuroform_core::session::{SessionId, SessionIdStore};
use std::fs;
use std::path::{Path, PathBuf};

const ID_FILE: &str = "session_id";

/// File-backed [`SessionIdStore`].
///
/// Layout:
/// ```text
/// base_dir/
/// └── session_id
/// ```
pub struct FileSessionIdStore {
    base_dir: PathBuf,
}

impl FileSessionIdStore {
    /// Creates a store rooted at `base_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Creates the store at the default per-user location
    /// (`<config_dir>/neuroform`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined or
    /// created.
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            neuroform_core::NeuroformError::config("failed to determine config directory")
        })?;
        Self::new(config_dir.join("neuroform"))
    }

    fn id_file(&self) -> PathBuf {
        self.base_dir.join(ID_FILE)
    }
}

impl SessionIdStore for FileSessionIdStore {
    fn cached_id(&self) -> Result<Option<SessionId>> {
        let path = self.id_file();
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path)?;
        let id = raw.trim();
        if id.is_empty() {
            return Ok(None);
        }

        Ok(Some(id.to_string()))
    }

    fn set_cached_id(&self, id: &str) -> Result<()> {
        fs::write(self.id_file(), id)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.id_file();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionIdStore::new(dir.path()).unwrap();

        assert_eq!(store.cached_id().unwrap(), None);

        store.set_cached_id("a1b2c3d4").unwrap();
        assert_eq!(store.cached_id().unwrap().as_deref(), Some("a1b2c3d4"));
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let store = FileSessionIdStore::new(dir.path()).unwrap();
            store.set_cached_id("a1b2c3d4").unwrap();
        }

        let store = FileSessionIdStore::new(dir.path()).unwrap();
        assert_eq!(store.cached_id().unwrap().as_deref(), Some("a1b2c3d4"));
    }

    #[test]
    fn test_set_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionIdStore::new(dir.path()).unwrap();

        store.set_cached_id("abc").unwrap();
        store.set_cached_id("abc").unwrap();
        assert_eq!(store.cached_id().unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_whitespace_only_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionIdStore::new(dir.path()).unwrap();

        fs::write(dir.path().join(ID_FILE), "\n").unwrap();
        assert_eq!(store.cached_id().unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionIdStore::new(dir.path()).unwrap();

        store.set_cached_id("abc").unwrap();
        store.clear().unwrap();
        assert_eq!(store.cached_id().unwrap(), None);

        // Clearing an empty store is fine.
        store.clear().unwrap();
    }
}
