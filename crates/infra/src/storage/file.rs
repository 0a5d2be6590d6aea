//! Durable JSON-file storage
//!
//! The whole key/value map lives in one JSON object. Every write is a
//! read-modify-write that lands through a temp file in the same directory and
//! an atomic rename, so a reader never sees a half-written file.
//!
//! Handles in one process serialize their writes; handles in different
//! processes do not. Two processes writing different keys at the same moment
//! can lose one update, which is the same race shared browser storage has.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tabauth_core::ports::KeyValueStorage;
use tabauth_domain::{AuthError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::into_auth;

type Entries = BTreeMap<String, String>;

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_guard: Mutex<()>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`
    ///
    /// Parent directories are created eagerly; the file itself appears on the
    /// first write.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(into_auth)?;
        }
        debug!(path = %path.display(), "file_storage.opened");
        Ok(Self { path, write_guard: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Entries> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(into_auth(err)),
        };

        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "file_storage.corrupt_file");
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let body = serde_json::to_vec(entries)
            .map_err(|err| AuthError::Internal(format!("failed to encode storage file: {err}")))?;

        let mut staged = NamedTempFile::new_in(dir).map_err(into_auth)?;
        staged.write_all(&body).map_err(into_auth)?;
        staged.as_file().sync_all().map_err(into_auth)?;
        staged.persist(&self.path).map_err(into_auth)?;
        Ok(())
    }

    /// Apply `change` to the current map and persist the result when it
    /// reports a modification
    fn update(&self, change: impl FnOnce(&mut Entries) -> bool) -> Result<()> {
        let _guard = self.write_guard.lock();
        let mut entries = self.read_entries()?;
        if change(&mut entries) {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}
