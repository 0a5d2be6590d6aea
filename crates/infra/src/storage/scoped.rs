//! Session-scoped storage
//!
//! A scope is one `FileStorage` file under `<root>/sessions/<scope-id>.json`.
//! It survives every session object opened on it, so a reload that re-opens
//! the same scope id finds the values written before the redirect. The file
//! is deleted only through [`ScopedStorage::end_scope`].

use std::path::Path;

use tabauth_core::ports::KeyValueStorage;
use tabauth_domain::{AuthError, Result};
use tracing::debug;
use uuid::Uuid;

use super::file::FileStorage;

const SESSIONS_DIR: &str = "sessions";
const MAX_SCOPE_ID_LEN: usize = 64;

/// Scope used when the host does not name one
pub const DEFAULT_SCOPE_ID: &str = "default";

/// Fresh random scope id, for hosts that keep one scope per window
pub fn new_scope_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug)]
pub struct ScopedStorage {
    scope_id: String,
    inner: FileStorage,
}

impl ScopedStorage {
    /// Open (or start) the scope named `scope_id`
    ///
    /// # Errors
    /// Returns `AuthError::Config` for an id outside `[A-Za-z0-9_-]{1,64}`,
    /// `AuthError::Storage` if the sessions directory cannot be created.
    pub fn open(root: impl AsRef<Path>, scope_id: &str) -> Result<Self> {
        validate_scope_id(scope_id)?;
        let path = root.as_ref().join(SESSIONS_DIR).join(format!("{scope_id}.json"));
        let inner = FileStorage::open(path)?;
        debug!(scope_id, "scoped_storage.opened");
        Ok(Self { scope_id: scope_id.to_string(), inner })
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Delete the scope file now; later writes start an empty scope
    ///
    /// # Errors
    /// Returns `AuthError::Storage` when the file exists but cannot be removed.
    pub fn end_scope(&self) -> Result<()> {
        match std::fs::remove_file(self.inner.path()) {
            Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                return Err(AuthError::Storage(format!("failed to end session scope: {err}")));
            }
            _ => {}
        }
        debug!(scope_id = %self.scope_id, "scoped_storage.ended");
        Ok(())
    }
}

impl KeyValueStorage for ScopedStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}

fn validate_scope_id(scope_id: &str) -> Result<()> {
    let valid = !scope_id.is_empty()
        && scope_id.len() <= MAX_SCOPE_ID_LEN
        && scope_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AuthError::Config(format!("invalid session scope id: {scope_id:?}")))
    }
}
