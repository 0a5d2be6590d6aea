//! Storage backends for the `KeyValueStorage` port
//!
//! | Kind | Backend | Lifetime |
//! |------|---------|----------|
//! | `durable` / `local` | [`FileStorage`] at `<root>/durable.json` | survives restarts |
//! | `session` | [`ScopedStorage`] at `<root>/sessions/<id>.json` | until `end_scope` |
//! | `memory` | [`MemoryStorage`] | this handle only |

mod file;
mod memory;
mod scoped;

use std::path::PathBuf;
use std::sync::Arc;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use scoped::{new_scope_id, ScopedStorage, DEFAULT_SCOPE_ID};
use tabauth_core::ports::KeyValueStorage;
use tabauth_domain::{AuthConfig, Result, StorageKind};
use tracing::info;

const DURABLE_FILE: &str = "durable.json";
const DEFAULT_ROOT_DIR: &str = "tabauth";

/// Where file-backed storage lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    pub root: PathBuf,
    /// Session scope to open; `None` selects [`DEFAULT_SCOPE_ID`]
    pub scope_id: Option<String>,
}

impl StorageOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), scope_id: None }
    }

    /// Root from `storage_dir`, else `<temp>/tabauth`
    pub fn from_config(config: &AuthConfig) -> Self {
        let root = config
            .storage_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_ROOT_DIR));
        Self::new(root)
    }

    #[must_use]
    pub fn with_scope_id(mut self, scope_id: impl Into<String>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    /// Allocate a fresh random scope; read it back from `scope_id` to
    /// re-open the same scope after a reload
    #[must_use]
    pub fn with_new_scope(self) -> Self {
        self.with_scope_id(new_scope_id())
    }

    /// Scope id the `session` backend opens
    pub fn session_scope(&self) -> &str {
        self.scope_id.as_deref().unwrap_or(DEFAULT_SCOPE_ID)
    }
}

/// Build the backend selected by `kind`
///
/// # Errors
/// Returns `AuthError::Storage` if a storage directory cannot be created,
/// `AuthError::Config` for an invalid scope id.
pub fn resolve_storage(kind: StorageKind, options: &StorageOptions) -> Result<Arc<dyn KeyValueStorage>> {
    let storage: Arc<dyn KeyValueStorage> = match kind {
        StorageKind::Durable => Arc::new(FileStorage::open(options.root.join(DURABLE_FILE))?),
        StorageKind::Session => Arc::new(ScopedStorage::open(&options.root, options.session_scope())?),
        StorageKind::Memory => Arc::new(MemoryStorage::new()),
    };
    info!(kind = %kind, root = %options.root.display(), "storage.resolved");
    Ok(storage)
}
