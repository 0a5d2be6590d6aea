//! Shared in-memory storage
//!
//! Clones share one map, so several orchestrators built over clones behave
//! like tabs of one origin.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tabauth_core::ports::KeyValueStorage;
use tabauth_domain::Result as DomainResult;

#[derive(Clone, Default)]
pub struct SharedStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl SharedStorage {
    /// Sorted keys currently present
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.entries.lock().unwrap().insert(key.to_string(), value.into());
    }

    pub fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Drop every entry, as another tab's full logout would
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl KeyValueStorage for SharedStorage {
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.delete(key);
        Ok(())
    }
}
