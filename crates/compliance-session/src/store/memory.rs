//! In-process storage backend.

use std::collections::HashMap;

use parking_lot::RwLock;

use compliance_core::result::AppResult;
use compliance_core::traits::{KeyValueStorage, StorageChange};

/// Keeps the session record in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-populated with entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn load(&self) -> AppResult<HashMap<String, String>> {
        Ok(self.entries.read().clone())
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn apply(&self, changes: &[StorageChange]) -> AppResult<()> {
        let mut entries = self.entries.write();
        for (key, value) in changes {
            match value {
                Some(value) => {
                    entries.insert((*key).to_string(), value.clone());
                }
                None => {
                    entries.remove(*key);
                }
            }
        }
        Ok(())
    }
}
