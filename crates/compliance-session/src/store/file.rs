//! JSON file storage backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use compliance_core::error::{AppError, ErrorKind};
use compliance_core::result::AppResult;
use compliance_core::traits::{KeyValueStorage, StorageChange};

/// Persists the session record as a flat JSON object of strings.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a concurrent reader sees either the old or the new record.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Create a storage backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> AppResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Corrupt session file '{}': {e}", self.path.display()),
                    e,
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read session file '{}': {e}", self.path.display()),
                e,
            )),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn load(&self) -> AppResult<HashMap<String, String>> {
        self.read_entries()
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn apply(&self, changes: &[StorageChange]) -> AppResult<()> {
        let _guard = self.write_lock.lock();
        // A corrupt file is replaced rather than blocking every future write;
        // any other read failure must not discard what the file holds.
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) if e.kind == ErrorKind::Serialization => {
                tracing::warn!(error = %e, "Replacing corrupt session file");
                HashMap::new()
            }
            Err(e) => return Err(e),
        };
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
        self.write_entries(&entries)
    }
}
