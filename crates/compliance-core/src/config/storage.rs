//! Persisted session storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which backend persists the session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory only; nothing survives a restart.
    #[default]
    Memory,
    /// A JSON file of string keys and values.
    File,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::File => write!(f, "file"),
        }
    }
}

/// Session storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Path of the JSON file used by the `file` backend.
    #[serde(default = "default_path")]
    pub path: String,
}

impl StorageConfig {
    /// Sidecar file holding the HTTP cookie jar next to the session file.
    pub fn cookie_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.cookies", self.path))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/session.json".to_string()
}
