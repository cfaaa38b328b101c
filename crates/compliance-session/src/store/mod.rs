//! Session store and its persistence backends.

pub mod file;
pub mod keys;
pub mod memory;
pub mod session_store;

use std::sync::Arc;

use compliance_core::config::{StorageBackend, StorageConfig};
use compliance_core::traits::KeyValueStorage;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use session_store::SessionStore;

/// Open the backend selected by `config`.
pub fn open_backend(config: &StorageConfig) -> Arc<dyn KeyValueStorage> {
    match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(FileStorage::new(&config.path)),
    }
}
