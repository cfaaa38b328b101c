//! Persistent key/value storage backing the session store.

use std::collections::HashMap;

use crate::result::AppResult;

/// One key update: `Some(value)` writes, `None` removes.
pub type StorageChange = (&'static str, Option<String>);

/// String key/value storage, the equivalent of browser local storage.
///
/// Calls are synchronous. `apply` must make a whole batch visible at once so
/// that a reader never sees half of a logout.
pub trait KeyValueStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Read every stored entry.
    fn load(&self) -> AppResult<HashMap<String, String>>;

    /// Read a single key.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Apply a batch of changes atomically.
    fn apply(&self, changes: &[StorageChange]) -> AppResult<()>;
}
