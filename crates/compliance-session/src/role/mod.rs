//! Role change detection.

pub mod watcher;

pub use watcher::{RoleCheck, RoleWatcher};
