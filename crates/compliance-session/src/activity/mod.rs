//! User activity tracking.

pub mod tracker;

pub use tracker::{ActivityDebouncer, ActivityTracker};
