//! Idle timeout enforcement.

pub mod monitor;
pub mod predicate;

pub use monitor::{DeadlineHandle, IdleMonitor};
pub use predicate::is_expired;
