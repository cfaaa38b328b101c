//! Seams defined in `compliance-core` and implemented by other crates.

pub mod api;
pub mod clock;
pub mod navigator;
pub mod notifier;
pub mod storage;

pub use api::AuthApi;
pub use clock::{Clock, SystemClock, TokioClock};
pub use navigator::Navigator;
pub use notifier::{Notice, NoticeLevel, Notifier};
pub use storage::{KeyValueStorage, StorageChange};
