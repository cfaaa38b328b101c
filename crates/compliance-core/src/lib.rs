//! # compliance-core
//!
//! Core crate for the Compliance Console session subsystem. Contains the
//! session data model, configuration schemas, the seams other crates plug
//! into (clock, navigation, notices, storage, backend API), session events,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other Compliance Console crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
