//! Domain events emitted by the session lifecycle.
//!
//! Events are published on a broadcast channel owned by the session
//! manager and consumed by the CLI, the agent, and tests.

pub mod session;

pub use session::{LogoutReason, SessionEvent};
