//! # compliance-session
//!
//! Client-side session lifecycle for the Compliance Console.
//!
//! A [`SessionManager`] owns one [`SessionStore`] and, per login, one session
//! scope: a set of tokio tasks (activity debounce, idle deadline, idle poll,
//! role watcher) that share a cancellation token and are torn down together
//! on logout. The [`RouteGate`] answers access checks synchronously from the
//! store, and the [`AuthorizedClient`] performs bearer-authenticated calls
//! with a single refresh-and-retry on `401`.

pub mod activity;
pub mod client;
pub mod gate;
pub mod idle;
pub mod logout;
pub mod manager;
pub mod navigation;
pub mod refresh;
pub mod role;
pub mod scope;
pub mod store;

pub use activity::ActivityTracker;
pub use client::{AuthorizedClient, HttpAuthApi};
pub use gate::{DenyReason, GateDecision, RouteGate};
pub use idle::{DeadlineHandle, IdleMonitor};
pub use logout::SessionTerminator;
pub use manager::{SessionManager, SessionManagerBuilder};
pub use navigation::{HistoryNavigator, TracingNotifier};
pub use refresh::TokenRefresher;
pub use role::{RoleCheck, RoleWatcher};
pub use scope::{ScopeSlot, SessionScope};
pub use store::{FileStorage, MemoryStorage, SessionStore};
