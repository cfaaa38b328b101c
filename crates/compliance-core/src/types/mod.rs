//! Core type definitions shared across the workspace.

pub mod role;
pub mod session;
pub mod signal;
pub mod user;
pub mod wire;

pub use role::{RoleSnapshot, normalize_role, roles_match};
pub use session::{SessionPatch, SessionState};
pub use signal::InteractionSignal;
pub use user::UserProfile;
pub use wire::{LoginResponse, RefreshResponse, UserRoleResponse};
