//! Session lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// The user asked to log out.
    Manual,
    /// No activity for the whole idle threshold.
    IdleTimeout,
    /// The backend reports a different role than the cached one.
    RoleChanged,
    /// The backend rejected the token and the refresh exchange failed.
    RefreshFailed,
}

impl LogoutReason {
    /// Whether the logout was initiated by the system rather than the user.
    pub fn is_forced(&self) -> bool {
        !matches!(self, Self::Manual)
    }

    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::IdleTimeout => "idle_timeout",
            Self::RoleChanged => "role_changed",
            Self::RefreshFailed => "refresh_failed",
        }
    }
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events related to the client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A login succeeded and a session scope started.
    Started {
        /// The session scope ID.
        session_id: Uuid,
        /// The user ID, when known.
        user_id: Option<String>,
    },
    /// Debounced activity was written to the store.
    ActivityRecorded {
        /// The session scope ID.
        session_id: Uuid,
        /// Time of the latest signal in the burst.
        at: DateTime<Utc>,
    },
    /// The refresh exchange produced a new token.
    TokenRefreshed,
    /// The refresh exchange failed and credentials were cleared.
    RefreshFailed {
        /// What went wrong.
        error: String,
    },
    /// A role poll observed a role different from the cached one.
    RoleChanged {
        /// The role cached at login.
        cached: Option<String>,
        /// The role the backend reported.
        observed: String,
    },
    /// The session was torn down.
    Ended {
        /// The session scope ID, when a scope was running.
        session_id: Option<Uuid>,
        /// Why it ended.
        reason: LogoutReason,
    },
}
