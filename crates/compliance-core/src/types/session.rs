//! Persisted session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// The client-side session record.
///
/// A missing `token` is authoritative: when it is absent every other field
/// is stale by definition. The `authenticated_*` accessors enforce that, so
/// prefer them over reading the fields directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Bearer credential.
    pub token: Option<String>,
    /// Last known authorization role.
    pub role: Option<String>,
    /// Cached user profile.
    pub user: Option<UserProfile>,
    /// When the current login happened.
    pub login_time: Option<DateTime<Utc>>,
    /// Latest recorded user activity.
    pub last_activity_time: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Whether a bearer token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// The bearer token, if any.
    pub fn authenticated_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// The cached role, only while authenticated.
    pub fn authenticated_role(&self) -> Option<&str> {
        self.authenticated_token()?;
        self.role.as_deref()
    }

    /// The cached user, only while authenticated.
    pub fn authenticated_user(&self) -> Option<&UserProfile> {
        self.authenticated_token()?;
        self.user.as_ref()
    }

    /// The user identifier, only while authenticated.
    pub fn authenticated_user_id(&self) -> Option<&str> {
        self.authenticated_user()
            .map(|u| u.id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Reference point for idle computations, only while authenticated.
    ///
    /// Falls back to the login time when no activity was ever recorded.
    pub fn activity_reference(&self) -> Option<DateTime<Utc>> {
        self.authenticated_token()?;
        self.last_activity_time.or(self.login_time)
    }

    /// Whether every field is empty.
    pub fn is_empty(&self) -> bool {
        self.token.is_none()
            && self.role.is_none()
            && self.user.is_none()
            && self.login_time.is_none()
            && self.last_activity_time.is_none()
    }

    /// Whether the authenticated-state invariant holds.
    ///
    /// With a token, both timestamps must be present and activity must not
    /// precede login. Without a token there is nothing to check.
    pub fn is_consistent(&self) -> bool {
        if !self.is_authenticated() {
            return true;
        }
        match (self.login_time, self.last_activity_time) {
            (Some(login), Some(activity)) => activity >= login,
            _ => false,
        }
    }
}

/// A partial update applied by the session store's `set` operation.
///
/// `None` fields are left untouched; use a clear operation to remove values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    /// New bearer token.
    pub token: Option<String>,
    /// New cached role.
    pub role: Option<String>,
    /// New cached user.
    pub user: Option<UserProfile>,
    /// New login time.
    pub login_time: Option<DateTime<Utc>>,
    /// New last-activity time.
    pub last_activity_time: Option<DateTime<Utc>>,
}

impl SessionPatch {
    /// Patch that replaces the token.
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Patch that stamps the last-activity time.
    pub fn activity(at: DateTime<Utc>) -> Self {
        Self {
            last_activity_time: Some(at),
            ..Self::default()
        }
    }

    /// Apply the patch onto a state.
    pub fn apply_to(self, state: &mut SessionState) {
        if let Some(token) = self.token {
            state.token = Some(token);
        }
        if let Some(role) = self.role {
            state.role = Some(role);
        }
        if let Some(user) = self.user {
            state.user = Some(user);
        }
        if let Some(login_time) = self.login_time {
            state.login_time = Some(login_time);
        }
        if let Some(activity) = self.last_activity_time {
            state.last_activity_time = Some(activity);
        }
    }
}
