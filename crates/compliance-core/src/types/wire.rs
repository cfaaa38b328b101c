//! Response bodies of the backend endpoints the session subsystem calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::UserProfile;

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for the new session.
    pub token: String,
    /// Profile of the authenticated user.
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Role, when the backend reports it next to the profile.
    #[serde(default)]
    pub role: Option<String>,
}

impl LoginResponse {
    /// The role to cache: top-level first, then the profile's.
    pub fn resolved_role(&self) -> Option<&str> {
        non_empty(self.role.as_deref())
            .or_else(|| non_empty(self.user.as_ref().and_then(|u| u.role.as_deref())))
    }
}

/// Body of `POST /api/auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// The new bearer token.
    pub token: String,
}

/// Body of `GET /api/users/:userId`.
///
/// The backend has shipped three shapes for this record, so the role is
/// checked in a fixed order and the first non-empty value wins:
///
/// 1. `{ "role": "admin" }`
/// 2. `{ "user": { "role": "admin" } }`
/// 3. `{ "roles": ["admin", ...] }` (entries may also be `{ "name": ... }`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRoleResponse {
    /// Direct role field.
    #[serde(default)]
    pub role: Option<String>,
    /// Nested user record.
    #[serde(default)]
    pub user: Option<NestedUser>,
    /// Role collection; only the first entry is considered.
    #[serde(default)]
    pub roles: Option<Vec<Value>>,
}

/// The `user` object of a [`UserRoleResponse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NestedUser {
    /// Role of the nested user.
    #[serde(default)]
    pub role: Option<String>,
}

impl UserRoleResponse {
    /// The authoritative role, if any shape carried a non-empty one.
    pub fn role(&self) -> Option<&str> {
        non_empty(self.role.as_deref())
            .or_else(|| non_empty(self.user.as_ref().and_then(|u| u.role.as_deref())))
            .or_else(|| non_empty(self.first_listed_role()))
    }

    fn first_listed_role(&self) -> Option<&str> {
        match self.roles.as_ref()?.first()? {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map
                .get("name")
                .or_else(|| map.get("role"))
                .and_then(Value::as_str),
            _ => None,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
