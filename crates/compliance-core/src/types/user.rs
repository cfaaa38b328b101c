//! Cached user profile.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display/identity cache for the logged-in user.
///
/// Only `id` is required. Fields the backend sends that are not modelled
/// here are kept in `extra` so the cached copy round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier, used to build the role lookup path.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Role as reported at login time.
    #[serde(default)]
    pub role: Option<String>,
    /// Every other field of the profile.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Create a profile with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            role: None,
            extra: Map::new(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Name to show in listings: the display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

// Backends disagree on whether ids are numbers or strings.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number for user id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_accepted() {
        let user: UserProfile = serde_json::from_str(r#"{"id": 17, "name": "Ana"}"#).unwrap();
        assert_eq!(user.id, "17");
        assert_eq!(user.display_name(), "Ana");
    }

    #[test]
    fn test_extra_fields_preserved() {
        let raw = r#"{"id":"u1","franchise":"north","active":true}"#;
        let user: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(user.extra.get("franchise"), Some(&Value::from("north")));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["active"], Value::from(true));
    }
}
