//! Role comparison helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A role value observed from the backend by one poll.
///
/// Only lives for the duration of a comparison against the cached role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    /// The role exactly as the backend reported it.
    pub role: String,
    /// When the poll observed it.
    pub observed_at: DateTime<Utc>,
}

impl RoleSnapshot {
    /// Create a snapshot.
    pub fn new(role: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            role: role.into(),
            observed_at,
        }
    }

    /// Whether this snapshot agrees with a cached role.
    ///
    /// A missing cached role never matches.
    pub fn matches(&self, cached: Option<&str>) -> bool {
        cached.is_some_and(|c| roles_match(c, &self.role))
    }
}

/// Case-fold and trim a role for comparison.
pub fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase()
}

/// Compare two roles case- and whitespace-insensitively.
pub fn roles_match(a: &str, b: &str) -> bool {
    normalize_role(a) == normalize_role(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_role("  Admin "), "admin");
        assert!(roles_match("Admin", " admin "));
        assert!(!roles_match("Admin", "Manager"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_role(" FRANCHISE_Owner\t");
        assert_eq!(normalize_role(&once), once);
    }

    #[test]
    fn test_snapshot_without_cached_role() {
        let snap = RoleSnapshot::new("admin", Utc::now());
        assert!(!snap.matches(None));
        assert!(snap.matches(Some("ADMIN")));
    }
}
