//! Persisted key layout of the session record.
//!
//! Every value is a string: the token and role verbatim, the user profile
//! as JSON, timestamps as RFC 3339.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use compliance_core::traits::StorageChange;
use compliance_core::types::{SessionState, UserProfile};

/// Bearer token.
pub const TOKEN: &str = "token";
/// Cached role.
pub const ROLE: &str = "userRole";
/// Serialized user profile.
pub const USER: &str = "user";
/// Login timestamp.
pub const LOGIN_TIME: &str = "loginTime";
/// Last activity timestamp.
pub const LAST_ACTIVITY_TIME: &str = "lastActivityTime";

/// Every key owned by the session record.
pub const ALL: [&str; 5] = [TOKEN, ROLE, USER, LOGIN_TIME, LAST_ACTIVITY_TIME];

/// Keys removed when a token refresh fails.
pub const CREDENTIALS: [&str; 3] = [TOKEN, ROLE, USER];

/// Encode a full state as a batch that overwrites or removes every key.
pub fn encode(state: &SessionState) -> Vec<StorageChange> {
    let user = state
        .user
        .as_ref()
        .and_then(|u| match serde_json::to_string(u) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "Failed to serialize cached user; dropping it from storage");
                None
            }
        });

    vec![
        (TOKEN, state.token.clone()),
        (ROLE, state.role.clone()),
        (USER, user),
        (LOGIN_TIME, state.login_time.map(|t| t.to_rfc3339())),
        (
            LAST_ACTIVITY_TIME,
            state.last_activity_time.map(|t| t.to_rfc3339()),
        ),
    ]
}

/// Decode stored entries into a state. Unparseable values are dropped.
pub fn decode(entries: &HashMap<String, String>) -> SessionState {
    SessionState {
        token: entries.get(TOKEN).filter(|t| !t.is_empty()).cloned(),
        role: entries.get(ROLE).filter(|r| !r.is_empty()).cloned(),
        user: entries
            .get(USER)
            .and_then(|raw| serde_json::from_str::<UserProfile>(raw).ok()),
        login_time: entries.get(LOGIN_TIME).and_then(|raw| parse_timestamp(raw)),
        last_activity_time: entries
            .get(LAST_ACTIVITY_TIME)
            .and_then(|raw| parse_timestamp(raw)),
    }
}

/// Parse an RFC 3339 timestamp or a count of milliseconds since the epoch.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let now = DateTime::parse_from_rfc3339("2026-03-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let state = SessionState {
            token: Some("abc".into()),
            role: Some("Admin".into()),
            user: Some(UserProfile::new("12").with_name("Ana")),
            login_time: Some(now),
            last_activity_time: Some(now),
        };

        let entries: HashMap<String, String> = encode(&state)
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
            .collect();

        assert_eq!(entries.get(ROLE).map(String::as_str), Some("Admin"));
        assert_eq!(decode(&entries), state);
    }

    #[test]
    fn test_millisecond_timestamps() {
        let parsed = parse_timestamp("1767225600000").unwrap();
        assert_eq!(parsed.timestamp(), 1_767_225_600);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_garbage_user_dropped() {
        let mut entries = HashMap::new();
        entries.insert(TOKEN.to_string(), "abc".to_string());
        entries.insert(USER.to_string(), "{not json".to_string());

        let state = decode(&entries);
        assert_eq!(state.token.as_deref(), Some("abc"));
        assert!(state.user.is_none());
    }
}
