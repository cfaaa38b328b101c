//! The idle predicate shared by the deadline timer, the periodic check, and
//! the route gate.

use std::time::Duration;

use chrono::{DateTime, Utc};

use compliance_core::types::SessionState;

/// Whether the session in `state` has been idle for at least `threshold`.
///
/// Without a token there is no session to expire. A token with no recorded
/// timestamps has no activity to measure from and counts as expired.
pub fn is_expired(state: &SessionState, now: DateTime<Utc>, threshold: Duration) -> bool {
    if !state.is_authenticated() {
        return false;
    }
    match deadline(state, threshold) {
        Some(deadline) => now >= deadline,
        None => true,
    }
}

/// When the session in `state` expires if no further activity is recorded.
pub fn deadline(state: &SessionState, threshold: Duration) -> Option<DateTime<Utc>> {
    let reference = state.activity_reference()?;
    let threshold = chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX);
    reference.checked_add_signed(threshold)
}

/// How long to wait from `now` until `deadline`; zero once it has passed.
pub fn remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (deadline - now).to_std().unwrap_or(Duration::ZERO)
}
