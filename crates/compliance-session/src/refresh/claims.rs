//! Best-effort expiry check for JWT-shaped bearer tokens.
//!
//! The token is opaque to the client; this only peeks at the `exp` claim so
//! that an obviously expired token is refreshed before it is used. Signatures
//! are not verified.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: Option<f64>,
}

/// The `exp` claim of `token`, when it is a JWT carrying one.
pub fn expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: ExpiryClaim = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp? as i64, 0)
}

/// Whether `token` carries an `exp` claim at or before `now`.
///
/// Opaque tokens are never considered expired.
pub fn token_expired(token: &str, now: DateTime<Utc>) -> bool {
    expiry(token).is_some_and(|exp| exp <= now)
}
