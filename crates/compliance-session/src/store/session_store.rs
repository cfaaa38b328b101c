//! The process-wide session record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

use compliance_core::traits::{KeyValueStorage, StorageChange};
use compliance_core::types::{SessionPatch, SessionState, UserProfile};
use compliance_core::{AppError, AppResult};

use super::keys;
use super::memory::MemoryStorage;

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    /// Bumped whenever a login begins or a live session is cleared.
    epoch: u64,
}

/// Holds the session record and writes it through to a storage backend.
///
/// Every operation takes the lock once, writes through to the backend while
/// holding it, and releases it before returning. Readers never observe a
/// half-applied update, backend writes land in the same order as memory
/// writes, and no lock is ever held across an `.await`. Backend failures
/// are logged; the in-memory record stays authoritative for this process.
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<Inner>,
    backend: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Create a store over `backend`, hydrating from what it holds.
    ///
    /// A persisted record with a token but without consistent timestamps is
    /// discarded, both in memory and in the backend.
    pub fn new(backend: Arc<dyn KeyValueStorage>) -> Self {
        let state = match backend.load() {
            Ok(entries) => keys::decode(&entries),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session; starting logged out");
                SessionState::default()
            }
        };

        let store = Self {
            inner: RwLock::new(Inner::default()),
            backend,
        };

        if state.is_authenticated() && state.is_consistent() {
            debug!("Hydrated persisted session");
            store.inner.write().state = state;
        } else if !state.is_empty() {
            debug!("Discarding inconsistent or stale persisted session");
            store.persist(&keys::ALL.map(|k| (k, None::<String>)));
        }

        store
    }

    /// Create a store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// A copy of the current record.
    pub fn get(&self) -> SessionState {
        self.inner.read().state.clone()
    }

    /// The current session generation.
    pub fn epoch(&self) -> u64 {
        self.inner.read().epoch
    }

    /// The current record together with its generation, read atomically.
    pub fn snapshot(&self) -> (SessionState, u64) {
        let inner = self.inner.read();
        (inner.state.clone(), inner.epoch)
    }

    /// Whether a bearer token is present.
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().state.is_authenticated()
    }

    /// Whether the session of generation `epoch` is still live.
    pub fn is_current(&self, epoch: u64) -> bool {
        let inner = self.inner.read();
        inner.epoch == epoch && inner.state.is_authenticated()
    }

    /// Apply a partial update.
    ///
    /// Rejected, leaving the record untouched, when it would move the
    /// recorded activity backwards or leave a token without consistent
    /// timestamps.
    pub fn set(&self, patch: SessionPatch) -> AppResult<()> {
        let mut inner = self.inner.write();
        let recorded = inner.state.last_activity_time;
        if let Some(next) = patch.last_activity_time {
            if recorded.is_some_and(|last| next < last) {
                return Err(AppError::validation(format!(
                    "Activity time {next} precedes the recorded activity"
                )));
            }
        }

        let mut next = inner.state.clone();
        patch.apply_to(&mut next);
        if !next.is_consistent() {
            return Err(AppError::validation(
                "A token requires a login time and an activity time not before it",
            ));
        }

        inner.state = next;
        self.persist(&keys::encode(&inner.state));
        Ok(())
    }

    /// Start a new login, replacing whatever was stored.
    ///
    /// Returns the generation of the new session.
    pub fn begin(
        &self,
        token: impl Into<String>,
        role: Option<String>,
        user: Option<UserProfile>,
        now: DateTime<Utc>,
    ) -> u64 {
        let mut inner = self.inner.write();
        inner.state = SessionState {
            token: Some(token.into()),
            role,
            user,
            login_time: Some(now),
            last_activity_time: Some(now),
        };
        inner.epoch += 1;
        self.persist(&keys::encode(&inner.state));
        inner.epoch
    }

    /// Store a token obtained by a refresh exchange.
    ///
    /// If a session is live only the token changes. Otherwise the token
    /// starts a new session generation with both timestamps set to `now`,
    /// keeping whatever role and profile are still cached.
    pub fn accept_refreshed_token(&self, token: impl Into<String>, now: DateTime<Utc>) -> u64 {
        let mut inner = self.inner.write();
        let was_live = inner.state.is_authenticated();
        inner.state.token = Some(token.into());
        if !was_live {
            inner.state.login_time = Some(now);
            inner.state.last_activity_time = Some(now);
            inner.epoch += 1;
        }
        self.persist(&keys::encode(&inner.state));
        inner.epoch
    }

    /// Record activity at `at` for the session of generation `epoch`.
    ///
    /// Ignored when the generation moved on, no token is present, or `at`
    /// is older than the recorded activity. Returns whether it was written.
    pub fn touch(&self, epoch: u64, at: DateTime<Utc>) -> bool {
        let mut inner = self.inner.write();
        if inner.epoch != epoch || !inner.state.is_authenticated() {
            return false;
        }
        if inner.state.last_activity_time.is_some_and(|last| at <= last) {
            return false;
        }
        inner.state.last_activity_time = Some(at);
        self.persist(&[(keys::LAST_ACTIVITY_TIME, Some(at.to_rfc3339()))]);
        true
    }

    /// Remove every key of the record.
    ///
    /// Returns whether a token was present, i.e. whether a live session
    /// ended. Clearing an already empty store is a no-op.
    pub fn clear(&self) -> bool {
        let mut inner = self.inner.write();
        if inner.state.is_empty() {
            return false;
        }
        let had_token = inner.state.is_authenticated();
        inner.state = SessionState::default();
        inner.epoch += 1;
        self.persist(&keys::ALL.map(|k| (k, None::<String>)));
        had_token
    }

    /// Remove every key, but only while the store is still on generation `epoch`.
    ///
    /// Returns whether anything was cleared.
    pub fn clear_if(&self, epoch: u64) -> bool {
        let mut inner = self.inner.write();
        if inner.epoch != epoch || inner.state.is_empty() {
            return false;
        }
        inner.state = SessionState::default();
        inner.epoch += 1;
        self.persist(&keys::ALL.map(|k| (k, None::<String>)));
        true
    }

    /// Remove the token, role, and user, leaving the timestamps.
    ///
    /// This is the narrow clear applied when a refresh exchange fails. It
    /// ends the session, so the generation moves on when anything was
    /// removed. Returns the generation afterwards.
    pub fn clear_credentials(&self) -> u64 {
        let mut inner = self.inner.write();
        let state = &mut inner.state;
        if state.token.is_none() && state.role.is_none() && state.user.is_none() {
            return inner.epoch;
        }
        state.token = None;
        state.role = None;
        state.user = None;
        inner.epoch += 1;
        self.persist(&keys::CREDENTIALS.map(|k| (k, None::<String>)));
        inner.epoch
    }

    fn persist(&self, changes: &[StorageChange]) {
        if let Err(e) = self.backend.apply(changes) {
            warn!(error = %e, "Failed to persist session state");
        }
    }
}
