//! Periodic role verification against the backend.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use compliance_core::AppError;
use compliance_core::events::session::{LogoutReason, SessionEvent};
use compliance_core::traits::{AuthApi, Clock, Notice, Notifier};
use compliance_core::types::RoleSnapshot;

use crate::logout::SessionTerminator;
use crate::refresh::{RefreshOutcome, TokenRefresher};
use crate::store::SessionStore;

/// Message shown when the backend reports a different role.
const ROLE_CHANGED_NOTICE: &str = "Your role has changed. Please log in again.";

/// Outcome of a single role poll.
#[derive(Debug, Clone)]
pub enum RoleCheck {
    /// No token or no user id; nothing to check.
    NoSession,
    /// The session ended or was replaced while the poll was in flight.
    Stale,
    /// The backend role matches the cached one.
    Unchanged,
    /// The backend answered without any role; the session is kept.
    NoRole,
    /// The roles differ and the session was ended.
    Changed {
        /// Role cached at login.
        cached: Option<String>,
        /// Role reported by the backend.
        observed: String,
    },
    /// The poll failed for a reason worth retrying next interval.
    Transient(AppError),
    /// The backend rejected the token and a refresh produced a new one.
    Reauthenticated,
    /// The backend rejected the token, the refresh failed, and the session
    /// was ended.
    RefreshFailed,
}

impl RoleCheck {
    /// Whether polling should stop after this outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NoSession | Self::Stale | Self::Changed { .. } | Self::RefreshFailed
        )
    }
}

/// Polls the backend for the user's role and ends the session on a change.
#[derive(Debug)]
pub struct RoleWatcher {
    api: Arc<dyn AuthApi>,
    store: Arc<SessionStore>,
    refresher: Arc<TokenRefresher>,
    terminator: Arc<SessionTerminator>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<SessionEvent>,
}

impl RoleWatcher {
    /// Create a watcher.
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<SessionStore>,
        refresher: Arc<TokenRefresher>,
        terminator: Arc<SessionTerminator>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            api,
            store,
            refresher,
            terminator,
            notifier,
            clock,
            events,
        }
    }

    /// Poll every `period` until the scope is cancelled or a poll ends the
    /// session.
    pub async fn run(self: Arc<Self>, epoch: u64, period: Duration, cancel: CancellationToken) {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let check = tokio::select! {
                _ = cancel.cancelled() => break,
                check = self.poll_once(epoch) => check,
            };
            if check.is_terminal() {
                break;
            }
        }
        tracing::trace!(epoch, "Role watcher ended");
    }

    /// Run one poll for the session of generation `epoch`.
    pub async fn poll_once(&self, epoch: u64) -> RoleCheck {
        let (state, current) = self.store.snapshot();
        if current != epoch {
            return RoleCheck::Stale;
        }
        let (Some(token), Some(user_id)) = (
            state.authenticated_token().map(str::to_string),
            state.authenticated_user_id().map(str::to_string),
        ) else {
            return RoleCheck::NoSession;
        };
        let cached = state.authenticated_role().map(str::to_string);

        let result = self.api.fetch_user(&user_id, &token).await;

        // The session may have ended while the request was in flight.
        if self.store.epoch() != epoch {
            return RoleCheck::Stale;
        }

        match result {
            Ok(body) => {
                let Some(observed) = body.role() else {
                    tracing::debug!(user_id = %user_id, "User record carried no role");
                    return RoleCheck::NoRole;
                };
                let snapshot = RoleSnapshot::new(observed, self.clock.now());
                if snapshot.matches(cached.as_deref()) {
                    return RoleCheck::Unchanged;
                }

                tracing::warn!(
                    user_id = %user_id,
                    cached = ?cached,
                    observed = %snapshot.role,
                    "User role changed; ending session"
                );
                let _ = self.events.send(SessionEvent::RoleChanged {
                    cached: cached.clone(),
                    observed: snapshot.role.clone(),
                });
                self.notifier.notify(&Notice::warning(ROLE_CHANGED_NOTICE));
                self.terminator.force(epoch, LogoutReason::RoleChanged);
                RoleCheck::Changed {
                    cached,
                    observed: snapshot.role,
                }
            }
            Err(e) if e.is_unauthenticated() => {
                tracing::info!(user_id = %user_id, "Role poll rejected the token; refreshing");
                match self.refresher.exchange().await {
                    RefreshOutcome::Refreshed { .. } => RoleCheck::Reauthenticated,
                    RefreshOutcome::Failed { epoch } => {
                        // The refresher never redirects; finish the logout here.
                        self.terminator.force(epoch, LogoutReason::RefreshFailed);
                        RoleCheck::RefreshFailed
                    }
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Role poll failed; will retry");
                RoleCheck::Transient(e)
            }
        }
    }
}
