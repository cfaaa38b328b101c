//! Token refresh exchange.

use std::sync::Arc;

use tokio::sync::broadcast;

use compliance_core::events::session::SessionEvent;
use compliance_core::traits::{AuthApi, Clock};

use crate::scope::ScopeSlot;
use crate::store::SessionStore;

/// Result of one refresh exchange, with the store generation it left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token was stored.
    ///
    /// `epoch` equals the previous generation when a live session was
    /// extended, and is a new one when the token revived a logged-out store.
    Refreshed {
        /// The new bearer token.
        token: String,
        /// Store generation the token belongs to.
        epoch: u64,
    },
    /// The exchange failed and the credentials were removed.
    Failed {
        /// Store generation after the credentials were removed.
        epoch: u64,
    },
}

impl RefreshOutcome {
    /// The new token, if the exchange succeeded.
    pub fn token(self) -> Option<String> {
        match self {
            Self::Refreshed { token, .. } => Some(token),
            Self::Failed { .. } => None,
        }
    }
}

/// Exchanges the ambient refresh credential for a new bearer token.
///
/// One attempt per call, no retries, and never a redirect. A failure ends
/// the session: the credentials are cleared and the running scope is
/// cancelled, and the caller decides where the client goes next.
#[derive(Debug)]
pub struct TokenRefresher {
    api: Arc<dyn AuthApi>,
    store: Arc<SessionStore>,
    scopes: Arc<ScopeSlot>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<SessionEvent>,
}

impl TokenRefresher {
    /// Create a refresher.
    pub fn new(
        api: Arc<dyn AuthApi>,
        store: Arc<SessionStore>,
        scopes: Arc<ScopeSlot>,
        clock: Arc<dyn Clock>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            api,
            store,
            scopes,
            clock,
            events,
        }
    }

    /// Try to obtain a new token; see [`exchange`](Self::exchange).
    pub async fn refresh(&self) -> Option<String> {
        self.exchange().await.token()
    }

    /// Run one exchange.
    ///
    /// On success the token is stored. On any failure (transport, non-success
    /// status, malformed or empty body) the token, role, and user are removed
    /// from the store and the running scope is stopped.
    pub async fn exchange(&self) -> RefreshOutcome {
        let failure = match self.api.refresh().await {
            Ok(body) if !body.token.trim().is_empty() => {
                let epoch = self
                    .store
                    .accept_refreshed_token(body.token.clone(), self.clock.now());
                tracing::info!(epoch, "Access token refreshed");
                let _ = self.events.send(SessionEvent::TokenRefreshed);
                return RefreshOutcome::Refreshed {
                    token: body.token,
                    epoch,
                };
            }
            Ok(_) => "refresh response carried an empty token".to_string(),
            Err(e) => e.to_string(),
        };

        tracing::warn!(error = %failure, "Token refresh failed; clearing credentials");
        let epoch = self.store.clear_credentials();
        if let Some(scope) = self.scopes.take() {
            tracing::debug!(session_id = %scope.id, "Session scope stopped after failed refresh");
            scope.cancel();
        }
        let _ = self.events.send(SessionEvent::RefreshFailed { error: failure });
        RefreshOutcome::Failed { epoch }
    }
}
