//! Access check performed before a protected view is shown.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use compliance_core::events::session::LogoutReason;
use compliance_core::traits::{Clock, Navigator};

use crate::idle::predicate;
use crate::logout::SessionTerminator;
use crate::store::SessionStore;

/// Why a route was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No bearer token.
    Unauthenticated,
    /// The session was idle past the threshold and has been ended.
    IdleExpired,
}

/// Result of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// The route may be shown.
    Allowed,
    /// The route may not be shown; the client was sent to `redirect_to`.
    Denied {
        /// Where the client was sent instead.
        redirect_to: String,
        /// Why.
        reason: DenyReason,
    },
}

impl GateDecision {
    /// Whether the route may be shown.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Evaluates protected routes against the current store.
///
/// Every evaluation reads the store afresh; nothing is cached between calls.
#[derive(Debug)]
pub struct RouteGate {
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    terminator: Arc<SessionTerminator>,
    threshold: Duration,
}

impl RouteGate {
    /// Create a gate.
    pub fn new(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
        terminator: Arc<SessionTerminator>,
        threshold: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            navigator,
            terminator,
            threshold,
        }
    }

    /// Decide whether `route` may be shown.
    pub fn evaluate(&self, route: &str) -> GateDecision {
        let login_route = self.terminator.login_route();
        if route == login_route {
            return GateDecision::Allowed;
        }

        let state = self.store.get();
        if !state.is_authenticated() {
            tracing::debug!(route = %route, "Protected route without a session");
            self.navigator.navigate(login_route);
            return Self::denied(login_route, DenyReason::Unauthenticated);
        }

        if predicate::is_expired(&state, self.clock.now(), self.threshold) {
            tracing::info!(route = %route, "Protected route after idle threshold");
            self.terminator.terminate(LogoutReason::IdleTimeout);
            return Self::denied(login_route, DenyReason::IdleExpired);
        }

        GateDecision::Allowed
    }

    fn denied(login_route: &str, reason: DenyReason) -> GateDecision {
        GateDecision::Denied {
            redirect_to: login_route.to_string(),
            reason,
        }
    }
}
