//! Session termination.
//!
//! Every logout path, manual or forced, ends here: the scope is cancelled,
//! the store is cleared, and only then is the client sent to the login route.

use std::sync::Arc;

use tokio::sync::broadcast;

use compliance_core::events::session::{LogoutReason, SessionEvent};
use compliance_core::traits::Navigator;

use crate::scope::ScopeSlot;
use crate::store::SessionStore;

/// Tears a session down.
#[derive(Debug)]
pub struct SessionTerminator {
    store: Arc<SessionStore>,
    scopes: Arc<ScopeSlot>,
    navigator: Arc<dyn Navigator>,
    events: broadcast::Sender<SessionEvent>,
    login_route: String,
}

impl SessionTerminator {
    /// Create a terminator.
    pub fn new(
        store: Arc<SessionStore>,
        scopes: Arc<ScopeSlot>,
        navigator: Arc<dyn Navigator>,
        events: broadcast::Sender<SessionEvent>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            store,
            scopes,
            navigator,
            events,
            login_route: login_route.into(),
        }
    }

    /// Force the session of generation `epoch` to end.
    ///
    /// A no-op when the store has already moved to another generation or was
    /// already cleared, so racing forced logouts navigate and emit once.
    /// Returns whether this call ended the session.
    pub fn force(&self, epoch: u64, reason: LogoutReason) -> bool {
        let scope = self.scopes.take_if(epoch);
        if let Some(scope) = &scope {
            scope.cancel();
        }

        if !self.store.clear_if(epoch) {
            tracing::debug!(
                epoch,
                reason = %reason,
                "Forced logout skipped; session already ended"
            );
            return false;
        }

        let session_id = scope.map(|s| s.id);
        tracing::info!(
            epoch,
            session_id = ?session_id,
            reason = %reason,
            "Session ended by forced logout"
        );
        let _ = self.events.send(SessionEvent::Ended { session_id, reason });
        self.navigator.navigate(&self.login_route);
        true
    }

    /// End whatever session is current and go to the login route.
    ///
    /// Unlike [`force`](Self::force) this always navigates, even when nothing
    /// was stored. Returns whether a live session (a token) was present.
    pub fn terminate(&self, reason: LogoutReason) -> bool {
        let scope = self.scopes.take();
        if let Some(scope) = &scope {
            scope.cancel();
        }

        let had_token = self.store.clear();
        if had_token || scope.is_some() {
            let session_id = scope.map(|s| s.id);
            tracing::info!(session_id = ?session_id, reason = %reason, "Session ended");
            let _ = self.events.send(SessionEvent::Ended { session_id, reason });
        }

        self.navigator.navigate(&self.login_route);
        had_token
    }

    /// The route logouts redirect to.
    pub fn login_route(&self) -> &str {
        &self.login_route
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tokio_util::sync::CancellationToken;

    use compliance_core::traits::SystemClock;

    use super::*;
    use crate::activity::ActivityTracker;
    use crate::navigation::HistoryNavigator;
    use crate::scope::SessionScope;

    struct Fixture {
        store: Arc<SessionStore>,
        scopes: Arc<ScopeSlot>,
        navigator: Arc<HistoryNavigator>,
        events: broadcast::Receiver<SessionEvent>,
        terminator: SessionTerminator,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SessionStore::in_memory());
        let scopes = Arc::new(ScopeSlot::new());
        let navigator = Arc::new(HistoryNavigator::starting_at("/reports"));
        let (tx, events) = broadcast::channel(16);
        let terminator = SessionTerminator::new(
            store.clone(),
            scopes.clone(),
            navigator.clone(),
            tx,
            "/login",
        );
        Fixture {
            store,
            scopes,
            navigator,
            events,
            terminator,
        }
    }

    fn start(f: &Fixture) -> (u64, CancellationToken) {
        let epoch = f.store.begin("tok", Some("admin".into()), None, Utc::now());
        let cancel = CancellationToken::new();
        let (activity, _rx) =
            ActivityTracker::channel(f.store.clone(), Arc::new(SystemClock), epoch);
        f.scopes
            .install(SessionScope::new(epoch, cancel.clone(), activity));
        (epoch, cancel)
    }

    #[test]
    fn test_force_clears_cancels_and_navigates() {
        let mut f = fixture();
        let (epoch, cancel) = start(&f);

        assert!(f.terminator.force(epoch, LogoutReason::IdleTimeout));
        assert!(f.store.get().is_empty());
        assert!(cancel.is_cancelled());
        assert_eq!(f.navigator.current_route().as_deref(), Some("/login"));
        assert!(matches!(
            f.events.try_recv().unwrap(),
            SessionEvent::Ended {
                session_id: Some(_),
                reason: LogoutReason::IdleTimeout
            }
        ));
    }

    #[test]
    fn test_second_force_is_noop() {
        let mut f = fixture();
        let (epoch, _cancel) = start(&f);

        assert!(f.terminator.force(epoch, LogoutReason::RoleChanged));
        assert!(!f.terminator.force(epoch, LogoutReason::IdleTimeout));
        assert_eq!(f.navigator.history(), vec!["/reports", "/login"]);

        f.events.try_recv().unwrap();
        assert!(f.events.try_recv().is_err());
    }

    #[test]
    fn test_stale_force_leaves_new_session() {
        let f = fixture();
        let (old, _) = start(&f);
        let (_new, cancel) = start(&f);

        assert!(!f.terminator.force(old, LogoutReason::IdleTimeout));
        assert!(f.store.is_authenticated());
        assert!(!cancel.is_cancelled());
        assert_eq!(f.navigator.current_route().as_deref(), Some("/reports"));
    }

    #[test]
    fn test_terminate_without_session_still_navigates() {
        let f = fixture();
        assert!(!f.terminator.terminate(LogoutReason::Manual));
        assert_eq!(f.navigator.current_route().as_deref(), Some("/login"));
    }
}
