//! Per-login task scope.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::activity::ActivityTracker;

/// Handles owned by one login: its identity, the store generation it
/// belongs to, the cancellation token every task of the login selects on,
/// and the activity tracker that feeds its debounce task.
#[derive(Debug)]
pub struct SessionScope {
    /// Scope identifier, reported in session events.
    pub id: Uuid,
    /// Store generation this scope was started for.
    pub epoch: u64,
    cancel: CancellationToken,
    activity: ActivityTracker,
}

impl SessionScope {
    /// Create a scope.
    pub fn new(epoch: u64, cancel: CancellationToken, activity: ActivityTracker) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            cancel,
            activity,
        }
    }

    /// Stop every task of this scope.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the scope was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Holds the running scope, if any.
///
/// At most one scope exists at a time; installing a new one hands back the
/// previous scope so the caller can cancel it.
#[derive(Debug, Default)]
pub struct ScopeSlot {
    current: Mutex<Option<SessionScope>>,
}

impl ScopeSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `scope`, returning the one it replaces.
    pub fn install(&self, scope: SessionScope) -> Option<SessionScope> {
        self.current.lock().replace(scope)
    }

    /// Remove the running scope.
    pub fn take(&self) -> Option<SessionScope> {
        self.current.lock().take()
    }

    /// Remove the running scope only if it belongs to generation `epoch`.
    pub fn take_if(&self, epoch: u64) -> Option<SessionScope> {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|s| s.epoch == epoch) {
            current.take()
        } else {
            None
        }
    }

    /// Identifier of the running scope.
    pub fn current_id(&self) -> Option<Uuid> {
        self.current.lock().as_ref().map(|s| s.id)
    }

    /// Generation of the running scope.
    pub fn current_epoch(&self) -> Option<u64> {
        self.current.lock().as_ref().map(|s| s.epoch)
    }

    /// Activity tracker of the running scope.
    pub fn activity(&self) -> Option<ActivityTracker> {
        self.current.lock().as_ref().map(|s| s.activity.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use compliance_core::traits::SystemClock;

    use super::*;
    use crate::store::SessionStore;

    fn scope(epoch: u64) -> SessionScope {
        let store = Arc::new(SessionStore::in_memory());
        let (activity, _rx) = ActivityTracker::channel(store, Arc::new(SystemClock), epoch);
        SessionScope::new(epoch, CancellationToken::new(), activity)
    }

    #[test]
    fn test_install_returns_previous() {
        let slot = ScopeSlot::new();
        assert!(slot.install(scope(1)).is_none());

        let previous = slot.install(scope(2)).unwrap();
        assert_eq!(previous.epoch, 1);
        assert_eq!(slot.current_epoch(), Some(2));
    }

    #[test]
    fn test_take_if_ignores_other_generation() {
        let slot = ScopeSlot::new();
        slot.install(scope(3));

        assert!(slot.take_if(2).is_none());
        assert!(slot.current_id().is_some());
        assert_eq!(slot.take_if(3).map(|s| s.epoch), Some(3));
        assert!(slot.current_id().is_none());
    }
}
