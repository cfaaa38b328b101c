//! Interaction signal intake and the debounced deadline re-arm.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use compliance_core::events::session::SessionEvent;
use compliance_core::traits::Clock;
use compliance_core::types::InteractionSignal;

use crate::idle::DeadlineHandle;
use crate::store::SessionStore;

/// Receives interaction signals for one session scope.
///
/// Every signal is written to the store as it arrives, so idle checks never
/// see a stale activity time. Only the deadline re-arm is debounced.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    latest: watch::Sender<Option<DateTime<Utc>>>,
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    epoch: u64,
}

impl ActivityTracker {
    /// Create a tracker for the session of generation `epoch`, together with
    /// the receiver its debounce task consumes.
    pub fn channel(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        epoch: u64,
    ) -> (Self, watch::Receiver<Option<DateTime<Utc>>>) {
        let (latest, rx) = watch::channel(None);
        let tracker = Self {
            latest,
            store,
            clock,
            epoch,
        };
        (tracker, rx)
    }

    /// Record one signal at the current time.
    ///
    /// Returns `false`, dropping the signal, once the scope's debounce task
    /// has stopped or its session is no longer live.
    pub fn record(&self, signal: InteractionSignal) -> bool {
        if self.latest.is_closed() || !self.store.is_current(self.epoch) {
            return false;
        }
        let at = self.clock.now();
        tracing::trace!(signal = %signal, "Interaction signal");
        self.store.touch(self.epoch, at);
        self.latest.send_replace(Some(at));
        true
    }
}

/// Re-arms the idle deadline once a burst of signals goes quiet.
#[derive(Debug)]
pub struct ActivityDebouncer {
    /// Store holding the session this debouncer belongs to.
    pub store: Arc<SessionStore>,
    /// Deadline timer to re-arm after each burst.
    pub deadline: DeadlineHandle,
    /// Lifecycle event channel.
    pub events: broadcast::Sender<SessionEvent>,
    /// Quiet period that ends a burst.
    pub window: Duration,
    /// Store generation this debouncer serves.
    pub epoch: u64,
    /// Scope identifier, for events.
    pub session_id: Uuid,
}

impl ActivityDebouncer {
    /// Coalesce bursts of signals until the scope is cancelled.
    ///
    /// After `window` without a new signal the deadline timer is re-armed
    /// and one `ActivityRecorded` event carries the latest signal time.
    pub async fn run(
        self,
        mut signals: watch::Receiver<Option<DateTime<Utc>>>,
        cancel: CancellationToken,
    ) {
        'bursts: loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = signals.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break 'bursts,
                    changed = signals.changed() => {
                        if changed.is_err() {
                            break 'bursts;
                        }
                    }
                    _ = time::sleep(self.window) => break,
                }
            }

            let Some(at) = *signals.borrow_and_update() else {
                continue;
            };
            if !self.store.is_current(self.epoch) {
                break;
            }
            tracing::debug!(epoch = self.epoch, at = %at, "Activity recorded");
            self.deadline.reschedule();
            let _ = self.events.send(SessionEvent::ActivityRecorded {
                session_id: self.session_id,
                at,
            });
        }
        tracing::trace!(epoch = self.epoch, "Activity debounce task ended");
    }
}

#[cfg(test)]
mod tests {
    use compliance_core::traits::TokioClock;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_signals_are_stored_at_once_and_announced_per_burst() {
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::new());
        let store = Arc::new(SessionStore::in_memory());
        let epoch = store.begin("tok", None, None, clock.now());
        let (events_tx, mut events) = broadcast::channel(16);
        let (tracker, rx) = ActivityTracker::channel(store.clone(), clock.clone(), epoch);
        let cancel = CancellationToken::new();

        let debouncer = ActivityDebouncer {
            store: store.clone(),
            deadline: DeadlineHandle::new(),
            events: events_tx,
            window: Duration::from_secs(1),
            epoch,
            session_id: Uuid::new_v4(),
        };
        let task = tokio::spawn(debouncer.run(rx, cancel.clone()));

        for _ in 0..5 {
            time::advance(Duration::from_millis(200)).await;
            assert!(tracker.record(InteractionSignal::PointerMove));
            assert_eq!(store.get().last_activity_time, Some(clock.now()));
        }
        let last_signal = clock.now();
        assert!(events.try_recv().is_err());

        time::sleep(Duration::from_secs(2)).await;

        assert_eq!(store.get().last_activity_time, Some(last_signal));
        assert!(matches!(
            events.try_recv().unwrap(),
            SessionEvent::ActivityRecorded { at, .. } if at == last_signal
        ));
        assert!(events.try_recv().is_err());

        cancel.cancel();
        task.await.unwrap();
        assert!(!tracker.record(InteractionSignal::Click));
    }
}
