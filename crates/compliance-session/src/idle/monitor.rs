//! Idle timeout tasks: a re-armable deadline timer and a periodic check.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use compliance_core::events::session::LogoutReason;
use compliance_core::traits::Clock;

use super::predicate;
use crate::logout::SessionTerminator;
use crate::store::SessionStore;

/// Re-arms the deadline timer of one session scope.
///
/// The timer always recomputes its deadline from the store, so re-arming is
/// just a wake-up; there is never more than one pending deadline.
#[derive(Debug, Clone, Default)]
pub struct DeadlineHandle {
    rearm: Arc<Notify>,
}

impl DeadlineHandle {
    /// Create a handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the timer recompute its deadline.
    pub fn reschedule(&self) {
        self.rearm.notify_one();
    }

    async fn rearmed(&self) {
        self.rearm.notified().await;
    }
}

/// Enforces the idle threshold for a session scope.
#[derive(Debug)]
pub struct IdleMonitor {
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    terminator: Arc<SessionTerminator>,
    threshold: Duration,
    check_interval: Duration,
}

impl IdleMonitor {
    /// Create a monitor.
    pub fn new(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        terminator: Arc<SessionTerminator>,
        threshold: Duration,
        check_interval: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            terminator,
            threshold,
            check_interval,
        }
    }

    /// The idle threshold.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Whether the current session is past the idle threshold.
    pub fn is_expired_now(&self) -> bool {
        predicate::is_expired(&self.store.get(), self.clock.now(), self.threshold)
    }

    /// Sleep until `last_activity + threshold`, then log out if still idle.
    ///
    /// Wakes early whenever `deadline` is rescheduled and recomputes. Exits
    /// once the session of `epoch` is gone or the scope is cancelled.
    pub async fn run_deadline(
        self: Arc<Self>,
        epoch: u64,
        deadline: DeadlineHandle,
        cancel: CancellationToken,
    ) {
        loop {
            let (state, current) = self.store.snapshot();
            if current != epoch || !state.is_authenticated() {
                break;
            }

            let wait = predicate::deadline(&state, self.threshold)
                .map(|at| predicate::remaining(at, self.clock.now()))
                .unwrap_or(Duration::ZERO);
            tracing::trace!(epoch, wait_secs = wait.as_secs(), "Idle deadline armed");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = deadline.rearmed() => continue,
                _ = time::sleep(wait) => {
                    if self.expire_if_idle(epoch) {
                        break;
                    }
                }
            }
        }
        tracing::trace!(epoch, "Idle deadline task ended");
    }

    /// Re-check the idle predicate every `check_interval`.
    ///
    /// Backstop for a deadline timer that was delayed (e.g. a suspended host).
    pub async fn run_periodic(self: Arc<Self>, epoch: u64, cancel: CancellationToken) {
        let period = self.check_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let (state, current) = self.store.snapshot();
                    if current != epoch || !state.is_authenticated() {
                        break;
                    }
                    if self.expire_if_idle(epoch) {
                        break;
                    }
                }
            }
        }
        tracing::trace!(epoch, "Idle check task ended");
    }

    /// Re-validate against the store and force the logout if still idle.
    fn expire_if_idle(&self, epoch: u64) -> bool {
        let now = self.clock.now();
        let (state, current) = self.store.snapshot();
        if current != epoch || !predicate::is_expired(&state, now, self.threshold) {
            return false;
        }
        tracing::info!(
            epoch,
            last_activity = ?state.activity_reference(),
            "Idle threshold reached"
        );
        self.terminator.force(epoch, LogoutReason::IdleTimeout);
        true
    }
}
