//! Integration tests for idle timeout enforcement.

mod helpers;

use std::time::Duration;

use chrono::Duration as ChronoDuration;

use compliance_core::events::session::{LogoutReason, SessionEvent};
use compliance_core::traits::Navigator;
use compliance_core::types::InteractionSignal;

use helpers::{harness, session_config, settle, sleep_secs};

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

#[tokio::test(start_paused = true)]
async fn test_idle_session_is_logged_out_at_threshold() {
    let h = harness(session_config(false));
    h.login().await;
    let mut events = h.manager.subscribe();

    sleep_secs(DAY - 1).await;
    assert!(h.manager.state().is_authenticated());

    sleep_secs(2).await;
    assert!(h.manager.state().is_empty());
    assert_eq!(h.navigator.current_route().as_deref(), Some("/login"));
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Ended {
            reason: LogoutReason::IdleTimeout,
            ..
        }
    ));

    settle(&h.manager).await;
}

#[tokio::test(start_paused = true)]
async fn test_deadline_moves_with_latest_activity() {
    let h = harness(session_config(false));
    h.login().await;
    let login = h.now();

    sleep_secs(23 * HOUR).await;
    assert!(h.manager.record_activity(InteractionSignal::KeyPress));
    let signal_time = h.now();

    // The original deadline at login + 24h must not fire.
    sleep_secs(HOUR + 60).await;
    let state = h.manager.state();
    assert!(state.is_authenticated());
    assert_eq!(state.last_activity_time, Some(signal_time));
    assert!(h.now() > login + ChronoDuration::hours(24));

    // The new deadline is exactly signal time + 24h.
    let remaining = (signal_time + ChronoDuration::hours(24) - h.now())
        .to_std()
        .unwrap();
    tokio::time::sleep(remaining - Duration::from_millis(10)).await;
    assert!(h.manager.state().is_authenticated());

    sleep_secs(1).await;
    assert!(h.manager.state().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_signals_is_announced_once() {
    let h = harness(session_config(false));
    h.login().await;
    let mut events = h.manager.subscribe();

    sleep_secs(60).await;
    for signal in InteractionSignal::ALL {
        assert!(h.manager.record_activity(signal));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let last = h.now() - ChronoDuration::milliseconds(100);

    sleep_secs(5).await;
    assert_eq!(h.manager.state().last_activity_time, Some(last));
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::ActivityRecorded { at, .. } if at == last
    ));
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_periodic_check_catches_stale_activity() {
    let h = harness(session_config(false));
    h.login().await;
    let mut events = h.manager.subscribe();

    // The wall clock leaps past the threshold while the deadline timer is still far off.
    sleep_secs(60).await;
    h.clock.suspend_for(ChronoDuration::hours(25));
    assert!(h.manager.state().is_authenticated());

    sleep_secs(4 * 60 + 1).await;
    assert!(h.manager.state().is_empty());
    assert_eq!(h.navigator.current_route().as_deref(), Some("/login"));
    assert!(matches!(
        events.recv().await.unwrap(),
        SessionEvent::Ended {
            reason: LogoutReason::IdleTimeout,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_signal_just_before_deadline_keeps_session() {
    let h = harness(session_config(false));
    h.login().await;

    tokio::time::sleep(Duration::from_secs(DAY) - Duration::from_millis(500)).await;
    assert!(h.manager.record_activity(InteractionSignal::KeyPress));
    let signal_time = h.now();
    assert_eq!(h.manager.state().last_activity_time, Some(signal_time));

    // The original deadline passes inside the quiet window.
    sleep_secs(2).await;
    let state = h.manager.state();
    assert!(state.is_authenticated());
    assert_eq!(state.last_activity_time, Some(signal_time));
    assert_eq!(h.navigator.current_route().as_deref(), Some("/"));
}

#[tokio::test(start_paused = true)]
async fn test_continuous_signals_reach_the_store_immediately() {
    let h = harness(session_config(false));
    h.login().await;
    let mut events = h.manager.subscribe();

    sleep_secs(60).await;
    for _ in 0..6 {
        assert!(h.manager.record_activity(InteractionSignal::Scroll));
        assert_eq!(h.manager.state().last_activity_time, Some(h.now()));
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    // A burst that never goes quiet is not announced yet.
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_signals_without_session_are_ignored() {
    let h = harness(session_config(false));
    assert!(!h.manager.record_activity(InteractionSignal::Click));

    h.login().await;
    h.manager.logout().await;
    settle(&h.manager).await;

    assert!(!h.manager.record_activity(InteractionSignal::Click));
    assert!(h.manager.state().is_empty());
}
