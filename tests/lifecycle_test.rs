//! Integration tests for login, logout, and session scope teardown.

mod helpers;

use std::sync::atomic::Ordering;

use compliance_core::error::ErrorKind;
use compliance_core::events::session::{LogoutReason, SessionEvent};
use compliance_core::traits::Navigator;

use helpers::{harness, session_config, settle, sleep_secs};

#[tokio::test(start_paused = true)]
async fn test_login_populates_store_and_starts_tasks() {
    let h = harness(session_config(true));
    let mut events = h.manager.subscribe();
    h.login().await;

    let state = h.manager.state();
    assert_eq!(state.token.as_deref(), Some("tok-1"));
    assert_eq!(state.role.as_deref(), Some("Admin"));
    assert_eq!(state.authenticated_user_id(), Some("42"));
    assert_eq!(state.login_time, state.last_activity_time);
    assert!(state.is_consistent());

    // Activity debounce, idle deadline, idle check, role watcher.
    assert_eq!(h.manager.active_tasks(), 4);
    assert!(h.manager.has_scope());
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Started { user_id: Some(ref id), .. } if id == "42"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_manual_logout_leaves_no_tasks() {
    let h = harness(session_config(true));
    h.login().await;
    let mut events = h.manager.subscribe();

    assert!(h.manager.logout().await);
    assert_eq!(h.api.logout_calls.load(Ordering::SeqCst), 1);
    assert!(h.manager.state().is_empty());
    assert!(!h.manager.has_scope());
    assert_eq!(h.navigator.current_route().as_deref(), Some("/login"));
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Ended {
            reason: LogoutReason::Manual,
            session_id: Some(_)
        }
    ));

    settle(&h.manager).await;

    // Nothing wakes up later either.
    let fetches = h.api.fetches();
    sleep_secs(2 * 24 * 60 * 60).await;
    assert_eq!(h.api.fetches(), fetches);
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_forced_logout_leaves_no_tasks() {
    let h = harness(session_config(true));
    h.login().await;

    sleep_secs(24 * 60 * 60 + 1).await;
    assert!(h.manager.state().is_empty());
    settle(&h.manager).await;
}

#[tokio::test(start_paused = true)]
async fn test_relogin_replaces_previous_scope() {
    let h = harness(session_config(true));
    h.login().await;
    let first_epoch = h.manager.store().epoch();

    h.login().await;
    assert!(h.manager.store().epoch() > first_epoch);

    settle_to(&h, 4).await;
    assert_eq!(h.manager.active_tasks(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credentials_leave_store_empty() {
    let h = harness(session_config(true));

    let err = h.manager.login("dana", "wrong").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert!(h.manager.state().is_empty());
    assert_eq!(h.manager.active_tasks(), 0);

    let err = h.manager.login("  ", "secret").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_keeps_store() {
    let h = harness(session_config(true));
    h.login().await;

    h.manager.shutdown();
    settle(&h.manager).await;

    assert!(h.manager.state().is_authenticated());
    assert_eq!(h.navigator.current_route().as_deref(), Some("/"));
}

async fn settle_to(h: &helpers::Harness, expected: usize) {
    for _ in 0..100 {
        if h.manager.active_tasks() == expected {
            return;
        }
        tokio::task::yield_now().await;
    }
}
