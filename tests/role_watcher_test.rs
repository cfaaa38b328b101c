//! Integration tests for role change detection.

mod helpers;

use compliance_core::events::session::{LogoutReason, SessionEvent};
use compliance_core::traits::{Navigator, NoticeLevel};
use compliance_session::RoleCheck;

use helpers::{harness, session_config, settle, sleep_secs};

#[tokio::test(start_paused = true)]
async fn test_equivalent_role_keeps_session() {
    let h = harness(session_config(true));
    h.login().await;
    h.api.set_backend_role(" admin ");

    sleep_secs(35).await;

    assert!(h.api.fetches() >= 3);
    assert!(h.manager.state().is_authenticated());
    assert!(h.notifier.notices.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_changed_role_logs_out_exactly_once() {
    let h = harness(session_config(true));
    h.login().await;
    let mut events = h.manager.subscribe();
    h.api.set_backend_role("Manager");

    sleep_secs(11).await;

    assert!(h.manager.state().is_empty());
    assert_eq!(h.navigator.current_route().as_deref(), Some("/login"));
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::RoleChanged { ref observed, .. } if observed == "Manager"
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Ended {
            reason: LogoutReason::RoleChanged,
            ..
        }
    ));

    let notices = h.notifier.notices.lock().clone();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Warning);

    // Polling stopped with the session.
    settle(&h.manager).await;
    let fetches = h.api.fetches();
    sleep_secs(60).await;
    assert_eq!(h.api.fetches(), fetches);
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_keep_polling() {
    let h = harness(session_config(true));
    h.login().await;
    *h.api.lookups_unavailable.lock() = true;

    sleep_secs(35).await;
    assert!(h.api.fetches() >= 3);
    assert!(h.manager.state().is_authenticated());

    *h.api.lookups_unavailable.lock() = false;
    h.api.set_backend_role("Auditor");
    sleep_secs(10).await;
    assert!(h.manager.state().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_token_is_refreshed() {
    let h = harness(session_config(true));
    h.login().await;
    h.api.reject("tok-1");
    h.api.set_refresh_token(Some("tok-2"));

    sleep_secs(11).await;
    assert_eq!(h.api.refreshes(), 1);
    assert_eq!(h.manager.state().token.as_deref(), Some("tok-2"));

    let fetches = h.api.fetches();
    sleep_secs(10).await;
    assert_eq!(h.api.fetches(), fetches + 1);
    assert_eq!(h.api.refreshes(), 1);
    assert!(h.manager.state().is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_token_without_refresh_logs_out() {
    let h = harness(session_config(true));
    h.login().await;
    let mut events = h.manager.subscribe();
    h.api.reject("tok-1");

    sleep_secs(11).await;

    assert!(h.manager.state().is_empty());
    assert_eq!(h.navigator.current_route().as_deref(), Some("/login"));
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::RefreshFailed { .. }
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::Ended {
            reason: LogoutReason::RefreshFailed,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_manual_check_reports_outcome() {
    let h = harness(session_config(false));
    assert!(matches!(h.manager.check_role().await, RoleCheck::NoSession));

    h.login().await;
    assert!(matches!(h.manager.check_role().await, RoleCheck::Unchanged));

    *h.api.backend_role.lock() = None;
    assert!(matches!(h.manager.check_role().await, RoleCheck::NoRole));
    assert!(h.manager.state().is_authenticated());

    h.api.set_backend_role("viewer");
    match h.manager.check_role().await {
        RoleCheck::Changed { cached, observed } => {
            assert_eq!(cached.as_deref(), Some("Admin"));
            assert_eq!(observed, "viewer");
        }
        other => panic!("expected a role change, got {other:?}"),
    }
    assert!(h.manager.state().is_empty());
}
