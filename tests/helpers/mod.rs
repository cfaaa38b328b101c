//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use compliance_core::config::SessionConfig;
use compliance_core::traits::{AuthApi, Clock, Notice, Notifier, TokioClock};
use compliance_core::types::{LoginResponse, RefreshResponse, UserProfile, UserRoleResponse};
use compliance_core::{AppError, AppResult};
use compliance_session::{HistoryNavigator, SessionManager, SessionStore};

/// In-process stand-in for the backend.
#[derive(Debug)]
pub struct FakeApi {
    /// Role returned by user lookups.
    pub backend_role: Mutex<Option<String>>,
    /// Role returned by login.
    pub login_role: Mutex<String>,
    /// Token the next refresh returns; `None` answers `401`.
    pub refresh_token: Mutex<Option<String>>,
    /// Tokens user lookups reject with `401`.
    pub rejected_tokens: Mutex<HashSet<String>>,
    /// When set, user lookups fail with a transport error.
    pub lookups_unavailable: Mutex<bool>,
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            backend_role: Mutex::new(Some("Admin".to_string())),
            login_role: Mutex::new("Admin".to_string()),
            refresh_token: Mutex::new(None),
            rejected_tokens: Mutex::new(HashSet::new()),
            lookups_unavailable: Mutex::new(false),
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_backend_role(&self, role: &str) {
        *self.backend_role.lock() = Some(role.to_string());
    }

    pub fn set_refresh_token(&self, token: Option<&str>) {
        *self.refresh_token.lock() = token.map(str::to_string);
    }

    pub fn reject(&self, token: &str) {
        self.rejected_tokens.lock().insert(token.to_string());
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if password != "secret" {
            return Err(AppError::authentication("login rejected: HTTP 401"));
        }
        Ok(LoginResponse {
            token: "tok-1".to_string(),
            user: Some(
                UserProfile::new("42")
                    .with_name(username)
                    .with_role(self.login_role.lock().clone()),
            ),
            role: None,
        })
    }

    async fn refresh(&self) -> AppResult<RefreshResponse> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match self.refresh_token.lock().clone() {
            Some(token) => Ok(RefreshResponse { token }),
            None => Err(AppError::authentication("refresh rejected: HTTP 401")),
        }
    }

    async fn fetch_user(&self, _user_id: &str, token: &str) -> AppResult<UserRoleResponse> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if *self.lookups_unavailable.lock() {
            return Err(AppError::network("user lookup request failed: connection refused"));
        }
        if self.rejected_tokens.lock().contains(token) {
            return Err(AppError::authentication("user lookup rejected: HTTP 401"));
        }
        Ok(UserRoleResponse {
            role: self.backend_role.lock().clone(),
            ..UserRoleResponse::default()
        })
    }

    async fn logout(&self, _token: &str) -> AppResult<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Notifier that keeps every notice.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().push(notice.clone());
    }
}

/// Tokio-driven wall clock that can also leap forward without firing timers,
/// the way a host that was suspended sees it on wake-up.
#[derive(Debug)]
pub struct SuspendableClock {
    inner: TokioClock,
    skipped: Mutex<chrono::Duration>,
}

impl SuspendableClock {
    pub fn new() -> Self {
        Self {
            inner: TokioClock::new(),
            skipped: Mutex::new(chrono::Duration::zero()),
        }
    }

    /// Advance wall time by `by` while monotonic timers stand still.
    pub fn suspend_for(&self, by: chrono::Duration) {
        *self.skipped.lock() += by;
    }
}

impl Clock for SuspendableClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.now() + *self.skipped.lock()
    }
}

/// A manager wired to fakes, running on the tokio clock.
pub struct Harness {
    pub manager: Arc<SessionManager>,
    pub api: Arc<FakeApi>,
    pub navigator: Arc<HistoryNavigator>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<SuspendableClock>,
}

/// Default session settings with the role watcher on or off.
pub fn session_config(role_watch_enabled: bool) -> SessionConfig {
    SessionConfig {
        role_watch_enabled,
        ..SessionConfig::default()
    }
}

/// Build a harness over a fresh in-memory store.
///
/// Must be called inside the test runtime so the clock is anchored to it.
pub fn harness(config: SessionConfig) -> Harness {
    harness_with_store(config, Arc::new(SessionStore::in_memory()))
}

/// Build a harness over `store`.
pub fn harness_with_store(config: SessionConfig, store: Arc<SessionStore>) -> Harness {
    let api = Arc::new(FakeApi::new());
    let navigator = Arc::new(HistoryNavigator::starting_at("/"));
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(SuspendableClock::new());

    let manager = SessionManager::builder(api.clone(), config)
        .store(store)
        .clock(clock.clone())
        .navigator(navigator.clone())
        .notifier(notifier.clone())
        .build();
    let manager = Arc::new(manager);

    Harness {
        manager,
        api,
        navigator,
        notifier,
        clock,
    }
}

impl Harness {
    /// Log in as `dana` with the correct password.
    pub async fn login(&self) {
        self.manager
            .login("dana", "secret")
            .await
            .expect("login should succeed");
    }

    /// Wall-clock time according to the tokio clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// Wait until every session task has exited.
pub async fn settle(manager: &SessionManager) {
    for _ in 0..100 {
        if manager.active_tasks() == 0 {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("{} session tasks still running", manager.active_tasks());
}

/// Sleep in virtual time.
pub async fn sleep_secs(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
