//! Session manager: wires the store, timers, role watcher, and gate together
//! and owns the per-login task scope.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use compliance_core::config::SessionConfig;
use compliance_core::events::session::{LogoutReason, SessionEvent};
use compliance_core::traits::{AuthApi, Clock, Navigator, Notifier, SystemClock};
use compliance_core::types::{InteractionSignal, SessionState};
use compliance_core::{AppError, AppResult};

use crate::activity::{ActivityDebouncer, ActivityTracker};
use crate::gate::{GateDecision, RouteGate};
use crate::idle::{DeadlineHandle, IdleMonitor};
use crate::logout::SessionTerminator;
use crate::navigation::{HistoryNavigator, TracingNotifier};
use crate::refresh::{RefreshOutcome, TokenRefresher, token_expired};
use crate::role::{RoleCheck, RoleWatcher};
use crate::scope::{ScopeSlot, SessionScope};
use crate::store::SessionStore;

/// Capacity of the session event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Builder for [`SessionManager`].
#[derive(Debug)]
pub struct SessionManagerBuilder {
    api: Arc<dyn AuthApi>,
    config: SessionConfig,
    store: Option<Arc<SessionStore>>,
    clock: Option<Arc<dyn Clock>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl SessionManagerBuilder {
    /// Use `store` instead of a fresh in-memory store.
    pub fn store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `clock` instead of the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use `navigator` instead of a [`HistoryNavigator`].
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Use `notifier` instead of a [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the manager.
    pub fn build(self) -> SessionManager {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(SessionStore::in_memory()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(HistoryNavigator::new()));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let scopes = Arc::new(ScopeSlot::new());

        let terminator = Arc::new(SessionTerminator::new(
            store.clone(),
            scopes.clone(),
            navigator.clone(),
            events.clone(),
            self.config.login_route.clone(),
        ));
        let refresher = Arc::new(TokenRefresher::new(
            self.api.clone(),
            store.clone(),
            scopes.clone(),
            clock.clone(),
            events.clone(),
        ));
        let idle = Arc::new(IdleMonitor::new(
            store.clone(),
            clock.clone(),
            terminator.clone(),
            self.config.idle_timeout(),
            self.config.idle_check_interval(),
        ));
        let role_watcher = Arc::new(RoleWatcher::new(
            self.api.clone(),
            store.clone(),
            refresher.clone(),
            terminator.clone(),
            notifier,
            clock.clone(),
            events.clone(),
        ));
        let gate = RouteGate::new(
            store.clone(),
            clock.clone(),
            navigator.clone(),
            terminator.clone(),
            self.config.idle_timeout(),
        );

        SessionManager {
            config: self.config,
            api: self.api,
            store,
            clock,
            navigator,
            scopes,
            terminator,
            refresher,
            idle,
            role_watcher,
            gate,
            events,
            tasks: TaskTracker::new(),
        }
    }
}

/// Entry point of the session subsystem.
///
/// Owns the store and at most one running session scope. Starting a scope
/// cancels the previous one; every task of a scope selects on the scope's
/// cancellation token and checks the store generation before acting.
#[derive(Debug)]
pub struct SessionManager {
    config: SessionConfig,
    api: Arc<dyn AuthApi>,
    store: Arc<SessionStore>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    scopes: Arc<ScopeSlot>,
    terminator: Arc<SessionTerminator>,
    refresher: Arc<TokenRefresher>,
    idle: Arc<IdleMonitor>,
    role_watcher: Arc<RoleWatcher>,
    gate: RouteGate,
    events: broadcast::Sender<SessionEvent>,
    tasks: TaskTracker,
}

impl SessionManager {
    /// Start building a manager over `api` with `config`.
    pub fn builder(api: Arc<dyn AuthApi>, config: SessionConfig) -> SessionManagerBuilder {
        SessionManagerBuilder {
            api,
            config,
            store: None,
            clock: None,
            navigator: None,
            notifier: None,
        }
    }

    /// Log in with credentials and start a session scope.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<SessionState> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("Username and password are required"));
        }

        let response = self.api.login(username, password).await?;
        if response.token.trim().is_empty() {
            return Err(AppError::authentication("Login response carried no token"));
        }

        let role = response.resolved_role().map(str::to_string);
        let epoch = self
            .store
            .begin(response.token, role, response.user, self.clock.now());
        self.start_scope(epoch);
        self.navigator.navigate(&self.config.home_route);

        Ok(self.store.get())
    }

    /// Resume on application start.
    ///
    /// A stored, unexpired token resumes its session. Otherwise one refresh
    /// exchange is attempted, and on failure the client goes to the login
    /// route. Returns whether a session is running afterwards.
    pub async fn bootstrap(&self) -> bool {
        let (state, epoch) = self.store.snapshot();
        let now = self.clock.now();

        if let Some(token) = state.authenticated_token() {
            if self.idle.is_expired_now() {
                tracing::info!("Stored session exceeded the idle threshold");
                self.terminator.terminate(LogoutReason::IdleTimeout);
                return false;
            }
            if state.is_consistent() && !token_expired(token, now) {
                tracing::info!(
                    epoch,
                    user_id = ?state.authenticated_user_id(),
                    "Resuming stored session"
                );
                self.start_scope(epoch);
                return true;
            }
            tracing::debug!("Stored token expired; attempting refresh");
        }

        if self.refresh().await.is_some() {
            return true;
        }

        self.navigator.navigate(&self.config.login_route);
        false
    }

    /// Log out at the user's request.
    ///
    /// The backend is told first, best effort; the local session ends even
    /// when that call fails. Returns whether a session was live.
    pub async fn logout(&self) -> bool {
        let state = self.store.get();
        if let Some(token) = state.authenticated_token() {
            if let Err(e) = self.api.logout(token).await {
                tracing::warn!(error = %e, "Backend logout failed; ending local session anyway");
            }
        }
        self.terminator.terminate(LogoutReason::Manual)
    }

    /// Feed an interaction signal to the running scope.
    ///
    /// Ignored, returning `false`, when no session scope is running.
    pub fn record_activity(&self, signal: InteractionSignal) -> bool {
        self.scopes
            .activity()
            .is_some_and(|tracker| tracker.record(signal))
    }

    /// Evaluate `route` against the gate.
    pub fn gate(&self, route: &str) -> GateDecision {
        self.gate.evaluate(route)
    }

    /// Evaluate `route` and navigate to it when allowed.
    pub fn navigate(&self, route: &str) -> GateDecision {
        let decision = self.gate.evaluate(route);
        if decision.is_allowed() {
            self.navigator.navigate(route);
        }
        decision
    }

    /// Run one refresh exchange.
    ///
    /// A token that starts a new session generation, or arrives while no
    /// scope is running, gets a fresh scope. A failure leaves no scope.
    pub async fn refresh(&self) -> Option<String> {
        match self.refresher.exchange().await {
            RefreshOutcome::Refreshed { token, epoch } => {
                if self.scopes.current_epoch() != Some(epoch) {
                    self.start_scope(epoch);
                }
                Some(token)
            }
            RefreshOutcome::Failed { .. } => None,
        }
    }

    /// Run one role poll for the current session.
    pub async fn check_role(&self) -> RoleCheck {
        self.role_watcher.poll_once(self.store.epoch()).await
    }

    /// Stop the running scope without touching the store.
    pub fn shutdown(&self) {
        if let Some(scope) = self.scopes.take() {
            tracing::debug!(session_id = %scope.id, "Session scope stopped");
            scope.cancel();
        }
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The session store.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// A copy of the current session record.
    pub fn state(&self) -> SessionState {
        self.store.get()
    }

    /// Number of session tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Whether a session scope is running.
    pub fn has_scope(&self) -> bool {
        self.scopes.current_id().is_some()
    }

    fn start_scope(&self, epoch: u64) {
        let cancel = CancellationToken::new();
        let deadline = DeadlineHandle::new();
        let (activity, signals) =
            ActivityTracker::channel(self.store.clone(), self.clock.clone(), epoch);
        let scope = SessionScope::new(epoch, cancel.clone(), activity);
        let session_id = scope.id;

        if let Some(previous) = self.scopes.install(scope) {
            tracing::debug!(session_id = %previous.id, "Replacing running session scope");
            previous.cancel();
        }

        let debouncer = ActivityDebouncer {
            store: self.store.clone(),
            deadline: deadline.clone(),
            events: self.events.clone(),
            window: self.config.activity_debounce(),
            epoch,
            session_id,
        };
        self.tasks.spawn(debouncer.run(signals, cancel.clone()));
        self.tasks
            .spawn(self.idle.clone().run_deadline(epoch, deadline, cancel.clone()));
        self.tasks
            .spawn(self.idle.clone().run_periodic(epoch, cancel.clone()));

        let state = self.store.get();
        if self.config.role_watch_enabled && state.authenticated_user_id().is_some() {
            self.tasks.spawn(self.role_watcher.clone().run(
                epoch,
                self.config.role_poll_interval(),
                cancel,
            ));
        }

        let user_id = state.authenticated_user_id().map(str::to_string);
        tracing::info!(session_id = %session_id, epoch, user_id = ?user_id, "Session started");
        let _ = self
            .events
            .send(SessionEvent::Started { session_id, user_id });
    }
}
