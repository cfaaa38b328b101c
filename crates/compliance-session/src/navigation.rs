//! Default navigation and notice sinks for headless clients.

use parking_lot::Mutex;

use compliance_core::traits::{Navigator, Notice, NoticeLevel, Notifier};

/// A navigator that records the routes it was sent to.
///
/// Navigating to the current route does not add a history entry.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    /// Create a navigator with an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a navigator already showing `route`.
    pub fn starting_at(route: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![route.into()]),
        }
    }

    /// Every route navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: &str) {
        let mut history = self.history.lock();
        if history.last().is_some_and(|current| current == route) {
            return;
        }
        tracing::debug!(route = %route, "Navigating");
        history.push(route.to_string());
    }

    fn current_route(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

/// A notifier that writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!(notice = %notice.message, "User notice"),
            NoticeLevel::Warning => tracing::warn!(notice = %notice.message, "User notice"),
        }
    }
}
