//! Session lifecycle configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle threshold in minutes before a session is force-logged-out.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
    /// Interval of the periodic idle re-check in seconds.
    #[serde(default = "default_idle_check_interval")]
    pub idle_check_interval_seconds: u64,
    /// Trailing debounce window applied to interaction signals, in milliseconds.
    #[serde(default = "default_activity_debounce")]
    pub activity_debounce_millis: u64,
    /// Interval between role polls in seconds.
    #[serde(default = "default_role_poll_interval")]
    pub role_poll_interval_seconds: u64,
    /// Whether the role watcher runs at all.
    #[serde(default = "default_true")]
    pub role_watch_enabled: bool,
    /// The only unauthenticated route.
    #[serde(default = "default_login_route")]
    pub login_route: String,
    /// Route shown after a successful login.
    #[serde(default = "default_home_route")]
    pub home_route: String,
}

impl SessionConfig {
    /// Idle threshold.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_minutes * 60)
    }

    /// Periodic idle re-check interval.
    pub fn idle_check_interval(&self) -> Duration {
        Duration::from_secs(self.idle_check_interval_seconds.max(1))
    }

    /// Trailing debounce window for activity signals.
    pub fn activity_debounce(&self) -> Duration {
        Duration::from_millis(self.activity_debounce_millis)
    }

    /// Role poll interval.
    pub fn role_poll_interval(&self) -> Duration {
        Duration::from_secs(self.role_poll_interval_seconds.max(1))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout(),
            idle_check_interval_seconds: default_idle_check_interval(),
            activity_debounce_millis: default_activity_debounce(),
            role_poll_interval_seconds: default_role_poll_interval(),
            role_watch_enabled: true,
            login_route: default_login_route(),
            home_route: default_home_route(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    24 * 60
}

fn default_idle_check_interval() -> u64 {
    5 * 60
}

fn default_activity_debounce() -> u64 {
    1000
}

fn default_role_poll_interval() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_home_route() -> String {
    "/".to_string()
}
