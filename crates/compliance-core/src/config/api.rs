//! Backend API endpoint configuration.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the user identifier in [`ApiConfig::user_path`].
const USER_ID_PLACEHOLDER: &str = "{id}";

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. `https://api.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Credential login endpoint.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Token refresh endpoint (ambient cookie credential).
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Logout endpoint.
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    /// User lookup endpoint; `{id}` is replaced by the user identifier.
    #[serde(default = "default_user_path")]
    pub user_path: String,
}

impl ApiConfig {
    /// Resolve the user lookup path for a given user identifier.
    pub fn user_path_for(&self, user_id: &str) -> String {
        self.user_path.replace(USER_ID_PLACEHOLDER, user_id)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            user_path: default_user_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_login_path() -> String {
    "/api/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/api/auth/refresh".to_string()
}

fn default_logout_path() -> String {
    "/api/auth/logout".to_string()
}

fn default_user_path() -> String {
    "/api/users/{id}".to_string()
}
