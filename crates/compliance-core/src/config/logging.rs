//! Logging configuration.

use serde::{Deserialize, Serialize};

/// How the binaries set up their `tracing` subscriber.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `"info"` or `"compliance_session=debug"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// `"json"` for one object per line; anything else is human readable.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}
