//! CLI command definitions and dispatch.

pub mod config;
pub mod gate;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod request;
pub mod role;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use compliance_core::AppError;
use compliance_core::config::AppConfig;
use compliance_session::{FileStorage, HistoryNavigator, HttpAuthApi, SessionManager, SessionStore};

use crate::output::OutputFormat;

/// Compliance Console session lifecycle client
#[derive(Debug, Parser)]
#[command(name = "compliance", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in with a username and password
    Login(login::LoginArgs),
    /// End the current session
    Logout,
    /// Show the stored session
    Status,
    /// Exchange the refresh cookie for a new token
    Refresh,
    /// Compare the cached role with the backend's
    CheckRole,
    /// Evaluate the route gate for a route
    Gate(gate::GateArgs),
    /// Send an authorized API request
    Request(request::RequestArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Login(args) => login::execute(args, &self.config, self.format).await,
            Commands::Logout => logout::execute(&self.config).await,
            Commands::Status => status::execute(&self.config, self.format).await,
            Commands::Refresh => refresh::execute(&self.config).await,
            Commands::CheckRole => role::execute(&self.config, self.format).await,
            Commands::Gate(args) => gate::execute(args, &self.config, self.format).await,
            Commands::Request(args) => request::execute(args, &self.config).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {e}")))
}

/// Everything a command needs to act on the persisted session.
///
/// The CLI always persists to the configured file path, whatever backend the
/// configuration selects, so that state survives between invocations.
pub struct Session {
    /// Loaded configuration.
    pub config: AppConfig,
    /// HTTP client holding the refresh cookie.
    pub api: HttpAuthApi,
    /// Session manager over the file-backed store.
    pub manager: Arc<SessionManager>,
    cookie_path: PathBuf,
}

impl Session {
    /// Open the persisted session described by the configuration at `config_path`.
    pub fn open(config_path: &str) -> Result<Self, AppError> {
        let config = load_config(config_path)?;
        let api = HttpAuthApi::new(&config.api)?;

        let cookie_path = config.storage.cookie_path();
        api.load_cookies(&cookie_path)?;

        tracing::debug!(path = %config.storage.path, "Opening session store");
        let store = Arc::new(SessionStore::new(Arc::new(FileStorage::new(
            &config.storage.path,
        ))));
        let manager = SessionManager::builder(Arc::new(api.clone()), config.session.clone())
            .store(store)
            .navigator(Arc::new(HistoryNavigator::new()))
            .build();
        let manager = Arc::new(manager);

        Ok(Self {
            config,
            api,
            manager,
            cookie_path,
        })
    }

    /// Stop background tasks and persist the cookie jar.
    pub fn close(self) -> Result<(), AppError> {
        self.manager.shutdown();
        self.api.save_cookies(&self.cookie_path)
    }
}
