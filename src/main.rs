//! Compliance Console session agent.
//!
//! Resumes the persisted session and keeps its lifecycle running: interaction
//! signals arrive one per line on stdin (`click`, `keydown`, ...), `goto
//! <route>` runs the route gate, and `logout` ends the session. The agent
//! exits when stdin closes, on Ctrl+C/SIGTERM, or when the session ends.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use compliance_core::AppError;
use compliance_core::config::{AppConfig, StorageBackend};
use compliance_core::events::session::SessionEvent;
use compliance_core::types::InteractionSignal;
use compliance_session::store::open_backend;
use compliance_session::{GateDecision, HttpAuthApi, SessionManager, SessionStore};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("COMPLIANCE_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

    AppConfig::load(&config_path)
        .map_err(|e| AppError::configuration(format!("Config load error: {}", e)))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Main agent loop
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting compliance agent v{}", env!("CARGO_PKG_VERSION"));

    let api = HttpAuthApi::new(&config.api)?;
    let cookie_path = config.storage.cookie_path();
    if config.storage.backend == StorageBackend::File {
        api.load_cookies(&cookie_path)?;
    }

    tracing::info!(backend = %config.storage.backend, "Opening session store");
    let store = Arc::new(SessionStore::new(open_backend(&config.storage)));
    let manager = SessionManager::builder(Arc::new(api.clone()), config.session.clone())
        .store(store)
        .build();
    let mut events = manager.subscribe();

    if !manager.bootstrap().await {
        tracing::warn!("No session to resume; log in first");
        return Ok(());
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Ended { reason, .. }) => {
                    tracing::info!(reason = %reason, "Session ended; stopping agent");
                    break;
                }
                Ok(event) => tracing::debug!(event = ?event, "Session event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => handle_line(&manager, line.trim()).await,
                None => {
                    tracing::info!("Input closed");
                    break;
                }
            },
        }
    }

    manager.shutdown();
    if config.storage.backend == StorageBackend::File {
        api.save_cookies(&cookie_path)?;
    }
    tracing::info!("Agent stopped");
    Ok(())
}

/// Act on one line of input
async fn handle_line(manager: &SessionManager, line: &str) {
    if line.is_empty() {
        return;
    }

    if let Some(route) = line.strip_prefix("goto ") {
        match manager.navigate(route.trim()) {
            GateDecision::Allowed => tracing::info!(route = %route.trim(), "Route allowed"),
            GateDecision::Denied {
                redirect_to,
                reason,
            } => tracing::warn!(
                route = %route.trim(),
                redirect_to = %redirect_to,
                reason = ?reason,
                "Route denied"
            ),
        }
        return;
    }

    if line == "logout" {
        manager.logout().await;
        return;
    }

    match line.parse::<InteractionSignal>() {
        Ok(signal) => {
            if !manager.record_activity(signal) {
                tracing::debug!(signal = %signal, "Signal ignored; no session running");
            }
        }
        Err(e) => tracing::warn!("{}", e),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
