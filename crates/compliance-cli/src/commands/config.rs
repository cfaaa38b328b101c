//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use compliance_core::AppError;

use crate::output::{self, Field, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            let fields = vec![
                Field::new("api.base_url", Some(&config.api.base_url)),
                Field::new("api.request_timeout_seconds", Some(config.api.request_timeout_seconds)),
                Field::new(
                    "session.idle_timeout_minutes",
                    Some(config.session.idle_timeout_minutes),
                ),
                Field::new(
                    "session.idle_check_interval_seconds",
                    Some(config.session.idle_check_interval_seconds),
                ),
                Field::new(
                    "session.activity_debounce_millis",
                    Some(config.session.activity_debounce_millis),
                ),
                Field::new(
                    "session.role_poll_interval_seconds",
                    Some(config.session.role_poll_interval_seconds),
                ),
                Field::new("session.role_watch_enabled", Some(config.session.role_watch_enabled)),
                Field::new("session.login_route", Some(&config.session.login_route)),
                Field::new("storage.backend", Some(config.storage.backend)),
                Field::new("storage.path", Some(&config.storage.path)),
                Field::new("logging.level", Some(&config.logging.level)),
                Field::new("logging.format", Some(&config.logging.format)),
            ];
            output::print_record(&config, &fields, format);
        }
    }

    Ok(())
}
