//! Login command.

use clap::Args;

use compliance_core::AppError;

use super::Session;
use super::status::print_session;
use crate::output::{self, OutputFormat};

/// Arguments for login
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (will prompt if not provided)
    #[arg(short, long)]
    pub username: Option<String>,
    /// Password (will prompt if not provided)
    #[arg(short, long)]
    pub password: Option<String>,
}

/// Execute login
pub async fn execute(
    args: &LoginArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let username = match &args.username {
        Some(u) => u.clone(),
        None => dialoguer::Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
    };
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?,
    };

    let session = Session::open(config_path)?;
    let state = session.manager.login(&username, &password).await?;

    output::print_success(&format!(
        "Logged in as {}",
        state
            .authenticated_user()
            .map(|u| u.display_name().to_string())
            .unwrap_or(username)
    ));
    print_session(&state, session.config.session.idle_timeout(), format);

    session.close()
}
