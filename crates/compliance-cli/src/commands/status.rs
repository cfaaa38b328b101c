//! Session status command.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use compliance_core::AppError;
use compliance_core::types::SessionState;
use compliance_session::idle::predicate;

use super::Session;
use crate::output::{self, Field, OutputFormat};

/// What the CLI shows of a session record. The token is masked.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// Whether a token is present
    pub authenticated: bool,
    /// Masked token
    pub token: Option<String>,
    /// User ID
    pub user_id: Option<String>,
    /// Display name
    pub user_name: Option<String>,
    /// Cached role
    pub role: Option<String>,
    /// Login time
    pub login_time: Option<DateTime<Utc>>,
    /// Latest recorded activity
    pub last_activity_time: Option<DateTime<Utc>>,
    /// When the session expires without further activity
    pub idle_deadline: Option<DateTime<Utc>>,
}

impl SessionView {
    /// Build the view of `state` for an idle threshold of `threshold`.
    pub fn new(state: &SessionState, threshold: Duration) -> Self {
        let user = state.authenticated_user();
        Self {
            authenticated: state.is_authenticated(),
            token: state.authenticated_token().map(mask_token),
            user_id: user.map(|u| u.id.clone()),
            user_name: user.map(|u| u.display_name().to_string()),
            role: state.authenticated_role().map(str::to_string),
            login_time: state.login_time,
            last_activity_time: state.last_activity_time,
            idle_deadline: predicate::deadline(state, threshold),
        }
    }

    /// Table rows.
    pub fn fields(&self) -> Vec<Field> {
        vec![
            Field::new("Authenticated", Some(self.authenticated)),
            Field::new("Token", self.token.as_ref()),
            Field::new("User ID", self.user_id.as_ref()),
            Field::new("User", self.user_name.as_ref()),
            Field::new("Role", self.role.as_ref()),
            Field::new("Logged in", self.login_time.map(format_time)),
            Field::new("Last activity", self.last_activity_time.map(format_time)),
            Field::new("Idle deadline", self.idle_deadline.map(format_time)),
        ]
    }
}

/// Print the session record in the selected format.
pub fn print_session(state: &SessionState, threshold: Duration, format: OutputFormat) {
    let view = SessionView::new(state, threshold);
    output::print_record(&view, &view.fields(), format);
}

/// Execute status
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let session = Session::open(config_path)?;
    let state = session.manager.state();

    if !state.is_authenticated() {
        output::print_warning("Not logged in");
    }
    print_session(&state, session.config.session.idle_timeout(), format);

    session.close()
}

fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(6).collect();
    format!("{visible}…")
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
