//! Role check command.

use serde::Serialize;

use compliance_core::AppError;
use compliance_session::RoleCheck;

use super::Session;
use crate::output::{self, Field, OutputFormat};

#[derive(Debug, Serialize)]
struct RoleCheckView {
    outcome: &'static str,
    cached: Option<String>,
    observed: Option<String>,
    detail: Option<String>,
}

/// Execute check-role
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let session = Session::open(config_path)?;
    let cached = session.manager.state().authenticated_role().map(str::to_string);
    let check = session.manager.check_role().await;
    session.close()?;

    let view = match check {
        RoleCheck::NoSession | RoleCheck::Stale => {
            return Err(AppError::authentication("Not logged in"));
        }
        RoleCheck::Unchanged => RoleCheckView {
            outcome: "unchanged",
            observed: cached.clone(),
            cached,
            detail: None,
        },
        RoleCheck::NoRole => RoleCheckView {
            outcome: "no_role",
            cached,
            observed: None,
            detail: Some("The user record carried no role".to_string()),
        },
        RoleCheck::Changed { cached, observed } => RoleCheckView {
            outcome: "changed",
            cached,
            observed: Some(observed),
            detail: Some("Session ended".to_string()),
        },
        RoleCheck::Transient(e) => RoleCheckView {
            outcome: "error",
            cached,
            observed: None,
            detail: Some(e.to_string()),
        },
        RoleCheck::Reauthenticated => RoleCheckView {
            outcome: "reauthenticated",
            cached,
            observed: None,
            detail: Some("Token was rejected and has been refreshed".to_string()),
        },
        RoleCheck::RefreshFailed => RoleCheckView {
            outcome: "refresh_failed",
            cached,
            observed: None,
            detail: Some(
                "Token was rejected and could not be refreshed; session ended".to_string(),
            ),
        },
    };

    let fields = vec![
        Field::new("Outcome", Some(view.outcome)),
        Field::new("Cached role", view.cached.as_ref()),
        Field::new("Backend role", view.observed.as_ref()),
        Field::new("Detail", view.detail.as_ref()),
    ];
    output::print_record(&view, &fields, format);
    Ok(())
}
