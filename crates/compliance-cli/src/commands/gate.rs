//! Route gate command.

use clap::Args;

use compliance_core::AppError;
use compliance_session::{DenyReason, GateDecision};

use super::Session;
use crate::output::{self, OutputFormat};

/// Arguments for gate
#[derive(Debug, Args)]
pub struct GateArgs {
    /// Route to evaluate, e.g. `/audits`
    pub route: String,
}

/// Execute gate
pub async fn execute(
    args: &GateArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let session = Session::open(config_path)?;
    let decision = session.manager.gate(&args.route);
    session.close()?;

    match format {
        OutputFormat::Json => output::print_json(&decision),
        OutputFormat::Table => match &decision {
            GateDecision::Allowed => output::print_success(&format!("{} allowed", args.route)),
            GateDecision::Denied {
                redirect_to,
                reason,
            } => {
                let why = match reason {
                    DenyReason::Unauthenticated => "not logged in",
                    DenyReason::IdleExpired => "session idle too long; logged out",
                };
                output::print_warning(&format!(
                    "{} denied ({why}); redirect to {redirect_to}",
                    args.route
                ));
            }
        },
    }
    Ok(())
}
