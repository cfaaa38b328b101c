//! Logout command.

use compliance_core::AppError;

use super::Session;
use crate::output;

/// Execute logout
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let session = Session::open(config_path)?;

    if session.manager.logout().await {
        output::print_success("Logged out");
    } else {
        output::print_warning("No session was active");
    }

    session.close()
}
