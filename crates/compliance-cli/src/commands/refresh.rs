//! Token refresh command.

use compliance_core::AppError;

use super::Session;
use crate::output;

/// Execute refresh
///
/// A failed exchange clears the stored credentials, the same as in the
/// running client.
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let session = Session::open(config_path)?;
    let refreshed = session.manager.refresh().await;
    session.close()?;

    match refreshed {
        Some(_) => {
            output::print_success("Token refreshed");
            Ok(())
        }
        None => Err(AppError::authentication(
            "Refresh failed; credentials were cleared. Log in again.",
        )),
    }
}
