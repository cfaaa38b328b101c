//! Authorized API request command.

use clap::Args;
use serde_json::Value;

use compliance_core::AppError;
use compliance_session::AuthorizedClient;
use compliance_session::client::Method;

use super::Session;
use crate::output;

/// Arguments for request
#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method, e.g. GET or POST
    pub method: String,
    /// API path, e.g. `/api/audits`
    pub path: String,
    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,
}

/// Execute request
///
/// The response is always printed as JSON.
pub async fn execute(args: &RequestArgs, config_path: &str) -> Result<(), AppError> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .map_err(|e| AppError::validation(format!("Invalid HTTP method '{}': {e}", args.method)))?;
    let body: Option<Value> = args
        .data
        .as_deref()
        .map(|raw| serde_json::from_str::<Value>(raw))
        .transpose()
        .map_err(|e| AppError::validation(format!("Request body is not valid JSON: {e}")))?;

    let session = Session::open(config_path)?;
    let client = AuthorizedClient::new(session.api.clone(), session.manager.clone());
    let result = client.send_json(method, &args.path, body.as_ref()).await;
    session.close()?;

    output::print_json(&result?);
    Ok(())
}
