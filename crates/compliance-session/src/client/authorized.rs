//! Bearer-authenticated requests with a single refresh-and-retry.

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde_json::Value;

use compliance_core::{AppError, AppResult};

use super::http::{HttpAuthApi, ensure_success, transport};
use crate::manager::SessionManager;

/// Sends API requests on behalf of the logged-in user.
///
/// A `401` answer triggers one refresh exchange through the manager, which
/// also restarts session tracking when the refresh revives a session. When it
/// yields a token the request is sent once more with it. A second `401`, or a
/// failed refresh, surfaces as an authentication error for the caller to
/// redirect on.
#[derive(Debug, Clone)]
pub struct AuthorizedClient {
    api: HttpAuthApi,
    manager: Arc<SessionManager>,
}

impl AuthorizedClient {
    /// Create a client sharing `api`'s connection pool and cookie jar.
    pub fn new(api: HttpAuthApi, manager: Arc<SessionManager>) -> Self {
        Self { api, manager }
    }

    /// Send `method path` with an optional JSON body and return the JSON answer.
    ///
    /// Empty bodies come back as `null`, non-JSON bodies as a JSON string.
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> AppResult<Value> {
        let token = self
            .manager
            .state()
            .authenticated_token()
            .map(str::to_string)
            .ok_or_else(|| AppError::authentication("Not logged in"))?;

        let response = self.dispatch(&method, path, body, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return read_body(ensure_success(response, "request").await?).await;
        }

        tracing::debug!(
            method = %method,
            path = %path,
            "Request rejected with 401; refreshing token"
        );
        let Some(fresh) = self.manager.refresh().await else {
            return Err(AppError::authentication(
                "Session expired and could not be refreshed",
            ));
        };

        let retried = self.dispatch(&method, path, body, &fresh).await?;
        read_body(ensure_success(retried, "request").await?).await
    }

    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: &str,
    ) -> AppResult<Response> {
        let mut request = self.api.request(method.clone(), path)?.bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(|e| transport("request", e))
    }
}

async fn read_body(response: Response) -> AppResult<Value> {
    let text = response.text().await.map_err(|e| transport("request", e))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
