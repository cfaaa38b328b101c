//! reqwest implementation of the backend contract.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use compliance_core::config::ApiConfig;
use compliance_core::error::ErrorKind;
use compliance_core::traits::AuthApi;
use compliance_core::types::{LoginResponse, RefreshResponse, UserRoleResponse};
use compliance_core::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// HTTP client for the authentication endpoints.
///
/// The refresh credential is an HTTP cookie set by the backend at login; it
/// lives in the client's cookie jar and is attached to every request to the
/// API origin.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
    config: ApiConfig,
}

impl HttpAuthApi {
    /// Build a client for the API described by `config`.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            AppError::configuration(format!("Invalid api.base_url '{}': {e}", config.base_url))
        })?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            jar,
            base_url,
            config: config.clone(),
        })
    }

    /// Resolve `path` against the configured base URL, keeping any base path.
    pub fn url(&self, path: &str) -> AppResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| AppError::validation(format!("Invalid request path '{path}': {e}")))
    }

    /// Start a request to `path`.
    pub fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        Ok(self.http.request(method, self.url(path)?))
    }

    /// The cookies the jar would send to the API, as a `Cookie` header value.
    pub fn export_cookies(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Seed the jar from a `Cookie` header value saved by [`export_cookies`](Self::export_cookies).
    pub fn import_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base_url);
        }
    }

    /// Seed the jar from a file written by [`save_cookies`](Self::save_cookies).
    ///
    /// A missing file leaves the jar empty.
    pub fn load_cookies(&self, path: &Path) -> AppResult<()> {
        match std::fs::read_to_string(path) {
            Ok(header) => {
                self.import_cookies(header.trim());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the jar to `path`, or remove the file when the jar is empty.
    pub fn save_cookies(&self, path: &Path) -> AppResult<()> {
        match self.export_cookies() {
            Some(header) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, header)?;
            }
            None if path.exists() => std::fs::remove_file(path)?,
            None => {}
        }
        Ok(())
    }

    async fn send(&self, operation: &'static str, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| transport(operation, e))?;
        ensure_success(response, operation).await
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let request = self
            .request(Method::POST, &self.config.login_path)?
            .json(&LoginRequest { username, password });
        let response = self.send("login", request).await?;
        decode(response, "login").await
    }

    async fn refresh(&self) -> AppResult<RefreshResponse> {
        let request = self.request(Method::POST, &self.config.refresh_path)?;
        let response = self.send("refresh", request).await?;
        decode(response, "refresh").await
    }

    async fn fetch_user(&self, user_id: &str, token: &str) -> AppResult<UserRoleResponse> {
        let request = self
            .request(Method::GET, &self.config.user_path_for(user_id))?
            .bearer_auth(token);
        let response = self.send("user lookup", request).await?;
        decode(response, "user lookup").await
    }

    async fn logout(&self, token: &str) -> AppResult<()> {
        let request = self
            .request(Method::POST, &self.config.logout_path)?
            .bearer_auth(token);
        self.send("logout", request).await?;
        Ok(())
    }
}

/// Map a transport failure (no response) to a network error.
pub(crate) fn transport(operation: &'static str, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Network,
        format!("{operation} request failed: {err}"),
        err,
    )
}

/// Turn a non-success response into an error: `401` is an authentication
/// error, anything else an external-service error carrying the body.
pub(crate) async fn ensure_success(
    response: Response,
    operation: &'static str,
) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::authentication(format!(
            "{operation} rejected: HTTP 401"
        )));
    }
    Err(AppError::external_service(format!(
        "{operation} failed: HTTP {} {}",
        status.as_u16(),
        body.trim()
    )))
}

/// Read a JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(
    response: Response,
    operation: &'static str,
) -> AppResult<T> {
    let bytes = response.bytes().await.map_err(|e| transport(operation, e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("{operation} returned a malformed body: {e}"),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_keeps_base_path() {
        let config = ApiConfig {
            base_url: "https://compliance.example.com/backend/".into(),
            ..ApiConfig::default()
        };
        let api = HttpAuthApi::new(&config).unwrap();

        assert_eq!(
            api.url("/api/users/7").unwrap().as_str(),
            "https://compliance.example.com/backend/api/users/7"
        );
    }

    #[test]
    fn test_invalid_base_url_is_configuration_error() {
        let config = ApiConfig {
            base_url: "not a url".into(),
            ..ApiConfig::default()
        };
        let err = HttpAuthApi::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_cookie_round_trip() {
        let api = HttpAuthApi::new(&ApiConfig::default()).unwrap();
        assert_eq!(api.export_cookies(), None);

        api.import_cookies("refresh_token=r1; theme=dark");
        let exported = api.export_cookies().unwrap();
        assert!(exported.contains("refresh_token=r1"));
        assert!(exported.contains("theme=dark"));
    }

    #[test]
    fn test_cookie_file_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json.cookies");

        let api = HttpAuthApi::new(&ApiConfig::default()).unwrap();
        api.load_cookies(&path).unwrap();
        api.import_cookies("refresh_token=r2");
        api.save_cookies(&path).unwrap();

        let reopened = HttpAuthApi::new(&ApiConfig::default()).unwrap();
        reopened.load_cookies(&path).unwrap();
        assert_eq!(reopened.export_cookies().as_deref(), Some("refresh_token=r2"));
    }
}
