//! HTTP implementation of the backend session port
//!
//! Talks to the CalGentic backend's session endpoints with a cookie-carrying
//! client. Tokens never leave the backend; only the session cookie and the
//! small check-auth envelope are seen here.

use async_trait::async_trait;
use calgentic_core::BackendAuthClient;
use calgentic_domain::constants::{PARAM_CODE, PARAM_ERROR};
use calgentic_domain::{
    AuthConfig, BackendError, CalgenticError, EndpointMethod, EndpointSettings, SessionEnvelope,
    User,
};
use reqwest::{Method, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::ApiError;
use crate::http::HttpClient;

const USER_AGENT: &str = concat!("calgentic/", env!("CARGO_PKG_VERSION"));

/// Backend session client over HTTP.
#[derive(Clone)]
pub struct HttpBackendAuthClient {
    http: HttpClient,
    api_base: Url,
    server_base: Url,
    endpoints: EndpointSettings,
}

impl HttpBackendAuthClient {
    /// Build a client from validated configuration.
    ///
    /// # Errors
    /// Returns `CalgenticError::Config` for invalid base URLs or a client
    /// that cannot be built.
    pub fn new(config: &AuthConfig) -> Result<Self, CalgenticError> {
        let http = HttpClient::builder()
            .timeout(std::time::Duration::from_millis(config.http.timeout_ms))
            .user_agent(USER_AGENT)
            .build()?;
        Self::with_http_client(config, http)
    }

    /// Build a client around an existing [`HttpClient`] (shared cookie jar).
    ///
    /// # Errors
    /// Returns `CalgenticError::Config` for invalid base URLs.
    pub fn with_http_client(config: &AuthConfig, http: HttpClient) -> Result<Self, CalgenticError> {
        Ok(Self {
            http,
            api_base: config.api_base()?,
            server_base: config.server_base()?,
            endpoints: config.endpoints.clone(),
        })
    }

    fn endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", base.as_str().trim_end_matches('/'), path);
        Url::parse(&joined)
            .map_err(|e| ApiError::Config(format!("Invalid endpoint '{joined}': {e}")))
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        self.http.send(builder).await.map_err(ApiError::from)
    }

    async fn error_from_response(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }
}

/// Request body for a POST exchange.
#[derive(Debug, Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
    redirect_uri: &'a str,
}

/// Check-auth response as sent by the backend.
#[derive(Debug, Deserialize)]
struct CheckAuthResponse {
    authenticated: bool,
    #[serde(default)]
    user: Option<UserPayload>,
    #[serde(default)]
    message: Option<String>,
}

/// Session user; the backend forwards ID token claims, any of which may be
/// null.
#[derive(Debug, Deserialize)]
struct UserPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        let email = payload.email.unwrap_or_default();
        let name = payload
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        Self {
            id: payload.id.filter(|id| !id.is_empty()).unwrap_or_else(|| email.clone()),
            name,
            email,
            picture: payload.picture.filter(|picture| !picture.is_empty()),
        }
    }
}

impl From<CheckAuthResponse> for SessionEnvelope {
    fn from(response: CheckAuthResponse) -> Self {
        Self {
            authenticated: response.authenticated,
            user: response.user.map(User::from),
            message: response.message,
        }
    }
}

/// The backend finishes its OAuth callback with a redirect back to the app;
/// an `error` parameter on that redirect means the exchange failed.
fn redirect_error(response: &Response) -> Option<String> {
    let location = response.headers().get(reqwest::header::LOCATION)?.to_str().ok()?;
    let target = response.url().join(location).ok()?;
    let mut pairs = target.query_pairs();
    pairs.find(|(key, _)| key == PARAM_ERROR).map(|(_, value)| value.into_owned())
}

#[async_trait]
impl BackendAuthClient for HttpBackendAuthClient {
    #[instrument(skip(self))]
    async fn check_session(&self) -> Result<SessionEnvelope, BackendError> {
        let url = Self::endpoint(&self.api_base, &self.endpoints.check_auth)?;
        let response = self.send(self.http.request(Method::GET, url)).await?;

        let status = response.status();
        if !status.is_success() {
            let err = Self::error_from_response(response).await;
            warn!(%status, error = %err, "check-auth returned non-success status");
            return Err(BackendError::Unreachable(err.to_string()));
        }

        let body = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        let decoded: CheckAuthResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("check-auth body: {e}")))?;

        let envelope = SessionEnvelope::from(decoded);
        debug!(authenticated = envelope.authenticated, "check-auth answered");
        Ok(envelope)
    }

    #[instrument(skip(self, code), fields(code_len = code.len()))]
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<(), BackendError> {
        if redirect_uri.trim().is_empty() {
            return Err(BackendError::Config("redirect URI is not configured".to_string()));
        }

        let url = Self::endpoint(&self.server_base, &self.endpoints.exchange)?;
        let request = match self.endpoints.exchange_method {
            EndpointMethod::Get => self
                .http
                .request(Method::GET, url)
                .query(&[(PARAM_CODE, code), ("redirect_uri", redirect_uri)]),
            EndpointMethod::Post => self
                .http
                .request(Method::POST, url)
                .json(&ExchangeRequest { code, redirect_uri }),
        };

        let response = self.send(request).await?;
        let status = response.status();

        if status.is_redirection() {
            if let Some(error) = redirect_error(&response) {
                warn!(%status, reason = %error, "Code exchange redirected with an error");
                return Err(BackendError::Rejected { status: status.as_u16(), message: error });
            }
            info!(%status, "Code exchange completed with redirect");
            return Ok(());
        }

        if status.is_success() {
            info!(%status, "Code exchange completed");
            return Ok(());
        }

        let err = Self::error_from_response(response).await;
        warn!(%status, error = %err, "Code exchange rejected");
        Err(err.into())
    }

    fn begin_login(&self) -> Result<Url, BackendError> {
        Ok(Self::endpoint(&self.server_base, &self.endpoints.login)?)
    }

    #[instrument(skip(self))]
    async fn end_session(&self) -> Result<(), BackendError> {
        let url = Self::endpoint(&self.server_base, &self.endpoints.logout)?;
        let method = match self.endpoints.logout_method {
            EndpointMethod::Get => Method::GET,
            EndpointMethod::Post => Method::POST,
        };
        let response = self.send(self.http.request(method, url)).await?;

        let status = response.status();
        if status.is_success() {
            info!("Backend session ended");
            return Ok(());
        }

        let err = Self::error_from_response(response).await;
        warn!(%status, error = %err, "Logout rejected");
        Err(err.into())
    }
}
