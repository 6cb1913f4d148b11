//! Session subsystem configuration
//!
//! Every field has a default so partial JSON/TOML files deserialize. The
//! loader in `calgentic-infra` fills these from the environment or a file and
//! calls [`AuthConfig::validate`] before handing the value out.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_CHECK_AUTH_PATH, DEFAULT_DASHBOARD_PATH, DEFAULT_EXCHANGE_PATH,
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_LOGIN_ENDPOINT, DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_SETTLE_DELAY_MS, MAX_MAX_ATTEMPTS, MIN_MAX_ATTEMPTS, PARAM_ERROR,
};
use crate::errors::{CalgenticError, Result};
use crate::impl_domain_status_conversions;
use crate::types::FailureReason;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";

/// HTTP method used for a configurable backend endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointMethod {
    #[default]
    #[serde(alias = "get", alias = "Get")]
    Get,
    #[serde(alias = "post", alias = "Post")]
    Post,
}

impl_domain_status_conversions!(EndpointMethod {
    Get => "get",
    Post => "post",
});

/// Bounded linear backoff for session verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first verification attempt.
    pub max_attempts: u32,
    /// Delay unit; retry `n` waits `base_delay_ms * n`.
    pub base_delay_ms: u64,
    /// Wait before the first verification after a sign-in redirect.
    pub settle_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_HTTP_TIMEOUT_MS }
    }
}

/// Backend endpoint paths, relative to the API or server base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    pub check_auth: String,
    pub exchange: String,
    pub exchange_method: EndpointMethod,
    pub login: String,
    pub logout: String,
    pub logout_method: EndpointMethod,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            check_auth: DEFAULT_CHECK_AUTH_PATH.to_string(),
            exchange: DEFAULT_EXCHANGE_PATH.to_string(),
            exchange_method: EndpointMethod::Get,
            login: DEFAULT_LOGIN_ENDPOINT.to_string(),
            logout: DEFAULT_LOGOUT_PATH.to_string(),
            logout_method: EndpointMethod::Post,
        }
    }
}

/// Top-level configuration for the session subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base for `/api/*` calls (check-auth).
    pub api_base_url: String,
    /// Base for the OAuth callback, login and logout endpoints.
    pub server_base_url: String,
    /// Redirect URI registered with the identity provider.
    pub redirect_uri: String,
    pub dashboard_path: String,
    pub login_path: String,
    pub retry: RetrySettings,
    pub http: HttpSettings,
    pub endpoints: EndpointSettings,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            server_base_url: DEFAULT_BASE_URL.to_string(),
            redirect_uri: String::new(),
            dashboard_path: DEFAULT_DASHBOARD_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            retry: RetrySettings::default(),
            http: HttpSettings::default(),
            endpoints: EndpointSettings::default(),
        }
    }
}

impl AuthConfig {
    /// Validates URLs, routes and ranges.
    ///
    /// # Errors
    /// Returns `CalgenticError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        parse_base("api_base_url", &self.api_base_url)?;
        parse_base("server_base_url", &self.server_base_url)?;

        if !self.redirect_uri.is_empty() {
            Url::parse(&self.redirect_uri).map_err(|e| {
                CalgenticError::Config(format!("Invalid redirect_uri '{}': {e}", self.redirect_uri))
            })?;
        }

        for (field, route) in
            [("dashboard_path", &self.dashboard_path), ("login_path", &self.login_path)]
        {
            if !route.starts_with('/') {
                return Err(CalgenticError::Config(format!(
                    "{field} must be an absolute route, got '{route}'"
                )));
            }
        }

        if !(MIN_MAX_ATTEMPTS..=MAX_MAX_ATTEMPTS).contains(&self.retry.max_attempts) {
            let got = self.retry.max_attempts;
            return Err(CalgenticError::Config(format!(
                "retry.max_attempts must be in {MIN_MAX_ATTEMPTS}..={MAX_MAX_ATTEMPTS}, got {got}"
            )));
        }

        if self.http.timeout_ms == 0 {
            return Err(CalgenticError::Config("http.timeout_ms must be positive".to_string()));
        }

        Ok(())
    }

    /// Parsed API base URL.
    ///
    /// # Errors
    /// Returns `CalgenticError::Config` if the URL is invalid.
    pub fn api_base(&self) -> Result<Url> {
        parse_base("api_base_url", &self.api_base_url)
    }

    /// Parsed server base URL.
    ///
    /// # Errors
    /// Returns `CalgenticError::Config` if the URL is invalid.
    pub fn server_base(&self) -> Result<Url> {
        parse_base("server_base_url", &self.server_base_url)
    }

    /// Login route, with `?error=<code>` when a reason is given.
    #[must_use]
    pub fn login_route(&self, reason: Option<&FailureReason>) -> String {
        match reason {
            Some(reason) => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair(PARAM_ERROR, reason.code())
                    .finish();
                format!("{}?{query}", self.login_path)
            }
            None => self.login_path.clone(),
        }
    }
}

fn parse_base(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| CalgenticError::Config(format!("Invalid {field} '{value}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(CalgenticError::Config(format!("{field} cannot be used as a base URL")));
    }
    Ok(url)
}
