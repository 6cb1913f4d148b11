use std::time::Duration;

use calgentic_domain::constants::DEFAULT_HTTP_TIMEOUT_MS;
use calgentic_domain::CalgenticError;
use reqwest::redirect::Policy;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with a shared cookie jar and a per-request timeout.
///
/// Requests are sent once. Retrying is the caller's decision: the session
/// reconciler owns its own backoff, and an authorization code must never be
/// submitted twice.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    ///
    /// # Errors
    /// Returns `CalgenticError::Network` if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, CalgenticError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder.
    ///
    /// # Errors
    /// Transport failures are mapped through [`InfraError`].
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, CalgenticError> {
        let request = builder.build().map_err(|err| CalgenticError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %redact_query(&url), "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                let status = response.status();
                debug!(%method, url = %redact_query(&url), %status, "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, url = %redact_query(&url), error = %err, "HTTP request failed");
                Err(CalgenticError::from(InfraError::from(err)))
            }
        }
    }
}

/// Query strings may carry authorization codes; log the path only.
fn redact_query(url: &reqwest::Url) -> String {
    let mut redacted = url.clone();
    if redacted.query().is_some() {
        redacted.set_query(Some("redacted"));
    }
    redacted.to_string()
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    cookie_store: bool,
    follow_redirects: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            user_agent: None,
            default_headers: None,
            cookie_store: true,
            follow_redirects: false,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Keep session cookies between requests. On by default.
    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_store = enabled;
        self
    }

    /// Follow 3xx responses. Off by default so callers can inspect the
    /// `Location` header themselves.
    pub fn follow_redirects(mut self, enabled: bool) -> Self {
        self.follow_redirects = enabled;
        self
    }

    /// # Errors
    /// Returns `CalgenticError` if reqwest rejects the configuration.
    pub fn build(self) -> Result<HttpClient, CalgenticError> {
        let redirect = if self.follow_redirects { Policy::limited(10) } else { Policy::none() };
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .cookie_store(self.cookie_store)
            .redirect(redirect)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| CalgenticError::from(InfraError::from(err)))?;

        Ok(HttpClient { client })
    }
}
