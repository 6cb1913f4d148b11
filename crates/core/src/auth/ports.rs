//! Port interfaces for session reconciliation
//!
//! These traits define the boundary between the reconciler and the outside
//! world: the backend's session endpoints and the host browser surface.

use async_trait::async_trait;
use calgentic_domain::{BackendError, NavigationTarget, Notification, SessionEnvelope};
use url::Url;

/// Backend session endpoints.
///
/// Implementations carry the session cookie on every request and never expose
/// tokens to the caller.
#[async_trait]
pub trait BackendAuthClient: Send + Sync {
    /// Asks the backend whether the current cookie is an authenticated
    /// session.
    ///
    /// `Unreachable` and `Malformed` mean the question could not be answered;
    /// a server that answers "no" returns `Ok` with `authenticated: false`.
    async fn check_session(&self) -> Result<SessionEnvelope, BackendError>;

    /// Hands an authorization code to the backend to complete the OAuth
    /// exchange and establish the session cookie.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<(), BackendError>;

    /// URL that starts the backend's OAuth flow. No network I/O.
    fn begin_login(&self) -> Result<Url, BackendError>;

    /// Clears the backend session.
    async fn end_session(&self) -> Result<(), BackendError>;
}

/// Host browser location.
pub trait BrowserLocation: Send + Sync {
    /// Current location, query included.
    fn current_url(&self) -> Url;

    /// Replaces the current history entry without navigating.
    fn replace_url(&self, url: &Url);

    /// Navigates in-app or away from the app.
    fn navigate(&self, target: NavigationTarget);
}

/// Toast-equivalent user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
