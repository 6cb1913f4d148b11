//! Redirect classification result

use serde::{Deserialize, Serialize};

/// Classification of the authentication-related query parameters found on
/// the landing URL. Derived once per reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RedirectOutcome {
    /// Fresh authorization code to exchange.
    Code(String),
    /// Backend already completed the exchange; carries the user's email.
    Success(String),
    /// Explicit error code reported by the provider or backend.
    Error(String),
    #[default]
    None,
}

impl RedirectOutcome {
    /// Whether this outcome came from a sign-in redirect.
    #[must_use]
    pub const fn is_sign_in(&self) -> bool {
        matches!(self, Self::Code(_) | Self::Success(_))
    }

    /// Email hint carried by a success redirect.
    #[must_use]
    pub fn email_hint(&self) -> Option<&str> {
        match self {
            Self::Success(email) => Some(email),
            _ => None,
        }
    }
}
