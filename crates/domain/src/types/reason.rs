//! Failure reason codes
//!
//! Reason codes travel through the login URL (`/login?error=<code>`) and are
//! rendered as toasts. Codes round-trip verbatim: `from_code(c).code() == c`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    AccessDenied,
    TokenExchangeFailed,
    NetworkError,
    AuthTimeout,
    InvalidRedirect,
    // Codes emitted by the backend's OAuth callback route.
    NoCode,
    MissingCredentials,
    NoIdToken,
    Exception,
    /// Any other provider or backend code, kept as received.
    Other(String),
}

impl FailureReason {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "access_denied" => Self::AccessDenied,
            "token_exchange_failed" => Self::TokenExchangeFailed,
            "network_error" => Self::NetworkError,
            "auth_timeout" => Self::AuthTimeout,
            "invalid_redirect" => Self::InvalidRedirect,
            "no_code" => Self::NoCode,
            "missing_credentials" => Self::MissingCredentials,
            "no_id_token" => Self::NoIdToken,
            "exception" => Self::Exception,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::TokenExchangeFailed => "token_exchange_failed",
            Self::NetworkError => "network_error",
            Self::AuthTimeout => "auth_timeout",
            Self::InvalidRedirect => "invalid_redirect",
            Self::NoCode => "no_code",
            Self::MissingCredentials => "missing_credentials",
            Self::NoIdToken => "no_id_token",
            Self::Exception => "exception",
            Self::Other(code) => code,
        }
    }

    /// Human-readable message for the login page toast.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AccessDenied => {
                "Access was denied. Grant calendar access to continue.".to_string()
            }
            Self::TokenExchangeFailed => {
                "We couldn't complete sign-in with Google. Please try again.".to_string()
            }
            Self::NetworkError => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            Self::AuthTimeout => "Sign-in timed out. Please try again.".to_string(),
            Self::InvalidRedirect => {
                "The sign-in response was incomplete. Please try again.".to_string()
            }
            Self::NoCode => {
                "The sign-in response did not include an authorization code.".to_string()
            }
            Self::MissingCredentials => "Sign-in is not configured on the server.".to_string(),
            Self::NoIdToken => "Google did not return your profile. Please try again.".to_string(),
            Self::Exception => "Something went wrong during sign-in.".to_string(),
            Self::Other(code) => format!("Sign-in failed ({code})."),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for FailureReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}
