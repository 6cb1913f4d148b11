//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FailureReason;

/// Main error type for CalGentic
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum CalgenticError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for CalGentic operations
pub type Result<T> = std::result::Result<T, CalgenticError>;

/// Failures reported by a backend auth client.
///
/// `Unreachable` means "could not ask"; it is never used for a server that
/// answered `authenticated: false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Malformed backend response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<BackendError> for CalgenticError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unreachable(msg) | BackendError::Malformed(msg) => Self::Network(msg),
            BackendError::Rejected { status, message } => {
                Self::Auth(format!("rejected ({status}): {message}"))
            }
            BackendError::Config(msg) => Self::Config(msg),
        }
    }
}

/// Session reconciliation error taxonomy.
///
/// The reconciler absorbs all of these into a terminal phase plus a
/// [`FailureReason`]; only `login` and `logout` hand them to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authorization code exchange rejected: {0}")]
    ExchangeRejected(BackendError),

    #[error("Auth backend unreachable: {0}")]
    Unreachable(String),

    #[error("Session verification exhausted after {attempts} retries")]
    Exhausted {
        attempts: u32,
        /// Whether the last failed verification could not reach the backend.
        unreachable: bool,
    },
}

impl AuthError {
    /// Reason code shown to the user for this error.
    pub fn reason(&self) -> FailureReason {
        match self {
            Self::ExchangeRejected(_) => FailureReason::TokenExchangeFailed,
            Self::Unreachable(_) | Self::Exhausted { unreachable: true, .. } => {
                FailureReason::NetworkError
            }
            Self::Exhausted { unreachable: false, .. } => FailureReason::AuthTimeout,
        }
    }
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unreachable(msg) | BackendError::Malformed(msg) => Self::Unreachable(msg),
            other => Self::ExchangeRejected(other),
        }
    }
}
