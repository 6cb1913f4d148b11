//! Backend API error types
//!
//! Classifies HTTP outcomes of the session endpoints before they are handed
//! to the core as [`BackendError`].

use calgentic_domain::constants::MAX_ERROR_CHARS;
use calgentic_domain::{BackendError, CalgenticError};
use reqwest::StatusCode;
use thiserror::Error;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401, 403
    Authentication,
    /// 5xx
    Server,
    /// Other 4xx and unexpected statuses
    Client,
    /// Connection, TLS and timeout failures
    Network,
    /// Body did not match the expected envelope
    Decode,
    /// Local misconfiguration, nothing was sent
    Config,
}

/// API operation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Classify a non-success response. The body is sanitized before it is
    /// kept.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let mut message = sanitize_body(body);
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or("unknown status").to_string();
        }
        let status = status.as_u16();

        match status {
            401 | 403 => Self::Auth { status, message },
            500..=599 => Self::Server { status, message },
            _ => Self::Client { status, message },
        }
    }

    /// Get the error category for this error
    pub const fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth { .. } => ApiErrorCategory::Authentication,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) => ApiErrorCategory::Network,
            Self::Decode(_) => ApiErrorCategory::Decode,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// HTTP status, when the backend answered.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. }
            | Self::Server { status, .. }
            | Self::Client { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<CalgenticError> for ApiError {
    fn from(err: CalgenticError) -> Self {
        match err {
            CalgenticError::Config(message) => Self::Config(message),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth { status, message }
            | ApiError::Server { status, message }
            | ApiError::Client { status, message } => Self::Rejected { status, message },
            ApiError::Network(message) => Self::Unreachable(message),
            ApiError::Decode(message) => Self::Malformed(message),
            ApiError::Config(message) => Self::Config(message),
        }
    }
}

/// Collapses whitespace, drops control characters and truncates to
/// `MAX_ERROR_CHARS` characters.
pub fn sanitize_body(body: &str) -> String {
    let cleaned: String = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.chars().count() <= MAX_ERROR_CHARS {
        return cleaned;
    }

    let mut truncated: String = cleaned.chars().take(MAX_ERROR_CHARS.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
