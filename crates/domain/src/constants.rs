//! Application constants
//!
//! Centralized location for all domain-level constants used by the session
//! subsystem.

// Redirect query parameters
pub const PARAM_CODE: &str = "code";
pub const PARAM_AUTH_SUCCESS: &str = "auth_success";
pub const PARAM_USER: &str = "user";
pub const PARAM_ERROR: &str = "error";

/// Every query parameter that belongs to the OAuth redirect and must be
/// stripped from the location once read.
pub const AUTH_QUERY_PARAMS: &[&str] = &[
    PARAM_CODE,
    "state",
    "scope",
    "authuser",
    "prompt",
    PARAM_AUTH_SUCCESS,
    PARAM_USER,
    PARAM_ERROR,
    "error_description",
];

// Routes
pub const DEFAULT_DASHBOARD_PATH: &str = "/dashboard";
pub const DEFAULT_LOGIN_PATH: &str = "/login";

// Backend endpoints
pub const DEFAULT_CHECK_AUTH_PATH: &str = "/api/check-auth";
pub const DEFAULT_EXCHANGE_PATH: &str = "/auth/callback";
pub const DEFAULT_LOGIN_ENDPOINT: &str = "/api/login";
pub const DEFAULT_LOGOUT_PATH: &str = "/api/logout";

// Retry policy
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 2_000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 0;
pub const MIN_MAX_ATTEMPTS: u32 = 1;
pub const MAX_MAX_ATTEMPTS: u32 = 100;

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;
/// Maximum number of error body characters surfaced to the UI.
pub const MAX_ERROR_CHARS: usize = 200;
