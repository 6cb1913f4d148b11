//! Backend API client for CalGentic
//!
//! HTTP adapter for the backend session endpoints. All requests go through
//! [`crate::http::HttpClient`], which owns the cookie jar and timeouts.

pub mod auth_client;
pub mod errors;

pub use auth_client::HttpBackendAuthClient;
pub use errors::{ApiError, ApiErrorCategory};
