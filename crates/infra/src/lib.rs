//! # CalGentic Infrastructure
//!
//! Infrastructure implementations of core session ports.
//!
//! This crate contains:
//! - The reqwest-backed backend session client
//! - Configuration loading (environment, JSON, TOML)
//! - Headless browser adapters
//! - Tracing bootstrap
//!
//! ## Architecture
//! - Implements traits defined in `calgentic-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod browser;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

pub use api::{ApiError, ApiErrorCategory, HttpBackendAuthClient};
pub use browser::{InMemoryLocation, TracingNotifier};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
