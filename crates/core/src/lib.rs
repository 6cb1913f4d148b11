//! # CalGentic Core
//!
//! Pure session logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the backend and the browser surface (traits)
//! - The redirect parser, retry scheduler and session store
//! - The `AuthReconciler` state machine
//!
//! ## Architecture Principles
//! - Only depends on `calgentic-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod auth;

pub use auth::ports::{BackendAuthClient, BrowserLocation, Notifier};
pub use auth::{AuthReconciler, RetryPolicy, SessionStore};
