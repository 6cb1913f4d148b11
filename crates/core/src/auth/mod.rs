//! Browser session reconciliation
//!
//! Leaf-first: `redirect` and `retry` are pure building blocks, `store`
//! holds the single session value, and `reconciler` drives the state
//! machine through the `ports` traits.

pub mod ports;
pub mod reconciler;
pub mod redirect;
pub mod retry;
pub mod store;

pub use ports::{BackendAuthClient, BrowserLocation, Notifier};
pub use reconciler::AuthReconciler;
pub use redirect::{has_auth_params, parse_redirect, strip_auth_params};
pub use retry::{RetryError, RetryPolicy, RetryScheduler};
pub use store::SessionStore;
