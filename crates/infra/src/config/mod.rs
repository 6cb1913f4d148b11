//! Configuration loading
//!
//! Loads [`calgentic_domain::AuthConfig`] from environment variables and
//! files.

pub mod loader;

pub use loader::{find_config_path, load, load_from_env, load_from_file};
