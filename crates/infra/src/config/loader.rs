//! Configuration loader
//!
//! Loads [`AuthConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads a `.env` file into the process environment when one exists
//! 2. Attempts to load from environment variables
//! 3. If the required variables are missing, falls back to a config file
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CALGENTIC_API_BASE_URL`: base URL for `/api/*` endpoints (required)
//! - `CALGENTIC_SERVER_BASE_URL`: base URL for `/auth/*` endpoints (required)
//! - `CALGENTIC_REDIRECT_URI`: OAuth redirect URI sent on exchange (required)
//! - `CALGENTIC_DASHBOARD_PATH`: route shown after sign-in
//! - `CALGENTIC_LOGIN_PATH`: route shown when signed out
//! - `CALGENTIC_AUTH_MAX_ATTEMPTS`: retries after the first session check
//! - `CALGENTIC_AUTH_BASE_DELAY_MS`: linear backoff step
//! - `CALGENTIC_AUTH_SETTLE_DELAY_MS`: pause after a fresh sign-in
//! - `CALGENTIC_HTTP_TIMEOUT_MS`: per-request timeout
//!
//! ## File Locations
//! The loader searches `calgentic.{json,toml}` then `config.{json,toml}` in
//! the working directory, its two parents, and the executable directory.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use calgentic_domain::{AuthConfig, CalgenticError, Result};

const CONFIG_FILE_NAMES: &[&str] =
    &["calgentic.json", "calgentic.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CalgenticError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<AuthConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The three base URL variables are required; everything else falls back to
/// the defaults of [`AuthConfig`].
///
/// # Errors
/// Returns `CalgenticError::Config` if required variables are missing, a
/// number does not parse, or the result fails validation.
pub fn load_from_env() -> Result<AuthConfig> {
    let mut config = AuthConfig {
        api_base_url: env_var("CALGENTIC_API_BASE_URL")?,
        server_base_url: env_var("CALGENTIC_SERVER_BASE_URL")?,
        redirect_uri: env_var("CALGENTIC_REDIRECT_URI")?,
        ..AuthConfig::default()
    };

    if let Some(path) = env_opt("CALGENTIC_DASHBOARD_PATH") {
        config.dashboard_path = path;
    }
    if let Some(path) = env_opt("CALGENTIC_LOGIN_PATH") {
        config.login_path = path;
    }
    if let Some(attempts) = env_parse("CALGENTIC_AUTH_MAX_ATTEMPTS", "max attempts")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = env_parse("CALGENTIC_AUTH_BASE_DELAY_MS", "base delay")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(delay) = env_parse("CALGENTIC_AUTH_SETTLE_DELAY_MS", "settle delay")? {
        config.retry.settle_delay_ms = delay;
    }
    if let Some(timeout) = env_parse("CALGENTIC_HTTP_TIMEOUT_MS", "HTTP timeout")? {
        config.http.timeout_ms = timeout;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations via
/// [`find_config_path`]. Format is detected by file extension.
///
/// # Errors
/// Returns `CalgenticError::Config` if the file is missing, unreadable,
/// malformed, or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AuthConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CalgenticError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            CalgenticError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CalgenticError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<AuthConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CalgenticError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CalgenticError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CalgenticError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Search the standard locations for a configuration file
///
/// Returns the first existing candidate, or `None`.
pub fn find_config_path() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }
    if let Ok(exe) = std::env::current_exe() {
        roots.extend(exe.parent().map(Path::to_path_buf));
    }

    let found = candidates(&roots).find(|path| path.is_file());
    found
}

fn candidates(roots: &[PathBuf]) -> impl Iterator<Item = PathBuf> + '_ {
    roots.iter().flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        CalgenticError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Set and non-blank.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| CalgenticError::Config(format!("Invalid {what} in {key}: {e}")))
        })
        .transpose()
}
