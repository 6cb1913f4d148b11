//! Tracing bootstrap
//!
//! Installs a `tracing-subscriber` fmt subscriber for binaries and examples.
//! Libraries in this workspace only emit events.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directives, e.g. `calgentic_core=debug,info`.
pub const LOG_ENV: &str = "CALGENTIC_LOG";

/// Set to `json` for one JSON object per event.
pub const LOG_FORMAT_ENV: &str = "CALGENTIC_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Reads [`LOG_FORMAT_ENV`]; anything other than `json` is pretty.
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Installs the global subscriber using [`LOG_ENV`] and [`LOG_FORMAT_ENV`].
///
/// Returns `false` if a subscriber was already installed; calling this more
/// than once is harmless.
pub fn init_tracing() -> bool {
    init_tracing_with(LogFormat::from_env())
}

/// Installs the global subscriber with an explicit format.
pub fn init_tracing_with(format: LogFormat) -> bool {
    let filter = env_filter();

    let installed = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
    };

    installed.is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
