//! Example: reconciling a session against a running backend
//!
//! Pass the URL the browser landed on, e.g. the redirect after Google
//! sign-in:
//!
//! ```bash
//! CALGENTIC_LOG=debug cargo run -p calgentic-infra --example session_check -- \
//!     "http://localhost:5173/dashboard?auth_success=true&user=ada%40example.com"
//! ```
//!
//! Configuration comes from `CALGENTIC_*` variables, a `.env` file, or a
//! `calgentic.{json,toml}` file; without any, the local defaults are used.

use std::sync::Arc;

use anyhow::Context;
use calgentic_core::{AuthReconciler, BrowserLocation};
use calgentic_domain::AuthConfig;
use calgentic_infra::{
    config, init_tracing, HttpBackendAuthClient, InMemoryLocation, TracingNotifier,
};
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let landing = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:5173/dashboard".to_string());
    let landing = Url::parse(&landing).with_context(|| format!("invalid landing URL '{landing}'"))?;

    let auth_config = match config::load() {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!(error = %e, "No usable configuration, falling back to defaults");
            AuthConfig {
                redirect_uri: landing.join("/auth/callback")?.to_string(),
                ..AuthConfig::default()
            }
        }
    };

    let backend = Arc::new(HttpBackendAuthClient::new(&auth_config)?);
    let location = Arc::new(InMemoryLocation::new(landing));
    let reconciler =
        AuthReconciler::new(backend, location.clone(), Arc::new(TracingNotifier), auth_config);

    let session = reconciler.check_auth().await;

    println!("{}", serde_json::to_string_pretty(&session)?);
    println!("final location: {}", location.current_url());

    reconciler.teardown();
    Ok(())
}
