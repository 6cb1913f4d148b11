//! End-to-end session reconciliation over HTTP
//!
//! Wires the reconciler to the reqwest backend client against a mock
//! backend, with the in-memory location standing in for the browser.

use std::sync::Arc;

use calgentic_core::{AuthReconciler, BrowserLocation};
use calgentic_domain::{AuthConfig, FailureReason, NavigationTarget, Phase, RetrySettings};
use calgentic_infra::{HttpBackendAuthClient, InMemoryLocation, TracingNotifier};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP: &str = "http://localhost:5173";

fn config_for(server: &MockServer) -> AuthConfig {
    AuthConfig {
        api_base_url: server.uri(),
        server_base_url: server.uri(),
        redirect_uri: format!("{APP}/auth/callback"),
        retry: RetrySettings { max_attempts: 2, base_delay_ms: 10, settle_delay_ms: 0 },
        ..AuthConfig::default()
    }
}

fn wire(server: &MockServer, landing: &str) -> (AuthReconciler, Arc<InMemoryLocation>) {
    let config = config_for(server);
    let backend = Arc::new(HttpBackendAuthClient::new(&config).expect("client"));
    let location = Arc::new(InMemoryLocation::new(Url::parse(APP).unwrap().join(landing).unwrap()));
    let reconciler =
        AuthReconciler::new(backend, location.clone(), Arc::new(TracingNotifier), config);
    (reconciler, location)
}

#[tokio::test]
async fn code_exchange_then_cookie_session_signs_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/callback"))
        .and(query_param("code", "4/0AbCd"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{APP}/dashboard").as_str())
                .insert_header("set-cookie", "calgentic_session=abc; Path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/check-auth"))
        .and(header("cookie", "calgentic_session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "authenticated": true,
            "user": { "id": "1082", "email": "ada@example.com", "name": "Ada Lovelace" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (reconciler, location) = wire(&server, "/auth/callback?code=4/0AbCd");
    let session = reconciler.check_auth().await;

    assert!(session.authenticated);
    assert_eq!(session.phase, Phase::Authenticated);
    assert_eq!(session.user.map(|u| u.name).as_deref(), Some("Ada Lovelace"));
    assert_eq!(location.current_url().as_str(), format!("{APP}/dashboard"));
}

#[tokio::test]
async fn unreachable_backend_ends_on_login_with_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/check-auth"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let (reconciler, location) = wire(&server, "/dashboard");
    let session = reconciler.check_auth().await;

    assert!(!session.authenticated);
    assert_eq!(session.reason, Some(FailureReason::NetworkError));
    assert_eq!(location.current_url().path(), "/login");
    assert_eq!(location.current_url().query(), Some("error=network_error"));
}

#[tokio::test]
async fn login_points_browser_at_backend() {
    let server = MockServer::start().await;

    let (reconciler, location) = wire(&server, "/login");
    reconciler.login().expect("login");

    let expected = Url::parse(&format!("{}/api/login", server.uri())).unwrap();
    assert_eq!(location.history(), vec![NavigationTarget::External(expected)]);
}

#[tokio::test]
async fn logout_clears_session_and_returns_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Logged out successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (reconciler, location) = wire(&server, "/dashboard");
    reconciler.logout().await.expect("logout");

    assert!(!reconciler.session().authenticated);
    assert_eq!(location.current_url().path(), "/login");
}
