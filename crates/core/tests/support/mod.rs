//! Shared test helpers for `calgentic-core` integration tests.
//!
//! In-memory fakes for every port so reconciliation tests can script the
//! backend and inspect what the browser was asked to do.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use calgentic_core::{AuthReconciler, BackendAuthClient, BrowserLocation, Notifier};
use calgentic_domain::{
    AuthConfig, BackendError, NavigationTarget, Notification, NotificationLevel, SessionEnvelope,
    User,
};
use parking_lot::Mutex;
use url::Url;

pub const APP_ORIGIN: &str = "http://localhost:5173";
pub const REDIRECT_URI: &str = "http://localhost:5173/auth/callback";

pub fn ada() -> User {
    User {
        id: "108234".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        picture: None,
    }
}

pub fn authenticated(user: User) -> Result<SessionEnvelope, BackendError> {
    Ok(SessionEnvelope { authenticated: true, user: Some(user), message: None })
}

pub fn not_authenticated() -> Result<SessionEnvelope, BackendError> {
    Ok(SessionEnvelope {
        authenticated: false,
        user: None,
        message: Some("No session found".to_string()),
    })
}

pub fn unreachable() -> Result<SessionEnvelope, BackendError> {
    Err(BackendError::Unreachable("connection refused".to_string()))
}

/// Backend whose answers are scripted per call.
///
/// `check_session` pops scripted answers in order and repeats the fallback
/// once the script runs out.
pub struct ScriptedBackend {
    checks: Mutex<VecDeque<Result<SessionEnvelope, BackendError>>>,
    fallback: Mutex<Result<SessionEnvelope, BackendError>>,
    exchange: Mutex<Result<(), BackendError>>,
    logout: Mutex<Result<(), BackendError>>,
    login_url: Mutex<Result<Url, BackendError>>,
    latency: Mutex<Duration>,
    check_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    exchanges: Mutex<Vec<(String, String)>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            checks: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(not_authenticated()),
            exchange: Mutex::new(Ok(())),
            logout: Mutex::new(Ok(())),
            login_url: Mutex::new(Ok(Url::parse("http://127.0.0.1:5001/api/login").unwrap())),
            latency: Mutex::new(Duration::ZERO),
            check_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            exchanges: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checks(
        self,
        checks: impl IntoIterator<Item = Result<SessionEnvelope, BackendError>>,
    ) -> Self {
        self.checks.lock().extend(checks);
        self
    }

    pub fn always(self, answer: Result<SessionEnvelope, BackendError>) -> Self {
        *self.fallback.lock() = answer;
        self
    }

    pub fn with_exchange(self, result: Result<(), BackendError>) -> Self {
        *self.exchange.lock() = result;
        self
    }

    pub fn with_logout(self, result: Result<(), BackendError>) -> Self {
        *self.logout.lock() = result;
        self
    }

    pub fn with_login_url(self, result: Result<Url, BackendError>) -> Self {
        *self.login_url.lock() = result;
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    pub fn set_fallback(&self, answer: Result<SessionEnvelope, BackendError>) {
        *self.fallback.lock() = answer;
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn exchanges(&self) -> Vec<(String, String)> {
        self.exchanges.lock().clone()
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl BackendAuthClient for ScriptedBackend {
    async fn check_session(&self) -> Result<SessionEnvelope, BackendError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        let scripted = self.checks.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.lock().clone())
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<(), BackendError> {
        self.exchanges.lock().push((code.to_string(), redirect_uri.to_string()));
        self.simulate_latency().await;
        self.exchange.lock().clone()
    }

    fn begin_login(&self) -> Result<Url, BackendError> {
        self.login_url.lock().clone()
    }

    async fn end_session(&self) -> Result<(), BackendError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.logout.lock().clone()
    }
}

/// Browser location that follows in-app routes and records everything.
pub struct FakeLocation {
    current: Mutex<Url>,
    replacements: Mutex<Vec<Url>>,
    navigations: Mutex<Vec<NavigationTarget>>,
}

impl FakeLocation {
    pub fn at(path_and_query: &str) -> Self {
        let url = Url::parse(APP_ORIGIN).unwrap().join(path_and_query).unwrap();
        Self {
            current: Mutex::new(url),
            replacements: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn replacements(&self) -> Vec<Url> {
        self.replacements.lock().clone()
    }

    pub fn navigations(&self) -> Vec<NavigationTarget> {
        self.navigations.lock().clone()
    }
}

impl BrowserLocation for FakeLocation {
    fn current_url(&self) -> Url {
        self.current.lock().clone()
    }

    fn replace_url(&self, url: &Url) {
        self.replacements.lock().push(url.clone());
        *self.current.lock() = url.clone();
    }

    fn navigate(&self, target: NavigationTarget) {
        if let NavigationTarget::Route(route) = &target {
            let next = self.current.lock().join(route).unwrap();
            *self.current.lock() = next;
        }
        self.navigations.lock().push(target);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.seen.lock().iter().filter(|n| n.level == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

pub fn test_config() -> AuthConfig {
    AuthConfig { redirect_uri: REDIRECT_URI.to_string(), ..AuthConfig::default() }
}

/// Reconciler wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub reconciler: AuthReconciler,
    pub backend: Arc<ScriptedBackend>,
    pub location: Arc<FakeLocation>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(landing: &str, backend: ScriptedBackend) -> Self {
        Self::with_config(landing, backend, test_config())
    }

    pub fn with_config(landing: &str, backend: ScriptedBackend, config: AuthConfig) -> Self {
        let backend = Arc::new(backend);
        let location = Arc::new(FakeLocation::at(landing));
        let notifier = Arc::new(RecordingNotifier::default());
        let reconciler = AuthReconciler::new(
            backend.clone(),
            location.clone(),
            notifier.clone(),
            config,
        );
        Self { reconciler, backend, location, notifier }
    }
}
