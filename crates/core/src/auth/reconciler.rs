//! Session reconciliation state machine
//!
//! `AuthReconciler` decides on every page load or OAuth redirect whether the
//! browser session is authenticated. At most one reconciliation runs at a
//! time: concurrent `check_auth` callers attach to the running one and all
//! receive the same `Session`.
//!
//! ## Flow
//! 1. `ParsingRedirect`: read the location, classify it, strip the OAuth
//!    parameters before branching
//! 2. `ExchangingCode`: only for a fresh authorization code
//! 3. `VerifyingSession`: poll the backend with bounded linear backoff
//! 4. Terminal: `Authenticated`, `Unauthenticated` or `Failed`
//!
//! Each reconciliation runs under its own child cancellation token. A
//! successful `logout` cancels the running one, so its late results are
//! dropped and the next `check_auth` starts fresh. After `teardown` the
//! reconciler never writes the store or touches the location again.

use std::future::Future;
use std::sync::Arc;

use calgentic_domain::{
    AuthConfig, AuthError, BackendError, FailureReason, NavigationTarget, Notification, Phase,
    RedirectOutcome, Session, SessionEnvelope, User,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::ports::{BackendAuthClient, BrowserLocation, Notifier};
use super::redirect::{has_auth_params, parse_redirect, strip_auth_params};
use super::retry::{RetryError, RetryPolicy, RetryScheduler};
use super::store::SessionStore;

type SharedReconciliation = Shared<BoxFuture<'static, Session>>;

/// Owner of the session state machine.
///
/// Cheap to clone; clones share the same store, in-flight slot and
/// cancellation token.
#[derive(Clone)]
pub struct AuthReconciler {
    inner: Arc<Inner>,
}

struct Inner {
    backend: Arc<dyn BackendAuthClient>,
    location: Arc<dyn BrowserLocation>,
    notifier: Arc<dyn Notifier>,
    config: AuthConfig,
    policy: RetryPolicy,
    store: SessionStore,
    cancel: CancellationToken,
    in_flight: Mutex<InFlight>,
    /// Serializes "still current? then publish, notify, navigate" so a
    /// superseded reconciliation cannot interleave its effects with logout.
    effects: Mutex<()>,
}

/// The running reconciliation, if any.
#[derive(Default)]
struct InFlight {
    generation: u64,
    running: Option<Running>,
}

struct Running {
    generation: u64,
    token: CancellationToken,
    result: SharedReconciliation,
}

impl InFlight {
    /// Cancels and forgets the running reconciliation.
    fn supersede(&mut self) -> bool {
        self.running.take().map(|running| running.token.cancel()).is_some()
    }
}

/// Clears the in-flight slot when the reconciliation task ends, including on
/// panic. A slot already taken over by a newer reconciliation is left alone.
struct InFlightGuard<'a> {
    slot: &'a Mutex<InFlight>,
    generation: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        if slot.running.as_ref().is_some_and(|running| running.generation == self.generation) {
            slot.running = None;
        }
    }
}

impl AuthReconciler {
    pub fn new(
        backend: Arc<dyn BackendAuthClient>,
        location: Arc<dyn BrowserLocation>,
        notifier: Arc<dyn Notifier>,
        config: AuthConfig,
    ) -> Self {
        let policy = RetryPolicy::from(&config.retry);
        Self {
            inner: Arc::new(Inner {
                backend,
                location,
                notifier,
                config,
                policy,
                store: SessionStore::new(),
                cancel: CancellationToken::new(),
                in_flight: Mutex::new(InFlight::default()),
                effects: Mutex::new(()),
            }),
        }
    }

    /// Override the retry policy derived from configuration.
    #[must_use]
    pub fn with_retry_policy(self, policy: RetryPolicy) -> Self {
        let inner = match Arc::try_unwrap(self.inner) {
            Ok(inner) => Inner { policy, ..inner },
            Err(shared) => {
                warn!("Retry policy override ignored: reconciler already shared");
                return Self { inner: shared };
            }
        };
        Self { inner: Arc::new(inner) }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner.store.current()
    }

    /// Receiver notified whenever the session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.store.subscribe()
    }

    /// Whether a reconciliation is currently running.
    #[must_use]
    pub fn is_reconciling(&self) -> bool {
        self.inner.in_flight.lock().running.is_some()
    }

    /// Runs (or joins) a reconciliation and returns the resulting session.
    ///
    /// Never fails: every error ends in a terminal phase with a reason.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) -> Session {
        if self.inner.cancel.is_cancelled() {
            debug!("check_auth after teardown; returning current session");
            return self.inner.store.current();
        }

        let shared = {
            let mut slot = self.inner.in_flight.lock();
            if let Some(running) = slot.running.as_ref() {
                debug!("Attaching to in-flight reconciliation");
                running.result.clone()
            } else {
                slot.generation += 1;
                let running = self.spawn_reconciliation(slot.generation);
                let result = running.result.clone();
                slot.running = Some(running);
                result
            }
        };

        shared.await
    }

    fn spawn_reconciliation(&self, generation: u64) -> Running {
        let token = self.inner.cancel.child_token();
        let inner = Arc::clone(&self.inner);
        let run_token = token.clone();
        let handle = tokio::spawn(async move {
            let _slot = InFlightGuard { slot: &inner.in_flight, generation };
            Reconciliation { inner: &inner, token: run_token }.run().await
        });

        let result = async move {
            match handle.await {
                Ok(session) => session,
                Err(err) => {
                    warn!(error = %err, "Reconciliation task failed");
                    Session::failed(FailureReason::Exception)
                }
            }
        }
        .boxed()
        .shared();

        Running { generation, token, result }
    }

    /// Starts the backend OAuth flow with a full-page navigation.
    ///
    /// The store is left untouched; the next page load reconciles.
    ///
    /// # Errors
    /// Returns `AuthError::Unreachable` if the login URL cannot be built.
    #[instrument(skip(self))]
    pub fn login(&self) -> Result<(), AuthError> {
        let inner = &self.inner;
        match inner.backend.begin_login() {
            Ok(url) => {
                info!(target_url = %url, "Redirecting to backend login");
                inner.effect(&inner.cancel, || {
                    inner.location.navigate(NavigationTarget::External(url));
                });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Failed to build login URL");
                inner.effect(&inner.cancel, || {
                    inner.notifier.notify(Notification::error(
                        "Unable to start sign-in. Please try again.",
                    ));
                });
                Err(AuthError::Unreachable(err.to_string()))
            }
        }
    }

    /// Ends the backend session.
    ///
    /// On success any running reconciliation is cancelled, the store is reset
    /// to unauthenticated and the browser goes to the login route. On failure
    /// the store is left as it was and no navigation happens.
    ///
    /// # Errors
    /// Returns the backend failure mapped to an `AuthError`.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        let inner = &self.inner;
        let Some(result) = guarded(&inner.cancel, inner.backend.end_session()).await else {
            return Err(AuthError::Unreachable("reconciler torn down".to_string()));
        };

        match result {
            Ok(()) => {
                info!("Logged out");
                inner.effect(&inner.cancel, || {
                    if inner.in_flight.lock().supersede() {
                        debug!("Cancelled in-flight reconciliation");
                    }
                    inner.store.publish(Session::unauthenticated(None));
                    inner.notifier.notify(Notification::success("Logged out successfully"));
                    let login = inner.config.login_route(None);
                    inner.location.navigate(NavigationTarget::Route(login));
                });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Logout failed");
                let message = match err {
                    BackendError::Unreachable(_) | BackendError::Malformed(_) => {
                        "Network error during logout"
                    }
                    _ => "Failed to log out",
                };
                inner.effect(&inner.cancel, || inner.notifier.notify(Notification::error(message)));
                Err(AuthError::from(err))
            }
        }
    }

    /// Cancels any running reconciliation and silences the reconciler.
    pub fn teardown(&self) {
        if !self.inner.cancel.is_cancelled() {
            info!("Tearing down auth reconciler");
            self.inner.cancel.cancel();
        }
    }
}

impl Inner {
    /// Runs `apply` unless `token` is cancelled. Returns whether it ran.
    fn effect(&self, token: &CancellationToken, apply: impl FnOnce()) -> bool {
        let _effects = self.effects.lock();
        if token.is_cancelled() {
            return false;
        }
        apply();
        true
    }
}

/// One run of the state machine, bound to its own cancellation token.
struct Reconciliation<'a> {
    inner: &'a Inner,
    token: CancellationToken,
}

impl Reconciliation<'_> {
    async fn run(&self) -> Session {
        let inner = self.inner;
        self.transition(Phase::ParsingRedirect);

        let landing = inner.location.current_url();
        let outcome = parse_redirect(&landing);
        if has_auth_params(&landing) {
            inner.effect(&self.token, || inner.location.replace_url(&strip_auth_params(&landing)));
        }
        debug!(outcome = outcome_kind(&outcome), "Redirect classified");

        let fresh_sign_in = outcome.is_sign_in();
        let email_hint = outcome.email_hint().map(str::to_owned);
        let mut retry = RetryScheduler::new(inner.policy, self.token.child_token());

        match outcome {
            RedirectOutcome::Error(code) => {
                warn!(reason = %code, "Redirect carried an error");
                return self.fail(FailureReason::from_code(&code));
            }
            RedirectOutcome::Code(code) => {
                self.transition(Phase::ExchangingCode);
                debug!(code_len = code.len(), "Exchanging authorization code");
                let exchange = inner.backend.exchange_code(&code, &inner.config.redirect_uri);
                match guarded(&self.token, exchange).await {
                    None => return self.abandoned(),
                    Some(Err(err)) => {
                        warn!(error = %err, "Authorization code exchange failed");
                        return self.fail(AuthError::ExchangeRejected(err).reason());
                    }
                    Some(Ok(())) => debug!("Authorization code exchanged"),
                }
            }
            RedirectOutcome::Success(_) | RedirectOutcome::None => {}
        }

        if fresh_sign_in && retry.settle().await.is_err() {
            return self.abandoned();
        }

        self.transition(Phase::VerifyingSession);
        self.verify(&mut retry, email_hint.as_deref(), fresh_sign_in).await
    }

    async fn verify(
        &self,
        retry: &mut RetryScheduler,
        email_hint: Option<&str>,
        fresh_sign_in: bool,
    ) -> Session {
        loop {
            let Some(result) = guarded(&self.token, self.inner.backend.check_session()).await else {
                return self.abandoned();
            };

            let unreachable = match result {
                Ok(envelope) => match resolve_user(&envelope, email_hint) {
                    Some(user) => return self.succeed(user, fresh_sign_in),
                    None if envelope.authenticated => {
                        warn!("Backend affirmed a session without a usable user");
                        true
                    }
                    None => {
                        debug!(
                            attempt = retry.attempt(),
                            message = envelope.message.as_deref().unwrap_or_default(),
                            "Session not authenticated yet"
                        );
                        false
                    }
                },
                Err(err) => {
                    warn!(attempt = retry.attempt(), error = %err, "Session check failed");
                    true
                }
            };

            match retry.wait_next().await {
                Ok(_) => {}
                Err(RetryError::Cancelled) => return self.abandoned(),
                Err(RetryError::Exhausted { attempts }) => {
                    let err = AuthError::Exhausted { attempts, unreachable };
                    warn!(error = %err, "Giving up on session verification");
                    return self.unauthenticated(err.reason());
                }
            }
        }
    }

    fn succeed(&self, user: User, fresh_sign_in: bool) -> Session {
        let inner = self.inner;
        info!(user_id = %user.id, fresh_sign_in, "Session authenticated");
        let session = Session::authenticated(user);
        let applied = inner.effect(&self.token, || {
            inner.store.publish(session.clone());

            if fresh_sign_in {
                let name = session.user.as_ref().map_or("", |user| user.name.as_str());
                inner.notifier.notify(Notification::success(format!("Signed in as {name}")));
            }

            let dashboard = &inner.config.dashboard_path;
            if inner.location.current_url().path() == dashboard.as_str() {
                debug!("Already on the protected destination");
            } else {
                inner.location.navigate(NavigationTarget::Route(dashboard.clone()));
            }
        });

        if applied {
            session
        } else {
            self.abandoned()
        }
    }

    fn fail(&self, reason: FailureReason) -> Session {
        self.conclude(Session::failed(reason))
    }

    fn unauthenticated(&self, reason: FailureReason) -> Session {
        self.conclude(Session::unauthenticated(Some(reason)))
    }

    /// Publishes a negative terminal session, notifies once and sends the
    /// browser to the login route with the reason attached.
    fn conclude(&self, session: Session) -> Session {
        let inner = self.inner;
        let reason = session.reason.clone().unwrap_or(FailureReason::AuthTimeout);
        info!(phase = %session.phase, reason = %reason, "Session reconciliation ended");
        let applied = inner.effect(&self.token, || {
            inner.store.publish(session.clone());
            inner.notifier.notify(Notification::error(reason.message()));
            let login = inner.config.login_route(Some(&reason));
            inner.location.navigate(NavigationTarget::Route(login));
        });

        if applied {
            session
        } else {
            self.abandoned()
        }
    }

    fn abandoned(&self) -> Session {
        debug!("Reconciliation abandoned");
        self.inner.store.current()
    }

    /// Moves to an in-flight phase while keeping the current belief.
    fn transition(&self, phase: Phase) {
        debug_assert!(phase.is_in_flight());
        let store = &self.inner.store;
        self.inner.effect(&self.token, || {
            store.publish(store.current().with_phase(phase));
        });
    }
}

/// Runs `fut` unless `token` is cancelled first. `None` means the result
/// must be discarded.
async fn guarded<T>(token: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        () = token.cancelled() => None,
        out = fut => (!token.is_cancelled()).then_some(out),
    }
}

/// User for an authenticated envelope. A success redirect's email hint
/// stands in when the backend omits a usable user.
fn resolve_user(envelope: &SessionEnvelope, email_hint: Option<&str>) -> Option<User> {
    if let Some(user) = envelope.verified_user() {
        return Some(user.clone());
    }
    if !envelope.authenticated {
        return None;
    }
    email_hint.map(User::from_email).filter(User::is_valid)
}

const fn outcome_kind(outcome: &RedirectOutcome) -> &'static str {
    match outcome {
        RedirectOutcome::Code(_) => "code",
        RedirectOutcome::Success(_) => "success",
        RedirectOutcome::Error(_) => "error",
        RedirectOutcome::None => "none",
    }
}
