//! Authoritative session store
//!
//! Holds the single `Session` the view layer renders. Readers subscribe to a
//! watch channel; only the reconciler in this crate can publish.

use std::sync::Arc;

use calgentic_domain::Session;
use tokio::sync::watch;
use tracing::{trace, warn};

#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Store holding the initial idle, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::new());
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Replaces the session wholesale. Subscribers are woken only when the
    /// value actually changed. A session claiming authentication without a
    /// valid user is refused.
    pub(crate) fn publish(&self, session: Session) -> bool {
        if !session.is_consistent() {
            warn!(phase = %session.phase, "Refusing authenticated session without a valid user");
            return false;
        }
        self.tx.send_if_modified(|current| {
            if *current == session {
                return false;
            }
            trace!(
                from = %current.phase,
                to = %session.phase,
                terminal = session.phase.is_terminal(),
                "Session updated"
            );
            *current = session;
            true
        })
    }
}
