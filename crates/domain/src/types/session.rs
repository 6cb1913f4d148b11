//! Session and user types
//!
//! The `Session` is the single value the view layer renders. It is only ever
//! replaced wholesale by the reconciler.

use serde::{Deserialize, Serialize};

use super::reason::FailureReason;
use crate::impl_domain_status_conversions;

/// Authenticated user profile as reported by the backend session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl User {
    /// A user is usable for an authenticated session only with a non-empty
    /// identifier and email.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Builds a minimal user from an email address, using the local part as
    /// the display name.
    #[must_use]
    pub fn from_email(email: &str) -> Self {
        let email = email.trim();
        let name = email.split('@').next().unwrap_or(email);
        Self {
            id: email.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            picture: None,
        }
    }
}

/// Reconciliation state machine tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    ParsingRedirect,
    ExchangingCode,
    VerifyingSession,
    Authenticated,
    Unauthenticated,
    Failed,
}

impl_domain_status_conversions!(Phase {
    Idle => "idle",
    ParsingRedirect => "parsing_redirect",
    ExchangingCode => "exchanging_code",
    VerifyingSession => "verifying_session",
    Authenticated => "authenticated",
    Unauthenticated => "unauthenticated",
    Failed => "failed",
});

impl Phase {
    /// Stable phases the machine leaves only on an external trigger.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Authenticated | Self::Unauthenticated | Self::Failed)
    }

    /// Phases that belong to a running reconciliation.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::ParsingRedirect | Self::ExchangingCode | Self::VerifyingSession)
    }
}

/// Authoritative browser session belief.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<User>,
    pub phase: Phase,
    /// Reason recorded by the last `Failed` or `Unauthenticated` transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl Session {
    /// Initial session: idle and unauthenticated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self { authenticated: true, user: Some(user), phase: Phase::Authenticated, reason: None }
    }

    /// Unauthenticated terminal session, optionally carrying a reason.
    #[must_use]
    pub fn unauthenticated(reason: Option<FailureReason>) -> Self {
        Self { authenticated: false, user: None, phase: Phase::Unauthenticated, reason }
    }

    #[must_use]
    pub fn failed(reason: FailureReason) -> Self {
        Self { authenticated: false, user: None, phase: Phase::Failed, reason: Some(reason) }
    }

    /// Same belief, new phase. Used for in-flight transitions.
    #[must_use]
    pub fn with_phase(&self, phase: Phase) -> Self {
        Self { phase, ..self.clone() }
    }

    /// Checks the `authenticated => valid user` invariant.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        !self.authenticated || self.user.as_ref().is_some_and(User::is_valid)
    }
}

/// Decoded backend session response (`/api/check-auth` and code exchange).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionEnvelope {
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SessionEnvelope {
    /// The user, if the envelope affirms a valid authenticated session.
    #[must_use]
    pub fn verified_user(&self) -> Option<&User> {
        if self.authenticated {
            self.user.as_ref().filter(|user| user.is_valid())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn user() -> User {
        User {
            id: "108".into(),
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            picture: None,
        }
    }

    #[test]
    fn initial_session_is_idle_and_unauthenticated() {
        let session = Session::new();
        assert_eq!(session.phase, Phase::Idle);
        assert!(!session.authenticated);
        assert!(session.user.is_none());
        assert!(session.is_consistent());
    }

    #[test]
    fn user_requires_id_and_email() {
        assert!(user().is_valid());
        assert!(!User { email: " ".into(), ..user() }.is_valid());
        assert!(!User { id: String::new(), ..user() }.is_valid());
    }

    #[test]
    fn user_from_email_uses_local_part_as_name() {
        let user = User::from_email("grace@navy.mil");
        assert_eq!(user.id, "grace@navy.mil");
        assert_eq!(user.name, "grace");
        assert!(user.is_valid());
    }

    #[test]
    fn with_phase_keeps_belief() {
        let session = Session::authenticated(user()).with_phase(Phase::VerifyingSession);
        assert!(session.authenticated);
        assert_eq!(session.phase, Phase::VerifyingSession);
        assert!(session.is_consistent());
    }

    #[test]
    fn phase_classification() {
        assert!(Phase::Failed.is_terminal());
        assert!(Phase::ExchangingCode.is_in_flight());
        assert!(!Phase::Idle.is_terminal());
        assert!(!Phase::Idle.is_in_flight());
        assert_eq!(Phase::from_str("verifying_session").unwrap(), Phase::VerifyingSession);
        assert_eq!(Phase::ParsingRedirect.to_string(), "parsing_redirect");
    }

    #[test]
    fn envelope_only_verifies_valid_users() {
        let envelope: SessionEnvelope = serde_json::from_str(
            r#"{"authenticated": true, "user": {"id": "1", "name": "A", "email": ""}}"#,
        )
        .unwrap();
        assert!(envelope.verified_user().is_none());

        let envelope: SessionEnvelope =
            serde_json::from_str(r#"{"authenticated": false, "message": "No session found"}"#)
                .unwrap();
        assert!(envelope.verified_user().is_none());
        assert_eq!(envelope.message.as_deref(), Some("No session found"));
    }
}
