//! Integration tests for session types
//!
//! Covers the shapes other layers depend on: the JSON the view layer
//! renders, and how failure reasons travel to the login route.

use calgentic_domain::{
    AuthConfig, FailureReason, Phase, RedirectOutcome, Session, SessionEnvelope, User,
};

fn ada() -> User {
    User {
        id: "108234".to_string(),
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        picture: None,
    }
}

#[test]
fn test_session_json_shape_for_view_layer() {
    let session = Session::unauthenticated(Some(FailureReason::AuthTimeout));
    let value = serde_json::to_value(&session).expect("serialize");

    assert_eq!(
        value,
        serde_json::json!({
            "authenticated": false,
            "user": null,
            "phase": "unauthenticated",
            "reason": "auth_timeout"
        })
    );
}

#[test]
fn test_in_flight_phase_keeps_prior_belief() {
    let signed_in = Session::authenticated(ada());
    let verifying = signed_in.with_phase(Phase::VerifyingSession);

    assert!(verifying.authenticated);
    assert_eq!(verifying.user, Some(ada()));
    assert!(verifying.phase.is_in_flight());
    assert!(verifying.is_consistent());
}

#[test]
fn test_every_constructor_is_consistent() {
    let sessions = [
        Session::new(),
        Session::authenticated(ada()),
        Session::unauthenticated(None),
        Session::failed(FailureReason::TokenExchangeFailed),
    ];

    assert!(sessions.iter().all(Session::is_consistent));
    assert!(sessions.iter().skip(1).all(|s| s.phase.is_terminal()));
}

#[test]
fn test_authenticated_without_user_is_inconsistent() {
    let session =
        Session { authenticated: true, user: None, phase: Phase::Authenticated, reason: None };
    assert!(!session.is_consistent());
}

#[test]
fn test_backend_code_reaches_login_route_verbatim() {
    let config = AuthConfig::default();
    let reason = FailureReason::from_code("no_id_token");

    assert_eq!(reason, FailureReason::NoIdToken);
    assert_eq!(config.login_route(Some(&reason)), "/login?error=no_id_token");
    assert_eq!(config.login_route(None), "/login");

    let unknown = FailureReason::from_code("interaction_required");
    assert_eq!(config.login_route(Some(&unknown)), "/login?error=interaction_required");
}

#[test]
fn test_envelope_with_incomplete_user_is_not_verified() {
    let envelope: SessionEnvelope = serde_json::from_str(
        r#"{"authenticated": true, "user": {"id": "", "name": "", "email": ""}}"#,
    )
    .expect("deserialize");

    assert!(envelope.authenticated);
    assert!(envelope.verified_user().is_none());
}

#[test]
fn test_redirect_outcome_sign_in_classification() {
    assert!(RedirectOutcome::Code("XYZ".to_string()).is_sign_in());
    assert!(RedirectOutcome::Success("ada@example.com".to_string()).is_sign_in());
    assert!(!RedirectOutcome::Error("access_denied".to_string()).is_sign_in());
    assert!(!RedirectOutcome::None.is_sign_in());
    assert_eq!(
        RedirectOutcome::Success("ada@example.com".to_string()).email_hint(),
        Some("ada@example.com")
    );
}
