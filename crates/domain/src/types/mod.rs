//! Domain types and models

pub mod navigation;
pub mod reason;
pub mod redirect;
pub mod session;

pub use navigation::{NavigationTarget, Notification, NotificationLevel};
pub use reason::FailureReason;
pub use redirect::RedirectOutcome;
pub use session::{Phase, Session, SessionEnvelope, User};
