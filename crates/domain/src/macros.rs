//! Macro for implementing Display and FromStr for tag enums
//!
//! Used for the reconciliation phase and endpoint method enums so their
//! string form stays consistent between logs, config files and tests.
//!
//! # Example
//!
//! ```rust
//! use calgentic_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Verdict {
//!     Allowed,
//!     Denied,
//! }
//!
//! impl_domain_status_conversions!(Verdict {
//!     Allowed => "allowed",
//!     Denied => "denied",
//! });
//! ```

/// Implements Display and FromStr traits for tag enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive strings to enum variants
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
