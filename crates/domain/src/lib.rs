//! # CalGentic Domain
//!
//! Business domain types and models for the CalGentic session subsystem.
//!
//! This crate contains:
//! - Session, user, phase and redirect types
//! - Failure reason codes and their user-facing messages
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other CalGentic crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
