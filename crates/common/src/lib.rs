//! Modular common utilities shared across SessionGate crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: credential redaction for log output
//! - `platform`: OAuth 2.0 client plumbing (PKCE, authorize/logout URLs, code
//!   exchange, refresh grant)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod security;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;

#[cfg(feature = "foundation")]
pub use security::{redact, redact_connection_string};
