//! # SessionGate Core
//!
//! Session and token business logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the session store and the identity provider
//! - `SessionService`: typed access to TTL-bounded session records
//! - `TokenAcquisitionEngine`: silent-first token acquisition with an
//!   interactive redirect fallback, plus the sign-in/sign-out flow
//!
//! ## Architecture Principles
//! - Only depends on `sessiongate-domain`
//! - No Redis, HTTP, or platform code
//! - All external dependencies via traits

pub mod session;
pub mod token;

pub use session::ports::SessionStore;
pub use session::SessionService;
pub use token::ports::IdentityProvider;
pub use token::TokenAcquisitionEngine;
