//! # SessionGate Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Session store adapters (RedisJSON, in-memory)
//! - The OAuth identity provider adapter
//! - The backend API client
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `sessiongate-core`
//! - Depends on `sessiongate-common` for OAuth and redaction helpers
//! - Contains all "impure" code (network, environment, files)

pub mod api;
pub mod config;
pub mod errors;
pub mod identity;
pub mod observability;
pub mod store;

// Re-export commonly used items
pub use api::{ApiError, BackendApiClient};
pub use errors::InfraError;
pub use identity::OAuthIdentityProvider;
pub use observability::{init_tracing, LogFormat};
pub use store::{ConnectionState, InMemorySessionStore, RedisSessionStore, StoreConnectionManager};
