//! # SessionGate Domain
//!
//! Domain types for the session-backed token cache.
//!
//! This crate contains:
//! - The persisted session record and its parts (account, profile, cached
//!   tokens)
//! - Token acquisition request/outcome types
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other SessionGate crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
