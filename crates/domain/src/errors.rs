//! Error types used throughout the session and token core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SessionGate
///
/// A missing session is not represented here: lookups return `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SessionGateError {
    /// The backing key-value store could not be reached.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// A required identifier was missing or malformed (caller defect).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No identity-provider account could be resolved for the session.
    #[error("No account available for session: {0}")]
    NoAccount(String),

    /// Silent acquisition is impossible; the user has to consent again.
    #[error("Interaction required: {0}")]
    InteractionRequired(String),

    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionGateError {
    /// Stable label suitable for structured log fields.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Serialization(_) => "serialization",
            Self::NoAccount(_) => "no_account",
            Self::InteractionRequired(_) => "interaction_required",
            Self::TokenAcquisition(_) => "token_acquisition",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller should answer the request as unauthenticated
    /// rather than as a server failure.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::NoAccount(_) | Self::InteractionRequired(_))
    }
}

impl From<serde_json::Error> for SessionGateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for SessionGate operations
pub type Result<T> = std::result::Result<T, SessionGateError>;
