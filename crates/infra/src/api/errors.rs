//! API-specific error types
//!
//! Classifies failures of outbound backend calls and folds them into the
//! domain error at the port boundary.

use std::time::Duration;

use sessiongate_domain::SessionGateError;
use thiserror::Error;

/// Categories of API errors
///
/// The client never retries on its own; the category tells callers which
/// failures are worth another attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// 401 / 403: the bearer token was rejected
    Authentication,
    /// 429: retry with backoff
    RateLimit,
    /// 5xx: retryable
    Server,
    /// Other 4xx: non-retryable
    Client,
    /// Connection failures and timeouts: retryable
    Network,
    /// Unreadable response bodies or bad configuration
    Config,
}

/// Backend API call errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether a caller may reasonably retry the request.
    ///
    /// Advisory only: [`BackendApiClient`](super::BackendApiClient) performs a
    /// single attempt per call.
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Config(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<ApiError> for SessionGateError {
    fn from(err: ApiError) -> Self {
        let message = err.to_string();
        match err.category() {
            ApiErrorCategory::Authentication => Self::InteractionRequired(message),
            ApiErrorCategory::Config => match err {
                ApiError::Decode(_) => Self::Serialization(message),
                _ => Self::Config(message),
            },
            ApiErrorCategory::Client
            | ApiErrorCategory::RateLimit
            | ApiErrorCategory::Server
            | ApiErrorCategory::Network => Self::Network(message),
        }
    }
}
