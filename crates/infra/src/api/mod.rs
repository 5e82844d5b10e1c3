//! Backend API client
//!
//! Outbound calls to the backend API on behalf of a signed-in user. Callers
//! obtain the bearer token from the token engine with
//! [`BackendApiClient::scope_for`] and pass it per request.

pub mod client;
pub mod errors;

pub use client::{BackendApiClient, BackendApiConfig};
pub use errors::{ApiError, ApiErrorCategory};
