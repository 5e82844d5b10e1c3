//! OAuth 2.0 + PKCE infrastructure
//!
//! Stateless client plumbing for authority-based identity providers (v2
//! endpoint layout). Pending authorizations and cached tokens are owned by
//! the caller; this module only talks to the authorization server.
//!
//! # Module Organization
//!
//! - **[`types`]**: `TokenSet`, `OAuthConfig`, `OAuthError`, ID token claims
//! - **[`pkce`]**: PKCE challenge generation
//! - **[`client`]**: authorization URL, code exchange, refresh, logout URL
//! - **[`traits`]**: `OAuthClientTrait` seam for adapters and tests
//!
//! # Usage Example
//!
//! ```no_run
//! use sessiongate_common::auth::{OAuthClient, OAuthConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OAuthConfig::new("https://login.microsoftonline.com/tenant-id", "client-id");
//! let client = OAuthClient::new(config)?;
//!
//! let request = client.authorization_request(&[], "https://app.example.com/oauth/callback");
//! // Send the browser to request.url; keep request.state and
//! // request.code_verifier until the callback arrives.
//!
//! let tokens = client
//!     .exchange_code("code-from-callback", &request.code_verifier, "https://app.example.com/oauth/callback", &[])
//!     .await?;
//! println!("access token expires in {} seconds", tokens.expires_in);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod pkce;
pub mod traits;
pub mod types;

pub use client::{AuthorizationRequest, OAuthClient, OAuthClientError};
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state, PkceChallenge};
pub use traits::OAuthClientTrait;
pub use types::{
    ClaimsError, IdTokenClaims, OAuthConfig, OAuthError, TokenResponse, TokenSet, OIDC_BASE_SCOPES,
};
