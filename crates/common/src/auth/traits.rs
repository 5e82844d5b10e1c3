//! Traits for OAuth operations
//!
//! Lets identity adapters be tested against a scripted client instead of a
//! live authorization server.

use async_trait::async_trait;

use super::client::{AuthorizationRequest, OAuthClientError};
use super::types::TokenSet;

/// Trait for OAuth client operations
#[async_trait]
pub trait OAuthClientTrait: Send + Sync {
    /// Build an authorization redirect (PKCE + state) for `scopes`.
    fn authorization_request(&self, scopes: &[String], redirect_uri: &str) -> AuthorizationRequest;

    /// Redeem an authorization code with its PKCE verifier.
    ///
    /// # Errors
    /// Returns error if the code is rejected or the response cannot be read
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> Result<TokenSet, OAuthClientError>;

    /// Refresh grant for `scopes`.
    ///
    /// # Errors
    /// Returns error if refresh fails or the refresh token is invalid/revoked
    async fn refresh_access_token(
        &self,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<TokenSet, OAuthClientError>;

    /// End-session URL returning the browser to `post_logout_redirect_uri`.
    fn logout_url(&self, post_logout_redirect_uri: &str) -> String;
}
