//! Port interfaces for the identity provider
//!
//! The provider SDK is a black box to the core: it lists cached accounts,
//! attempts silent acquisition, and builds interactive redirects.

use async_trait::async_trait;
use sessiongate_domain::{
    AccountInfo, RedirectCompletion, Result, Session, SilentTokenResult, TokenRequest,
};

/// Identity provider operations the token engine depends on
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Accounts the provider can act for in this session, preferred first.
    async fn accounts(&self, session: &Session) -> Result<Vec<AccountInfo>>;

    /// Attempt to obtain a token without user interaction.
    ///
    /// Never fails outright: interaction-required and hard failures are
    /// distinct variants of the result.
    async fn acquire_token_silent(&self, request: &TokenRequest, session: &Session)
        -> SilentTokenResult;

    /// Build the authorization URL the browser must be sent to.
    ///
    /// `request.redirect_uri` must be set.
    async fn acquire_token_redirect(&self, request: &TokenRequest) -> Result<String>;

    /// Redeem the authorization response delivered to the callback route.
    async fn complete_redirect(&self, code: &str, state: &str) -> Result<RedirectCompletion>;

    /// End-session URL returning the browser to `post_logout_redirect_uri`.
    fn logout_url(&self, post_logout_redirect_uri: &str) -> Result<String>;
}
