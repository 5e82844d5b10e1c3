//! OAuth 2.0 / OpenID Connect identity provider
//!
//! Implements the token engine's identity port on top of the authorization
//! code flow with PKCE. Token material lives in the session record, so the
//! silent path works from `session.cached_tokens` and the refresh grant;
//! nothing is cached in this process apart from in-flight authorizations.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sessiongate_common::auth::{OAuthClient, OAuthClientTrait, OAuthConfig, TokenSet};
use sessiongate_core::IdentityProvider;
use sessiongate_domain::constants::DEFAULT_REFRESH_THRESHOLD_SECONDS;
use sessiongate_domain::{
    AccountInfo, CachedToken, IdentityConfig, RedirectCompletion, Result, ScopeSet, Session,
    SessionGateError, SilentTokenResult, TokenRequest,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::errors::InfraError;

/// How long an authorization started by a redirect may take to come back.
const PENDING_AUTHORIZATION_TTL: Duration = Duration::from_secs(600);

/// Server-side half of an authorization redirect, keyed by `state`
struct PendingAuthorization {
    code_verifier: String,
    redirect_uri: String,
    scopes: ScopeSet,
    started_at: Instant,
}

/// Identity provider backed by an OAuth 2.0 authorization server
pub struct OAuthIdentityProvider {
    client: Arc<dyn OAuthClientTrait>,
    pending: Mutex<HashMap<String, PendingAuthorization>>,
    refresh_threshold_seconds: i64,
}

impl OAuthIdentityProvider {
    pub fn new(client: Arc<dyn OAuthClientTrait>) -> Self {
        Self {
            client,
            pending: Mutex::new(HashMap::new()),
            refresh_threshold_seconds: DEFAULT_REFRESH_THRESHOLD_SECONDS,
        }
    }

    /// Build a provider for an app registration.
    ///
    /// # Errors
    /// Returns `Config` if the HTTP client cannot be created.
    pub fn from_config(config: &IdentityConfig) -> Result<Self> {
        let oauth = OAuthConfig::new(&config.authority, &config.client_id)
            .with_client_secret(config.client_secret.clone());
        let client = OAuthClient::new(oauth).map_err(InfraError::from)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Treat cached tokens expiring within `seconds` as expired.
    #[must_use]
    pub fn with_refresh_threshold(mut self, seconds: i64) -> Self {
        self.refresh_threshold_seconds = seconds;
        self
    }

    /// Number of redirects still waiting for their callback.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Refresh token to redeem for `scopes`: the matching entry's first, then
/// any other entry's.
fn refresh_token_for<'a>(session: &'a Session, scopes: &ScopeSet) -> Option<&'a str> {
    session
        .cached_token_for(scopes)
        .and_then(|token| token.refresh_token.as_deref())
        .or_else(|| session.cached_tokens.iter().find_map(|token| token.refresh_token.as_deref()))
        .filter(|token| !token.is_empty())
}

/// Cache entry for a token response.
///
/// The entry is keyed by the requested scopes; a plain sign-in falls back to
/// what the server granted. A refresh response without a new refresh token
/// keeps the one that was redeemed.
fn to_cached_token(token: TokenSet, requested: &ScopeSet, redeemed_refresh: Option<&str>) -> CachedToken {
    let scopes = if requested.is_empty() {
        token.scope.as_deref().map(ScopeSet::from_space_delimited).unwrap_or_default()
    } else {
        requested.clone()
    };

    CachedToken {
        scopes,
        access_token: token.access_token,
        refresh_token: token.refresh_token.or_else(|| redeemed_refresh.map(str::to_string)),
        id_token: token.id_token,
        expires_at: token.expires_at,
    }
}

fn scope_list(scopes: &ScopeSet) -> Vec<String> {
    scopes.iter().map(str::to_string).collect()
}

fn account_from(token: &TokenSet) -> Result<AccountInfo> {
    let claims = token
        .id_token_claims()
        .ok_or_else(|| SessionGateError::TokenAcquisition("token response carried no ID token".into()))?
        .map_err(|e| SessionGateError::TokenAcquisition(format!("unreadable ID token: {e}")))?;

    Ok(AccountInfo {
        subject: claims.home_account_id(),
        tenant_id: claims.tid,
        username: claims.preferred_username,
        name: claims.name,
    })
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    async fn accounts(&self, session: &Session) -> Result<Vec<AccountInfo>> {
        Ok(session.account.iter().cloned().collect())
    }

    #[instrument(skip(self, request, session), fields(session_id = %session.session_id, scopes = %request.scopes))]
    async fn acquire_token_silent(&self, request: &TokenRequest, session: &Session) -> SilentTokenResult {
        if let Some(cached) = session.cached_token_for(&request.scopes) {
            if !cached.is_expired(self.refresh_threshold_seconds) {
                debug!("Serving cached access token");
                return SilentTokenResult::Token(cached.clone());
            }
        }

        let Some(refresh_token) = refresh_token_for(session, &request.scopes) else {
            debug!("No refresh token cached for session");
            return SilentTokenResult::InteractionRequired("no refresh token cached for session".into());
        };

        match self.client.refresh_access_token(refresh_token, &scope_list(&request.scopes)).await {
            Ok(token) => {
                debug!("Access token refreshed");
                SilentTokenResult::Token(to_cached_token(token, &request.scopes, Some(refresh_token)))
            }
            Err(err) => match SessionGateError::from(InfraError::from(err)) {
                SessionGateError::InteractionRequired(reason) => {
                    info!(reason = %reason, "Refresh grant needs user interaction");
                    SilentTokenResult::InteractionRequired(reason)
                }
                other => {
                    warn!(error = %other, "Refresh grant failed");
                    SilentTokenResult::Failure(other)
                }
            },
        }
    }

    #[instrument(skip(self, request), fields(scopes = %request.scopes))]
    async fn acquire_token_redirect(&self, request: &TokenRequest) -> Result<String> {
        let redirect_uri = request
            .redirect_uri
            .as_deref()
            .ok_or_else(|| SessionGateError::InvalidArgument("redirect uri is required".into()))?;

        let authorization = self.client.authorization_request(&scope_list(&request.scopes), redirect_uri);

        let mut pending = self.pending.lock().await;
        let now = Instant::now();
        pending.retain(|_, entry| now.duration_since(entry.started_at) < PENDING_AUTHORIZATION_TTL);
        pending.insert(
            authorization.state,
            PendingAuthorization {
                code_verifier: authorization.code_verifier,
                redirect_uri: redirect_uri.to_string(),
                scopes: request.scopes.clone(),
                started_at: now,
            },
        );

        debug!(pending = pending.len(), "Authorization redirect prepared");
        Ok(authorization.url)
    }

    #[instrument(skip(self, code))]
    async fn complete_redirect(&self, code: &str, state: &str) -> Result<RedirectCompletion> {
        let pending = self
            .pending
            .lock()
            .await
            .remove(state)
            .filter(|entry| entry.started_at.elapsed() < PENDING_AUTHORIZATION_TTL)
            .ok_or_else(|| {
                SessionGateError::TokenAcquisition("unknown or expired authorization state".into())
            })?;

        let token = self
            .client
            .exchange_code(code, &pending.code_verifier, &pending.redirect_uri, &scope_list(&pending.scopes))
            .await
            .map_err(InfraError::from)?;

        let account = account_from(&token)?;
        info!(subject = %account.subject, "Authorization code redeemed");

        Ok(RedirectCompletion { account, token: to_cached_token(token, &pending.scopes, None) })
    }

    fn logout_url(&self, post_logout_redirect_uri: &str) -> Result<String> {
        Ok(self.client.logout_url(post_logout_redirect_uri))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use sessiongate_common::auth::{AuthorizationRequest, OAuthClientError, OAuthError};

    use super::*;

    /// Scripted OAuth client recording refresh grants
    #[derive(Default)]
    struct ScriptedOAuthClient {
        refresh: StdMutex<Vec<std::result::Result<TokenSet, OAuthClientError>>>,
        refreshed_with: StdMutex<Vec<(String, Vec<String>)>>,
        exchange: StdMutex<Option<TokenSet>>,
    }

    #[async_trait]
    impl OAuthClientTrait for ScriptedOAuthClient {
        fn authorization_request(&self, scopes: &[String], redirect_uri: &str) -> AuthorizationRequest {
            AuthorizationRequest {
                url: format!("https://idp.example.com/authorize?scope={}&redirect_uri={redirect_uri}", scopes.join(" ")),
                state: "state-1".to_string(),
                code_verifier: "verifier-1".to_string(),
            }
        }

        async fn exchange_code(
            &self,
            _code: &str,
            code_verifier: &str,
            _redirect_uri: &str,
            _scopes: &[String],
        ) -> std::result::Result<TokenSet, OAuthClientError> {
            assert_eq!(code_verifier, "verifier-1");
            self.exchange
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| OAuthClientError::ParseError("no scripted exchange".into()))
        }

        async fn refresh_access_token(
            &self,
            refresh_token: &str,
            scopes: &[String],
        ) -> std::result::Result<TokenSet, OAuthClientError> {
            self.refreshed_with.lock().unwrap().push((refresh_token.to_string(), scopes.to_vec()));
            self.refresh.lock().unwrap().remove(0)
        }

        fn logout_url(&self, post_logout_redirect_uri: &str) -> String {
            format!("https://idp.example.com/logout?post_logout_redirect_uri={post_logout_redirect_uri}")
        }
    }

    fn scopes(items: &[&str]) -> ScopeSet {
        items.iter().copied().collect()
    }

    fn session_with(token: CachedToken) -> Session {
        let mut session = Session::new("sess-1").with_account(AccountInfo::new("u1"));
        session.upsert_cached_token(token);
        session
    }

    fn request(items: &[&str]) -> TokenRequest {
        TokenRequest::new(scopes(items), AccountInfo::new("u1"))
    }

    fn id_token() -> String {
        let payload = serde_json::json!({
            "sub": "abc", "oid": "u1", "tid": "t1", "preferred_username": "ada@example.com"
        });
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    #[tokio::test]
    async fn test_fresh_cached_token_is_returned_without_refresh() {
        let client = Arc::new(ScriptedOAuthClient::default());
        let provider = OAuthIdentityProvider::new(client.clone());
        let session = session_with(CachedToken::new(scopes(&["api.read"]), "tok-abc", 3600));

        let result = provider.acquire_token_silent(&request(&["api.read"]), &session).await;

        assert!(matches!(result, SilentTokenResult::Token(token) if token.access_token == "tok-abc"));
        assert!(client.refreshed_with.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed() {
        let client = Arc::new(ScriptedOAuthClient::default());
        client
            .refresh
            .lock()
            .unwrap()
            .push(Ok(TokenSet::new("tok-new".into(), None, None, 3600, Some("api.read".into()))));
        let provider = OAuthIdentityProvider::new(client.clone());
        let session = session_with(
            CachedToken::new(scopes(&["api.read"]), "tok-old", 60).with_refresh_token("rt-1"),
        );

        let result = provider.acquire_token_silent(&request(&["api.read"]), &session).await;

        let SilentTokenResult::Token(token) = result else { panic!("expected token") };
        assert_eq!(token.access_token, "tok-new");
        assert_eq!(token.refresh_token.as_deref(), Some("rt-1"));
        assert_eq!(
            client.refreshed_with.lock().unwrap().as_slice(),
            &[("rt-1".to_string(), vec!["api.read".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_missing_refresh_token_requires_interaction() {
        let provider = OAuthIdentityProvider::new(Arc::new(ScriptedOAuthClient::default()));
        let session = Session::new("sess-1").with_account(AccountInfo::new("u1"));

        let result = provider.acquire_token_silent(&request(&["api.read"]), &session).await;
        assert!(matches!(result, SilentTokenResult::InteractionRequired(_)));
    }

    #[tokio::test]
    async fn test_refresh_errors_are_classified() {
        let client = Arc::new(ScriptedOAuthClient::default());
        client.refresh.lock().unwrap().extend([
            Err(OAuthClientError::OAuth(OAuthError {
                error: "invalid_grant".into(),
                error_description: None,
            })),
            Err(OAuthClientError::ParseError("garbage".into())),
        ]);
        let provider = OAuthIdentityProvider::new(client);
        let session = session_with(
            CachedToken::new(scopes(&["api.read"]), "tok-old", 1).with_refresh_token("rt-1"),
        );

        let first = provider.acquire_token_silent(&request(&["api.read"]), &session).await;
        assert!(matches!(first, SilentTokenResult::InteractionRequired(_)));

        let second = provider.acquire_token_silent(&request(&["api.read"]), &session).await;
        assert!(matches!(second, SilentTokenResult::Failure(SessionGateError::TokenAcquisition(_))));
    }

    #[tokio::test]
    async fn test_redirect_round_trip() {
        let client = Arc::new(ScriptedOAuthClient::default());
        *client.exchange.lock().unwrap() =
            Some(TokenSet::new("tok-login".into(), Some("rt-9".into()), Some(id_token()), 3600, None));
        let provider = OAuthIdentityProvider::new(client);

        let url = provider
            .acquire_token_redirect(&TokenRequest::sign_in("https://app.example.com/oauth/callback"))
            .await
            .unwrap();
        assert!(url.contains("redirect_uri=https://app.example.com/oauth/callback"));
        assert_eq!(provider.pending_count().await, 1);

        let completion = provider.complete_redirect("code-1", "state-1").await.unwrap();
        assert_eq!(completion.account.subject, "u1.t1");
        assert_eq!(completion.account.username.as_deref(), Some("ada@example.com"));
        assert_eq!(completion.token.refresh_token.as_deref(), Some("rt-9"));
        assert_eq!(provider.pending_count().await, 0);

        let replay = provider.complete_redirect("code-1", "state-1").await;
        assert!(matches!(replay, Err(SessionGateError::TokenAcquisition(_))));
    }

    #[tokio::test]
    async fn test_redirect_requires_redirect_uri() {
        let provider = OAuthIdentityProvider::new(Arc::new(ScriptedOAuthClient::default()));
        let err = provider.acquire_token_redirect(&request(&["api.read"])).await.unwrap_err();
        assert!(matches!(err, SessionGateError::InvalidArgument(_)));
    }
}
