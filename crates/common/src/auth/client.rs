//! OAuth 2.0 client for authority-based providers
//!
//! Handles the browser redirect flow and the token endpoint:
//! - Authorization URL building with PKCE
//! - Authorization code exchange
//! - Refresh grant
//! - End-session (logout) URL building

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use super::pkce::PkceChallenge;
use super::traits::OAuthClientTrait;
use super::types::{OAuthConfig, OAuthError, TokenResponse, TokenSet, OIDC_BASE_SCOPES};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for OAuth client operations
#[derive(Debug, thiserror::Error)]
pub enum OAuthClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The authorization server answered with an RFC 6749 error body
    #[error("OAuth error: {0}")]
    OAuth(OAuthError),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl OAuthClientError {
    /// Whether only a new interactive authorization can get past this error.
    #[must_use]
    pub fn requires_interaction(&self) -> bool {
        match self {
            Self::NoRefreshToken => true,
            Self::OAuth(error) => error.requires_interaction(),
            _ => false,
        }
    }
}

/// A prepared authorization redirect
///
/// `state` and `code_verifier` must be kept server-side until the callback
/// arrives; the verifier is required to redeem the code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub code_verifier: String,
}

/// OAuth 2.0 client with PKCE support (RFC 6749, RFC 7636)
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: Client,
}

impl OAuthClient {
    /// Create a client with its own HTTP connection pool.
    ///
    /// # Errors
    /// Returns `ConfigError` if the HTTP client cannot be built.
    pub fn new(config: OAuthConfig) -> Result<Self, OAuthClientError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| OAuthClientError::ConfigError(e.to_string()))?;
        Ok(Self { config, http })
    }

    /// Create a client that shares an existing HTTP client.
    #[must_use]
    pub fn with_http_client(config: OAuthConfig, http: Client) -> Self {
        Self { config, http }
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization redirect for `scopes`.
    ///
    /// The OpenID base scopes are always requested in addition, so an empty
    /// scope list is a plain sign-in.
    #[must_use]
    pub fn authorization_request(&self, scopes: &[String], redirect_uri: &str) -> AuthorizationRequest {
        let challenge = PkceChallenge::generate();
        let scope = scope_param(scopes);

        let params: [(&str, &str); 8] = [
            ("client_id", self.config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("response_mode", "query"),
            ("scope", scope.as_str()),
            ("state", challenge.state.as_str()),
            ("code_challenge", challenge.code_challenge.as_str()),
            ("code_challenge_method", challenge.challenge_method()),
        ];

        let url = format!("{}?{}", self.config.authorization_url(), encode_query(&params));

        AuthorizationRequest { url, state: challenge.state, code_verifier: challenge.code_verifier }
    }

    /// Redeem an authorization code.
    ///
    /// # Errors
    /// Returns `OAuth` when the server rejects the code, `RequestFailed` on
    /// transport failure and `ParseError` on an unreadable response.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> Result<TokenSet, OAuthClientError> {
        let scope = scope_param(scopes);
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", code_verifier),
            ("scope", scope.as_str()),
        ];
        if let Some(secret) = self.config.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        debug!(grant_type = "authorization_code", "Requesting tokens");
        let response = self.http.post(self.config.token_url()).form(&form).send().await?;
        parse_token_response(response).await
    }

    /// Obtain a new access token for `scopes` from a refresh token.
    ///
    /// # Errors
    /// Returns `NoRefreshToken` for an empty refresh token, otherwise as for
    /// [`Self::exchange_code`].
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<TokenSet, OAuthClientError> {
        if refresh_token.is_empty() {
            return Err(OAuthClientError::NoRefreshToken);
        }

        let scope = scope_param(scopes);
        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.config.client_id.as_str()),
            ("refresh_token", refresh_token),
            ("scope", scope.as_str()),
        ];
        if let Some(secret) = self.config.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        debug!(grant_type = "refresh_token", scope = %scope, "Requesting tokens");
        let response = self.http.post(self.config.token_url()).form(&form).send().await?;
        parse_token_response(response).await
    }

    /// End-session URL that returns the browser to `post_logout_redirect_uri`.
    #[must_use]
    pub fn logout_url(&self, post_logout_redirect_uri: &str) -> String {
        let params = [("post_logout_redirect_uri", post_logout_redirect_uri)];
        format!("{}?{}", self.config.logout_url(), encode_query(&params))
    }
}

/// Requested scopes plus the OpenID base scopes, without duplicates.
fn scope_param(scopes: &[String]) -> String {
    let mut merged: Vec<&str> = Vec::with_capacity(scopes.len() + OIDC_BASE_SCOPES.len());
    for scope in scopes.iter().map(String::as_str).chain(OIDC_BASE_SCOPES) {
        if !scope.is_empty() && !merged.contains(&scope) {
            merged.push(scope);
        }
    }
    merged.join(" ")
}

fn encode_query(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

async fn parse_token_response(response: Response) -> Result<TokenSet, OAuthClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return match serde_json::from_str::<OAuthError>(&body) {
            Ok(error) => Err(OAuthClientError::OAuth(error)),
            Err(_) => Err(OAuthClientError::ParseError(format!(
                "token endpoint returned {status} without an OAuth error body"
            ))),
        };
    }

    let token_response: TokenResponse =
        response.json().await.map_err(|e| OAuthClientError::ParseError(e.to_string()))?;

    Ok(token_response.into())
}

#[async_trait]
impl OAuthClientTrait for OAuthClient {
    fn authorization_request(&self, scopes: &[String], redirect_uri: &str) -> AuthorizationRequest {
        Self::authorization_request(self, scopes, redirect_uri)
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> Result<TokenSet, OAuthClientError> {
        Self::exchange_code(self, code, code_verifier, redirect_uri, scopes).await
    }

    async fn refresh_access_token(
        &self,
        refresh_token: &str,
        scopes: &[String],
    ) -> Result<TokenSet, OAuthClientError> {
        Self::refresh_access_token(self, refresh_token, scopes).await
    }

    fn logout_url(&self, post_logout_redirect_uri: &str) -> String {
        Self::logout_url(self, post_logout_redirect_uri)
    }
}
