//! OAuth 2.0 types and structures
//!
//! Token sets, token endpoint responses, provider configuration and the
//! RFC 6749 error body.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Scopes every interactive or refresh request carries so the provider
/// issues an ID token and a refresh token.
pub const OIDC_BASE_SCOPES: [&str; 3] = ["openid", "profile", "offline_access"];

/// OAuth 2.0 access and refresh tokens with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,

    /// Optional because providers may omit it on refresh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (JWT) containing user claims (OpenID Connect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    pub token_type: String,

    /// Access token lifetime in seconds
    pub expires_in: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Granted scopes (space-separated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenSet {
    /// Create a new `TokenSet`, deriving `expires_at` from `expires_in`.
    #[must_use]
    pub fn new(
        access_token: String,
        refresh_token: Option<String>,
        id_token: Option<String>,
        expires_in: i64,
        scope: Option<String>,
    ) -> Self {
        let expires_at = (expires_in > 0).then(|| Utc::now() + Duration::seconds(expires_in));

        Self {
            access_token,
            refresh_token,
            id_token,
            token_type: "Bearer".to_string(),
            expires_in,
            expires_at,
            scope,
        }
    }

    /// Check if the access token is expired or will expire within the given
    /// threshold. Tokens without an expiry are never expired.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Utc::now() + Duration::seconds(threshold_seconds) >= expires_at)
    }

    /// Decode the claims of the ID token, if one was issued.
    ///
    /// # Errors
    /// Returns [`ClaimsError`] when the ID token is not a well-formed JWT.
    pub fn id_token_claims(&self) -> Option<Result<IdTokenClaims, ClaimsError>> {
        self.id_token.as_deref().map(IdTokenClaims::decode)
    }
}

/// OAuth token response from the token endpoint (RFC 6749 §5.1)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl From<TokenResponse> for TokenSet {
    fn from(response: TokenResponse) -> Self {
        let mut tokens = Self::new(
            response.access_token,
            response.refresh_token,
            response.id_token,
            response.expires_in,
            response.scope,
        );
        tokens.token_type = response.token_type;
        tokens
    }
}

/// OAuth configuration for an authority-based provider
///
/// Endpoints follow the v2 layout `{authority}/oauth2/v2.0/{endpoint}`.
#[derive(Clone)]
pub struct OAuthConfig {
    /// Authority base URL, e.g. `https://login.microsoftonline.com/{tenant}`
    pub authority: String,

    pub client_id: String,

    /// Confidential clients send this on every token request
    pub client_secret: Option<String>,
}

impl OAuthConfig {
    #[must_use]
    pub fn new(authority: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self { authority: authority.into(), client_id: client_id.into(), client_secret: None }
    }

    #[must_use]
    pub fn with_client_secret(mut self, secret: Option<String>) -> Self {
        self.client_secret = secret.filter(|s| !s.is_empty());
        self
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/oauth2/v2.0/{name}", self.authority.trim_end_matches('/'))
    }

    #[must_use]
    pub fn authorization_url(&self) -> String {
        self.endpoint("authorize")
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        self.endpoint("token")
    }

    #[must_use]
    pub fn logout_url(&self) -> String {
        self.endpoint("logout")
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("authority", &self.authority)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

/// OAuth error response from the authorization server (RFC 6749 §5.2)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl OAuthError {
    /// Whether the error can only be resolved by sending the user through an
    /// interactive authorization again.
    #[must_use]
    pub fn requires_interaction(&self) -> bool {
        matches!(
            self.error.as_str(),
            "invalid_grant" | "interaction_required" | "consent_required" | "login_required"
        )
    }
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}

/// Subset of OpenID Connect ID token claims used to identify the account
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    /// Object id (stable across applications in the same tenant)
    pub oid: Option<String>,
    /// Tenant id
    pub tid: Option<String>,
    pub preferred_username: Option<String>,
    pub name: Option<String>,
}

/// Failure to read the claims out of an ID token
#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    #[error("ID token is not a three-part JWT")]
    Malformed,
    #[error("ID token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("ID token payload is not valid claims JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl IdTokenClaims {
    /// Decode the payload segment of a JWT.
    ///
    /// The signature is not checked: the token arrives directly from the
    /// token endpoint over TLS in the code flow.
    ///
    /// # Errors
    /// Returns [`ClaimsError`] when the token is not a well-formed JWT.
    pub fn decode(id_token: &str) -> Result<Self, ClaimsError> {
        let mut parts = id_token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ClaimsError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Account identifier: `{oid}.{tid}` when both are present, else `sub`.
    #[must_use]
    pub fn home_account_id(&self) -> String {
        match (&self.oid, &self.tid) {
            (Some(oid), Some(tid)) => format!("{oid}.{tid}"),
            _ => self.sub.clone(),
        }
    }
}
