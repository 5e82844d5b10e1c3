//! Session record types
//!
//! A session is persisted as one JSON document under a key equal to its
//! session id. Field names follow the camelCase layout the web layer writes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::token::ScopeSet;

/// Identity-provider account descriptor
///
/// Enough to re-request tokens for the user without re-authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Subject identifier (home account id for multi-tenant providers)
    #[serde(rename = "sub", alias = "homeAccountId")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AccountInfo {
    /// Create an account descriptor for a subject
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self { subject: subject.into(), tenant_id: None, username: None, name: None }
    }

    /// Attach the tenant the account signed in through
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

/// Application-level profile attached after sign-in
///
/// Read-only to the token core. Unknown fields written by the backend are
/// kept verbatim so a read/write cycle never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group object ids carried in the user's token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_token_groups: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Token material cached for one granted scope set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedToken {
    pub scopes: ScopeSet,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a cached token that expires `expires_in` seconds from now.
    ///
    /// A non-positive `expires_in` leaves the expiry unset.
    #[must_use]
    pub fn new(scopes: ScopeSet, access_token: impl Into<String>, expires_in: i64) -> Self {
        let expires_at = (expires_in > 0).then(|| Utc::now() + Duration::seconds(expires_in));
        Self {
            scopes,
            access_token: access_token.into(),
            refresh_token: None,
            id_token: None,
            expires_at,
        }
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// True if the token is expired or expires within `threshold_seconds`.
    ///
    /// Tokens without an expiry are never considered expired.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Utc::now() + Duration::seconds(threshold_seconds) >= expires_at)
    }

    /// Whether this token was granted for every scope in `requested`.
    #[must_use]
    pub fn covers(&self, requested: &ScopeSet) -> bool {
        self.scopes.contains_all(requested)
    }
}

/// Persisted session record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Store key; filled from the key on read when the document omits it
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cached_tokens: Vec<CachedToken>,
}

impl Session {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_account(mut self, account: AccountInfo) -> Self {
        self.account = Some(account);
        self
    }

    /// Find a cached token granted for (at least) the requested scopes.
    ///
    /// An exact scope match is preferred over a superset.
    #[must_use]
    pub fn cached_token_for(&self, scopes: &ScopeSet) -> Option<&CachedToken> {
        self.cached_tokens
            .iter()
            .find(|token| &token.scopes == scopes)
            .or_else(|| self.cached_tokens.iter().find(|token| token.covers(scopes)))
    }

    /// Insert or replace the cached token for the token's scope set.
    ///
    /// Returns `false` when an identical entry was already cached.
    pub fn upsert_cached_token(&mut self, token: CachedToken) -> bool {
        match self.cached_tokens.iter_mut().find(|cached| cached.scopes == token.scopes) {
            Some(existing) if *existing == token => false,
            Some(existing) => {
                *existing = token;
                true
            }
            None => {
                self.cached_tokens.push(token);
                true
            }
        }
    }
}
