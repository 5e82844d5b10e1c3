//! Token acquisition types
//!
//! Requests and outcomes exchanged between the request layer, the token
//! acquisition engine and the identity provider.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::session::{AccountInfo, CachedToken};
use crate::errors::SessionGateError;

/// Set of requested scopes
///
/// Ordered so that two requests for the same scopes compare equal and
/// serialize identically regardless of the order the caller used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(BTreeSet<String>);

impl ScopeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains_all(&self, other: &Self) -> bool {
        other.0.is_subset(&self.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-delimited form used on the OAuth wire.
    #[must_use]
    pub fn to_space_delimited(&self) -> String {
        self.iter().collect::<Vec<_>>().join(" ")
    }

    /// Parse the space-delimited `scope` field of a token response.
    #[must_use]
    pub fn from_space_delimited(raw: &str) -> Self {
        raw.split_whitespace().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).filter(|s: &String| !s.is_empty()).collect())
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_space_delimited())
    }
}

/// One token acquisition attempt
///
/// Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub scopes: ScopeSet,
    /// `None` only for a plain sign-in, where no account exists yet
    pub account: Option<AccountInfo>,
    /// Only meaningful for the interactive path
    pub redirect_uri: Option<String>,
}

impl TokenRequest {
    #[must_use]
    pub fn new(scopes: ScopeSet, account: AccountInfo) -> Self {
        Self { scopes, account: Some(account), redirect_uri: None }
    }

    /// Interactive sign-in with no extra scopes and no known account.
    #[must_use]
    pub fn sign_in(redirect_uri: impl Into<String>) -> Self {
        Self { scopes: ScopeSet::new(), account: None, redirect_uri: Some(redirect_uri.into()) }
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }
}

/// Result of a silent (non-interactive) token attempt
///
/// Interaction-required is a tag, not an error, so the engine branches on it
/// without inspecting error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SilentTokenResult {
    Token(CachedToken),
    InteractionRequired(String),
    Failure(SessionGateError),
}

/// What the request layer gets back from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessTokenOutcome {
    /// A valid access token for the requested scopes
    Token(String),
    /// The request cannot complete synchronously; the browser has to be sent
    /// to the identity provider and will come back on the callback route.
    RedirectRequired { authorization_url: String },
}

impl AccessTokenOutcome {
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        match self {
            Self::Token(token) => Some(token),
            Self::RedirectRequired { .. } => None,
        }
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::RedirectRequired { .. })
    }
}

/// Tokens and account obtained when the interactive redirect comes back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectCompletion {
    pub account: AccountInfo,
    pub token: CachedToken,
}
