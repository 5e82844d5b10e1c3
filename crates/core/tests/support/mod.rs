//! Shared test helpers for `sessiongate-core` integration tests.
//!
//! Lightweight fakes for the core ports so tests can focus on behaviour
//! instead of boilerplate.

#![allow(dead_code)]

pub mod identity;
pub mod repositories;

use sessiongate_domain::{AccountInfo, CachedToken, ScopeSet};

pub fn scopes(items: &[&str]) -> ScopeSet {
    items.iter().copied().collect()
}

pub fn account(subject: &str) -> AccountInfo {
    AccountInfo::new(subject)
}

pub fn token(items: &[&str], access_token: &str) -> CachedToken {
    CachedToken::new(scopes(items), access_token, 3600)
}
