//! Identity provider adapters

pub mod oauth_provider;

pub use oauth_provider::OAuthIdentityProvider;
