//! Domain types and models

pub mod json_path;
pub mod session;
pub mod token;

pub use json_path::JsonPath;
pub use session::{AccountInfo, CachedToken, Session, UserProfile};
pub use token::{AccessTokenOutcome, RedirectCompletion, ScopeSet, SilentTokenResult, TokenRequest};
