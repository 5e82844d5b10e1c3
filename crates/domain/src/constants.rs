//! Domain constants

/// Default sliding session lifetime: three weeks.
pub const DEFAULT_SESSION_TIMEOUT_SECONDS: u64 = 60 * 60 * 24 * 21;

/// Username used by managed Redis deployments when none is configured.
pub const DEFAULT_STORE_USERNAME: &str = "default";

/// Callback route the identity provider redirects back to.
pub const OAUTH_CALLBACK_PATH: &str = "/oauth/callback";

/// Root path of a session document.
pub const ROOT_PATH: &str = "$";

/// Path of the cached token list inside a session document.
pub const CACHED_TOKENS_PATH: &str = "$.cachedTokens";

/// Tokens expiring within this many seconds are treated as expired.
pub const DEFAULT_REFRESH_THRESHOLD_SECONDS: i64 = 300;

/// Build the interactive redirect target for a public origin.
#[must_use]
pub fn callback_uri(origin: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), OAUTH_CALLBACK_PATH)
}
