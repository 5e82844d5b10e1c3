//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SESSION_TIMEOUT_SECONDS, DEFAULT_STORE_USERNAME};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Public origin of the web application (`https://app.example.com`)
    pub public_origin: String,
    /// Origin of the backend API the application calls on the user's behalf
    pub backend_origin: String,
    pub identity: IdentityConfig,
    pub store: StoreConfig,
}

/// Identity provider registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub client_id: String,
    /// Authority base URL, e.g. `https://login.microsoftonline.com/{tenant}`
    pub authority: String,
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    /// Prefix for backend API scopes (`api://{app-id}`)
    pub api_scope: String,
}

/// Session store connection settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Logical database index
    #[serde(default)]
    pub database: u32,
    #[serde(default = "default_session_timeout")]
    pub session_timeout_seconds: u64,
}

fn default_username() -> String {
    DEFAULT_STORE_USERNAME.to_string()
}

fn default_session_timeout() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECONDS
}

impl StoreConfig {
    #[must_use]
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_seconds)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            username: default_username(),
            password: String::new(),
            database: 0,
            session_timeout_seconds: DEFAULT_SESSION_TIMEOUT_SECONDS,
        }
    }
}

// Hand-written so the password never reaches a log line through `{:?}`.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("session_timeout_seconds", &self.session_timeout_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_store_config_defaults_from_partial_document() {
        let store: StoreConfig =
            serde_json::from_value(json!({ "host": "cache.internal", "port": 6380 })).unwrap();
        assert_eq!(store.username, "default");
        assert_eq!(store.database, 0);
        assert_eq!(store.session_timeout(), Duration::from_secs(1_814_400));
    }

    #[test]
    fn test_secrets_are_not_serialized_or_debug_printed() {
        let store = StoreConfig { password: "hunter2".to_string(), ..StoreConfig::default() };
        let value = serde_json::to_value(&store).unwrap();
        assert!(value.get("password").is_none());
        assert!(!format!("{store:?}").contains("hunter2"));

        let identity = IdentityConfig {
            client_id: "client".to_string(),
            authority: "https://login.example.com/tenant".to_string(),
            client_secret: Some("s3cret".to_string()),
            api_scope: "api://backend".to_string(),
        };
        let value = serde_json::to_value(&identity).unwrap();
        assert!(value.get("client_secret").is_none());
    }
}
