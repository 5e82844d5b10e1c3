//! RedisJSON-backed session store
//!
//! Each session is one JSON document stored under its session id. Writes go
//! through `JSON.SET` at a JSON path, reads through `JSON.GET`, and every
//! successful access slides the key's TTL forward with `EXPIRE`.

use std::sync::Arc;

use async_trait::async_trait;
use redis::{Cmd, ErrorKind, FromRedisValue, RedisResult};
use serde_json::Value;
use sessiongate_core::SessionStore;
use sessiongate_domain::{JsonPath, Result, Session, SessionGateError, StoreConfig};
use tracing::{debug, error, instrument, warn};

use super::connection::StoreConnectionManager;
use crate::errors::{is_disconnect, InfraError};

/// Session store over a RedisJSON server
#[derive(Clone)]
pub struct RedisSessionStore {
    connection: Arc<StoreConnectionManager>,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Wrap an existing connection manager.
    #[must_use]
    pub fn new(connection: Arc<StoreConnectionManager>) -> Self {
        let ttl_seconds = connection.config().session_timeout_seconds;
        Self { connection, ttl_seconds }
    }

    /// Build a store with its own connection manager for `config`.
    #[must_use]
    pub fn from_config(config: StoreConfig) -> Self {
        Self::new(Arc::new(StoreConnectionManager::new(config)))
    }

    pub fn connection(&self) -> &Arc<StoreConnectionManager> {
        &self.connection
    }

    /// Run one command, marking the link down if the command lost it.
    ///
    /// The outer error is a failed dial; the inner result is the command's
    /// own reply.
    async fn query_raw<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<RedisResult<T>> {
        let mut conn = self.connection.ensure_connected().await?;
        let reply: RedisResult<T> = cmd.query_async(&mut conn).await;
        if let Err(err) = &reply {
            if is_disconnect(err) {
                self.connection.mark_disconnected();
            }
        }
        Ok(reply)
    }

    async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T> {
        self.query_raw(cmd).await?.map_err(|err| InfraError::from(err).into())
    }

    async fn refresh_ttl(&self, session_id: &str) -> Result<bool> {
        let mut cmd = redis::cmd("EXPIRE");
        cmd.arg(session_id).arg(self.ttl_seconds);
        let applied: i64 = self.query(&cmd).await?;
        Ok(applied == 1)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip(self, value), fields(path = %path))]
    async fn set_session(&self, session_id: &str, path: &JsonPath, value: &Value) -> Result<bool> {
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is empty".into()));
        }

        let payload = serde_json::to_string(value)?;
        let mut cmd = redis::cmd("JSON.SET");
        cmd.arg(session_id).arg(path.to_string()).arg(payload);

        let reply: Option<String> = match self.query_raw(&cmd).await? {
            Ok(reply) => reply,
            // A nested path on a missing key is an error reply, not nil.
            Err(err) if !path.is_root() && err.kind() == ErrorKind::ResponseError => {
                warn!(session_id = %session_id, error = %err, "Partial write on missing session rejected");
                return Ok(false);
            }
            Err(err) => {
                error!(session_id = %session_id, error = %err, "Failed to write session");
                return Err(InfraError::from(err).into());
            }
        };

        if reply.as_deref() != Some("OK") {
            warn!(session_id = %session_id, "Session write not acknowledged");
            return Ok(false);
        }

        self.refresh_ttl(session_id).await?;
        debug!(session_id = %session_id, "Session written");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is empty".into()));
        }

        let mut cmd = redis::cmd("JSON.GET");
        cmd.arg(session_id);
        let raw: Option<String> = self.query(&cmd).await?;

        let Some(raw) = raw else {
            debug!(session_id = %session_id, "Session not found");
            return Ok(None);
        };

        self.refresh_ttl(session_id).await?;

        match serde_json::from_str::<Session>(&raw) {
            Ok(mut session) => {
                if session.session_id.is_empty() {
                    session.session_id = session_id.to_string();
                }
                Ok(Some(session))
            }
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "Stored session is malformed");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn update_session_expiry(&self, session_id: Option<&str>) -> Result<()> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            debug!("No session id, expiry not refreshed");
            return Ok(());
        };

        if !self.refresh_ttl(session_id).await? {
            debug!(session_id = %session_id, "Expiry refresh on missing session");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_session(&self, session_id: &str) -> Result<bool> {
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is empty".into()));
        }

        let mut cmd = redis::cmd("DEL");
        cmd.arg(session_id);
        let removed: i64 = self.query(&cmd).await?;
        Ok(removed > 0)
    }
}
