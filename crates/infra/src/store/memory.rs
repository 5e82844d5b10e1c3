//! In-memory session storage.
//!
//! Suitable for development, tests and single-instance deployments. Honours
//! the same sliding TTL as the RedisJSON store; expiry is measured on the
//! tokio clock so tests can pause and advance time.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sessiongate_core::SessionStore;
use sessiongate_domain::{JsonPath, Result, Session, SessionGateError};
use tokio::time::Instant;
use tracing::{debug, warn};

struct Entry {
    document: Value,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory session storage.
///
/// Expired entries are evicted lazily when touched.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.sessions
            .read()
            .map(|guard| guard.values().filter(|entry| entry.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remaining lifetime of a session, `None` if absent or expired.
    pub fn ttl_remaining(&self, session_id: &str) -> Option<Duration> {
        let now = Instant::now();
        let guard = self.sessions.read().ok()?;
        guard
            .get(session_id)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Raw stored document, without touching its TTL.
    pub fn document(&self, session_id: &str) -> Option<Value> {
        let now = Instant::now();
        let guard = self.sessions.read().ok()?;
        guard.get(session_id).filter(|entry| entry.is_live(now)).map(|entry| entry.document.clone())
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        self.sessions.write().map_err(|_| SessionGateError::Internal("Lock poisoned".to_owned()))
    }

    /// Slide the TTL of a live entry; evict it if it already expired.
    fn touch(sessions: &mut HashMap<String, Entry>, session_id: &str, ttl: Duration) -> bool {
        let now = Instant::now();
        match sessions.get_mut(session_id) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = now + ttl;
                true
            }
            Some(_) => {
                sessions.remove(session_id);
                false
            }
            None => false,
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(sessiongate_domain::constants::DEFAULT_SESSION_TIMEOUT_SECONDS))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set_session(&self, session_id: &str, path: &JsonPath, value: &Value) -> Result<bool> {
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is empty".into()));
        }

        let mut sessions = self.write_guard()?;
        let now = Instant::now();
        let current =
            sessions.get(session_id).filter(|entry| entry.is_live(now)).map(|entry| entry.document.clone());

        match path.apply(current, value.clone()) {
            Some(document) => {
                sessions.insert(session_id.to_string(), Entry { document, expires_at: now + self.ttl });
                debug!(session_id = %session_id, path = %path, "Session written");
                Ok(true)
            }
            None => {
                warn!(session_id = %session_id, path = %path, "Session write not applied");
                Ok(false)
            }
        }
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is empty".into()));
        }

        let mut sessions = self.write_guard()?;
        if !Self::touch(&mut sessions, session_id, self.ttl) {
            return Ok(None);
        }
        let Some(entry) = sessions.get(session_id) else {
            return Ok(None);
        };

        match serde_json::from_value::<Session>(entry.document.clone()) {
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

    async fn update_session_expiry(&self, session_id: Option<&str>) -> Result<()> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            debug!("No session id, expiry not refreshed");
            return Ok(());
        };

        let mut sessions = self.write_guard()?;
        if !Self::touch(&mut sessions, session_id, self.ttl) {
            debug!(session_id = %session_id, "Expiry refresh on missing session");
        }
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool> {
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is empty".into()));
        }

        let now = Instant::now();
        let removed = self.write_guard()?.remove(session_id);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }
}
