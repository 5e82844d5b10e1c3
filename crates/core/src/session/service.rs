//! Session service - typed access to the session store

use std::sync::Arc;

use serde::Serialize;
use sessiongate_domain::{JsonPath, Result, Session};
use tracing::{debug, error, warn};

use super::ports::SessionStore;

/// Session service
///
/// Thin layer over a [`SessionStore`] that serializes typed values and lets
/// callers choose between strict and degraded write handling.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Serialize `data` and write it at `path` for `session_id`.
    ///
    /// See [`SessionStore::set_session`] for the meaning of the result.
    pub async fn set_session<T>(&self, session_id: &str, path: &JsonPath, data: &T) -> Result<bool>
    where
        T: Serialize + ?Sized + Sync,
    {
        let value = serde_json::to_value(data)?;
        self.store.set_session(session_id, path, &value).await
    }

    /// Replace the whole document for `session.session_id`.
    pub async fn save(&self, session: &Session) -> Result<bool> {
        self.set_session(&session.session_id, &JsonPath::root(), session).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session = self.store.get_session(session_id).await?;
        // Documents written by other components may omit the id.
        Ok(session.map(|mut session| {
            if session.session_id.is_empty() {
                session.session_id = session_id.to_string();
            }
            session
        }))
    }

    pub async fn update_session_expiry(&self, session_id: Option<&str>) -> Result<()> {
        self.store.update_session_expiry(session_id).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<bool> {
        self.store.delete_session(session_id).await
    }

    /// Write for callers that accept a degraded session instead of failing
    /// the request: any failure is logged and reported as `false`.
    pub async fn persist_degraded<T>(&self, session_id: &str, path: &JsonPath, data: &T) -> bool
    where
        T: Serialize + ?Sized + Sync,
    {
        match self.set_session(session_id, path, data).await {
            Ok(true) => {
                debug!(session_id = %session_id, path = %path, "Session write acknowledged");
                true
            }
            Ok(false) => {
                warn!(session_id = %session_id, path = %path, "Session write not acknowledged by store");
                false
            }
            Err(err) => {
                error!(
                    session_id = %session_id,
                    path = %path,
                    error = %err,
                    error_label = err.label(),
                    "Failed to persist session"
                );
                false
            }
        }
    }
}
