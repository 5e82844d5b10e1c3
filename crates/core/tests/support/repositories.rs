//! Mock session store for testing
//!
//! Keeps documents in memory and records every operation, including expiry
//! refreshes, so tests can assert on the store traffic a service produced.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use sessiongate_core::SessionStore;
use sessiongate_domain::{JsonPath, Result as DomainResult, Session, SessionGateError};

/// One call observed by [`RecordingSessionStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Set { session_id: String, path: String },
    Get(String),
    Expire(String),
    Delete(String),
}

#[derive(Default)]
struct Inner {
    documents: HashMap<String, Value>,
    ops: Vec<StoreOp>,
    unavailable: bool,
}

/// In-memory `SessionStore` that records its traffic.
#[derive(Clone, Default)]
pub struct RecordingSessionStore {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, bypassing the recorded operations.
    pub fn with_document(self, session_id: &str, document: Value) -> Self {
        self.inner.lock().unwrap().documents.insert(session_id.to_string(), document);
        self
    }

    /// Make every subsequent call fail with `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().unavailable = unavailable;
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.inner.lock().unwrap().ops.clone()
    }

    pub fn document(&self, session_id: &str) -> Option<Value> {
        self.inner.lock().unwrap().documents.get(session_id).cloned()
    }

    fn check(inner: &Inner, session_id: &str) -> DomainResult<()> {
        if inner.unavailable {
            return Err(SessionGateError::StoreUnavailable("store offline".to_string()));
        }
        if session_id.is_empty() {
            return Err(SessionGateError::InvalidArgument("session id is required".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for RecordingSessionStore {
    async fn set_session(&self, session_id: &str, path: &JsonPath, value: &Value) -> DomainResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&inner, session_id)?;
        inner.ops.push(StoreOp::Set { session_id: session_id.to_string(), path: path.to_string() });

        let current = inner.documents.get(session_id).cloned();
        match path.apply(current, value.clone()) {
            Some(document) => {
                inner.documents.insert(session_id.to_string(), document);
                inner.ops.push(StoreOp::Expire(session_id.to_string()));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_session(&self, session_id: &str) -> DomainResult<Option<Session>> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&inner, session_id)?;
        inner.ops.push(StoreOp::Get(session_id.to_string()));

        let Some(document) = inner.documents.get(session_id).cloned() else {
            return Ok(None);
        };
        inner.ops.push(StoreOp::Expire(session_id.to_string()));
        Ok(serde_json::from_value(document).ok())
    }

    async fn update_session_expiry(&self, session_id: Option<&str>) -> DomainResult<()> {
        let Some(session_id) = session_id.filter(|id| !id.is_empty()) else {
            return Ok(());
        };
        let mut inner = self.inner.lock().unwrap();
        Self::check(&inner, session_id)?;
        inner.ops.push(StoreOp::Expire(session_id.to_string()));
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> DomainResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        Self::check(&inner, session_id)?;
        inner.ops.push(StoreOp::Delete(session_id.to_string()));
        Ok(inner.documents.remove(session_id).is_some())
    }
}
