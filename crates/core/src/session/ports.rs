//! Port interfaces for session persistence
//!
//! These traits define the boundary between the token core and the
//! key-value store holding session documents.

use async_trait::async_trait;
use serde_json::Value;
use sessiongate_domain::{JsonPath, Result, Session};

/// TTL-bounded document store for session records
///
/// One JSON document per session id, stored under a key equal to the id.
/// Every successful read or write slides the key's expiry forward by the
/// configured session timeout. Concurrent writers to the same id race;
/// the last write wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Write `value` at `path` inside the document for `session_id`.
    ///
    /// Returns `Ok(true)` when the store acknowledged the write (the expiry
    /// is then refreshed), `Ok(false)` when the store answered without
    /// applying it (e.g. a nested path under a missing document). The expiry
    /// is left untouched in that case.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty id, `StoreUnavailable` when the store
    /// cannot be reached.
    async fn set_session(&self, session_id: &str, path: &JsonPath, value: &Value) -> Result<bool>;

    /// Load a session; `Ok(None)` when no (readable) document exists.
    ///
    /// A document that cannot be decoded into a [`Session`] is logged and
    /// reported as absent.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty id, `StoreUnavailable` when the store
    /// cannot be reached.
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>>;

    /// Reset the expiry of a session without touching its content.
    ///
    /// A missing id is logged and ignored.
    ///
    /// # Errors
    /// `StoreUnavailable` when the store cannot be reached.
    async fn update_session_expiry(&self, session_id: Option<&str>) -> Result<()>;

    /// Remove a session. Returns whether a document was deleted.
    ///
    /// # Errors
    /// `InvalidArgument` for an empty id, `StoreUnavailable` when the store
    /// cannot be reached.
    async fn delete_session(&self, session_id: &str) -> Result<bool>;
}
