//! Path addressing inside a session document
//!
//! Only the subset of JSONPath the session store needs: the root `$` and
//! dotted member access such as `$.cachedTokens` or `$.userProfile.id`.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::constants::ROOT_PATH;
use crate::errors::SessionGateError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<String>,
}

impl JsonPath {
    /// The document root (whole-document replace)
    #[must_use]
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// Parse a `$` or `$.a.b` path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when the path does not start at the root
    /// or contains an empty member name.
    pub fn parse(raw: &str) -> Result<Self, SessionGateError> {
        let raw = raw.trim();
        if raw == ROOT_PATH {
            return Ok(Self::root());
        }

        let rest = raw.strip_prefix("$.").ok_or_else(|| {
            SessionGateError::InvalidArgument(format!("JSON path must start at the root: {raw}"))
        })?;

        let segments: Vec<String> = rest.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(SessionGateError::InvalidArgument(format!("empty member in JSON path: {raw}")));
        }

        Ok(Self { segments })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Write `value` at this path into `document`.
    ///
    /// Mirrors RedisJSON `JSON.SET` semantics: writing the root always
    /// succeeds, writing a nested path requires an existing document and an
    /// existing parent object. Returns `None` when the write is not applied.
    #[must_use]
    pub fn apply(&self, document: Option<Value>, value: Value) -> Option<Value> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Some(value);
        };

        let mut document = document?;
        let mut cursor = &mut document;
        for segment in parents {
            cursor = cursor.as_object_mut()?.get_mut(segment)?;
        }
        let parent: &mut Map<String, Value> = cursor.as_object_mut()?;
        parent.insert(last.clone(), value);

        Some(document)
    }
}

impl Default for JsonPath {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for JsonPath {
    type Err = SessionGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT_PATH)?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert!(JsonPath::parse("$").unwrap().is_root());
        let path = JsonPath::parse("$.userProfile.id").unwrap();
        assert_eq!(path.segments(), ["userProfile", "id"]);
        assert_eq!(path.to_string(), "$.userProfile.id");
        assert_eq!(JsonPath::default().to_string(), "$");
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        for raw in ["", "cachedTokens", "$.", "$..a", "$.a."] {
            assert!(
                matches!(JsonPath::parse(raw), Err(SessionGateError::InvalidArgument(_))),
                "expected {raw:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_apply_root_replaces_document() {
        let out = JsonPath::root().apply(Some(json!({"old": true})), json!({"new": 1}));
        assert_eq!(out, Some(json!({"new": 1})));
        assert_eq!(JsonPath::root().apply(None, json!({})), Some(json!({})));
    }

    #[test]
    fn test_apply_nested_requires_parent() {
        let path = JsonPath::parse("$.cachedTokens").unwrap();
        assert_eq!(path.apply(None, json!([])), None);

        let out = path.apply(Some(json!({"account": {"sub": "u1"}})), json!([1])).unwrap();
        assert_eq!(out, json!({"account": {"sub": "u1"}, "cachedTokens": [1]}));

        let deep = JsonPath::parse("$.userProfile.id").unwrap();
        assert_eq!(deep.apply(Some(json!({"account": {}})), json!("p")), None);
        assert_eq!(
            deep.apply(Some(json!({"userProfile": {}})), json!("p")),
            Some(json!({"userProfile": {"id": "p"}}))
        );
    }
}
