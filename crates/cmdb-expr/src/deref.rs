//! Reference link dereferencing
//!
//! Reference fields of a record look like
//! `{"link": "https://.../api/now/table/cmn_location/123", "value": "123"}`.
//! Following a hop fetches the link once per pass; the parsed record, or the
//! reason it could not be fetched, is kept in a [`ReferenceCache`] keyed on
//! the exact link text.

use std::collections::HashMap;

use serde_json::Value;

/// Parsed link targets fetched during one pass.
///
/// Failed links are remembered too: a link is fetched at most once per pass.
#[derive(Debug, Default)]
pub struct ReferenceCache {
    entries: HashMap<String, Value>,
    failures: HashMap<String, String>,
    fetches: usize,
}

impl ReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<&Value> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Why `url` could not be fetched earlier in the pass
    pub fn failure(&self, url: &str) -> Option<&str> {
        self.failures.get(url).map(String::as_str)
    }

    pub(crate) fn insert(&mut self, url: String, record: Value) {
        self.entries.insert(url, record);
    }

    pub(crate) fn insert_failure(&mut self, url: String, message: String) {
        self.failures.insert(url, message);
    }

    pub(crate) fn record_fetch(&mut self) {
        self.fetches += 1;
    }

    /// Number of remote fetches issued through this cache
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Number of links fetched successfully
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

/// Text of a leaf value.
///
/// Strings are returned as-is, numbers and booleans as their JSON text, and
/// a reference field as its `value`. Anything else has no text.
pub fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get("value").and_then(render),
        Value::Null | Value::Array(_) => None,
    }
}

/// URL held by a reference field
pub fn link_of(value: &Value) -> Option<&str> {
    value.get("link").and_then(Value::as_str).filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_leaves() {
        assert_eq!(render(&json!("x")), Some("x".to_string()));
        assert_eq!(render(&json!(42)), Some("42".to_string()));
        assert_eq!(render(&json!(true)), Some("true".to_string()));
        assert_eq!(
            render(&json!({"link": "https://x/1", "value": "1"})),
            Some("1".to_string())
        );
        assert_eq!(render(&json!({"link": "https://x/1"})), None);
        assert_eq!(render(&json!(null)), None);
    }

    #[test]
    fn link_must_be_a_non_empty_string() {
        assert_eq!(link_of(&json!({"link": "https://x/1"})), Some("https://x/1"));
        assert_eq!(link_of(&json!({"link": ""})), None);
        assert_eq!(link_of(&json!("plain")), None);
    }
}
