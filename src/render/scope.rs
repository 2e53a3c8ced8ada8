//! Substitution scopes.
//!
//! A scope is an ordered list of key → text bindings. It knows nothing
//! about configuration schemas; loaders convert their mappings into a
//! scope right before rendering.

use serde_json::{Map, Value};

/// Ordered key → text bindings used by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    entries: Vec<(String, String)>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Builds a scope from a JSON-shaped mapping, keeping key order.
    ///
    /// `null` values are skipped.
    #[must_use]
    pub fn from_map(map: &Map<String, Value>) -> Self {
        map.iter()
            .filter_map(|(key, value)| value_text(value).map(|text| (key.clone(), text)))
            .collect()
    }

    /// Appends a binding, replacing the text of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Looks up the text bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of bindings.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no bindings.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Scope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = Self::new();
        for (key, value) in iter {
            scope.insert(key, value);
        }
        scope
    }
}

/// Text form of a configuration value.
///
/// Strings are used verbatim, numbers as spelled in the source file,
/// booleans as `true`/`false`, and lists or mappings as compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_map_keeps_order_and_skips_null() {
        let value = json!({
            "zeta": "last-alpha",
            "alpha": 3,
            "gone": null,
            "flag": true,
            "ports": [80, 443],
        });
        let map = value.as_object().expect("object");

        let scope = Scope::from_map(map);
        let keys: Vec<_> = scope.iter().map(|(k, _)| k).collect();

        assert_eq!(keys, vec!["zeta", "alpha", "flag", "ports"]);
        assert_eq!(scope.get("alpha"), Some("3"));
        assert_eq!(scope.get("flag"), Some("true"));
        assert_eq!(scope.get("ports"), Some("[80,443]"));
        assert_eq!(scope.get("gone"), None);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut scope: Scope = [("a", "1"), ("b", "2")].into_iter().collect();
        scope.insert("a", "9");

        let pairs: Vec<_> = scope.iter().collect();
        assert_eq!(pairs, vec![("a", "9"), ("b", "2")]);
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn test_value_text_float() {
        assert_eq!(value_text(&json!(1.5)), Some(String::from("1.5")));
    }

    #[test]
    fn test_numbers_keep_source_spelling() {
        let value: Value =
            serde_json::from_str(r#"{"tag": 1.10, "big": 1e3, "id": 12345678901234567890123}"#)
                .expect("valid json");
        let scope = Scope::from_map(value.as_object().expect("object"));

        assert_eq!(scope.get("tag"), Some("1.10"));
        assert_eq!(scope.get("big"), Some("1e3"));
        assert_eq!(scope.get("id"), Some("12345678901234567890123"));
    }
}
