use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Full study document as returned by the detail endpoint.
///
/// No schema is enforced. Reads go through [`Nav`], so a missing or
/// wrong-typed step anywhere on a path yields an absent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailDocument(Value);

impl DetailDocument {
    /// Wraps a JSON tree. Anything other than an object is rejected, since
    /// every path the extractor reads starts at a top-level key.
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(Error::InvalidArgument(format!(
                "detail document must be a JSON object, got {}",
                kind(&value)
            )))
        }
    }

    pub fn nav(&self) -> Nav<'_> {
        Nav(Some(&self.0))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

}

/// Safe navigation over an optional JSON node.
#[derive(Debug, Clone, Copy)]
pub struct Nav<'a>(Option<&'a Value>);

impl<'a> Nav<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(Some(value))
    }

    pub fn get(self, key: &str) -> Nav<'a> {
        Nav(self.0.and_then(|v| v.get(key)))
    }

    pub fn path(self, keys: &[&str]) -> Nav<'a> {
        keys.iter().fold(self, |nav, key| nav.get(key))
    }

    pub fn str(self) -> Option<&'a str> {
        self.0.and_then(Value::as_str)
    }

    pub fn string(self) -> Option<String> {
        self.str().map(str::to_string)
    }

    pub fn f64(self) -> Option<f64> {
        self.0.and_then(Value::as_f64)
    }

    pub fn bool(self) -> Option<bool> {
        self.0.and_then(Value::as_bool)
    }

    /// Elements of an array node; empty for anything else.
    pub fn items(self) -> impl Iterator<Item = Nav<'a>> {
        self.0
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|v| Nav(Some(v)))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_objects() {
        assert!(DetailDocument::from_value(json!([1, 2])).is_err());
        assert!(DetailDocument::from_value(json!("text")).is_err());
        assert!(DetailDocument::from_value(json!(null)).is_err());
        assert!(DetailDocument::from_value(json!({})).is_ok());
    }

    #[test]
    fn test_missing_intermediate_is_absent() {
        let doc = DetailDocument::from_value(json!({ "a": { "b": 1 } })).unwrap();
        assert_eq!(doc.nav().path(&["a", "b"]).f64(), Some(1.0));
        assert_eq!(doc.nav().path(&["a", "x", "y", "z"]).f64(), None);
        assert_eq!(doc.nav().path(&["missing", "b"]).str(), None);
    }

    #[test]
    fn test_wrong_type_is_absent() {
        let doc = DetailDocument::from_value(json!({ "a": "text", "n": null })).unwrap();
        assert_eq!(doc.nav().get("a").f64(), None);
        assert_eq!(doc.nav().get("a").get("b").str(), None);
        assert_eq!(doc.nav().get("a").items().count(), 0);
        assert_eq!(doc.nav().get("n").str(), None);
    }

    #[test]
    fn test_items_preserve_order() {
        let value = json!({ "xs": ["one", 2, "three"] });
        let names: Vec<_> = Nav::new(&value).get("xs").items().filter_map(Nav::str).collect();
        assert_eq!(names, vec!["one", "three"]);
    }
}
