//! Flat key/value field sets.
//!
//! A [`FieldSet`] is the string map that is signed, form-encoded or written as
//! XML. Keys are kept in ascending byte order, which is the order the
//! canonicalizer needs. Empty values are treated as absent and never stored.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{Result, WxPayError};

/// Ordered mapping of field name to non-empty string value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet(BTreeMap<String, String>);

impl FieldSet {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a typed parameter struct into string fields.
    ///
    /// Strings are taken verbatim, numbers and booleans use their JSON text,
    /// nested objects and arrays are stored as compact JSON. `null` and empty
    /// strings are dropped.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let mut fields = Self::new();
        match serde_json::to_value(value)? {
            Value::Object(map) => {
                for (key, value) in map {
                    if let Some(text) = scalar_text(value)? {
                        fields.insert(key, text);
                    }
                }
                Ok(fields)
            }
            Value::Null => Ok(fields),
            other => Err(WxPayError::Serialization(format!(
                "parameters must serialize to an object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Insert a field, replacing any previous value.
    ///
    /// Empty values remove the key instead.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns true when the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encode as `application/x-www-form-urlencoded` text.
    pub fn to_form_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl From<BTreeMap<String, String>> for FieldSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

fn scalar_text(value: Value) -> Result<Option<String>> {
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested @ (Value::Array(_) | Value::Object(_)) => Some(serde_json::to_string(&nested)?),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
