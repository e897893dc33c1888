//! Settings blobs passed between the host, the filter and its output.

use serde_json::{Map, Value};

/// A JSON object of user settings.
///
/// The filter never interprets most keys; it hands the whole blob to the
/// output pipeline it creates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a settings blob. Anything other than a JSON object is rejected.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        match serde_json::from_str(json)? {
            Value::Object(values) => Ok(Self { values }),
            other => anyhow::bail!("settings must be a JSON object, got {other}"),
        }
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.values.clone()).to_string()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.values.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
