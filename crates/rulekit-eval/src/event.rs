//! Mutable, path-addressable event record.
//!
//! An [`Event`] owns one `serde_json::Value` and exposes JSON-pointer style
//! access (`/a/b`). Operators mutate the event in place during evaluation;
//! the outcome convention writes booleans through [`Event::set`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single telemetry record flowing through a compiled pipeline.
///
/// Exclusively owned by the evaluation processing it; no sharing across
/// concurrent evaluations. Serializes as the bare JSON record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    inner: Value,
}

impl Event {
    /// Wrap a JSON value as an event.
    pub fn from_value(value: Value) -> Self {
        Event { inner: value }
    }

    /// Get a field by JSON pointer (e.g. `/ar_write/result`).
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.inner.pointer(pointer)
    }

    /// Set a field by JSON pointer, creating intermediate objects as needed.
    ///
    /// A segment that lands on a non-object value replaces it with an
    /// object so the remaining path can be created.
    pub fn set(&mut self, pointer: &str, value: Value) {
        let segments: Vec<&str> = pointer.split('/').skip(1).collect();
        if segments.is_empty() {
            self.inner = value;
            return;
        }

        let mut current = &mut self.inner;
        for segment in &segments[..segments.len() - 1] {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            current = match current {
                Value::Object(obj) => obj
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new())),
                _ => return,
            };
        }

        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let last = segments[segments.len() - 1];
        if let Some(obj) = current.as_object_mut() {
            obj.insert(last.to_string(), value);
        }
    }

    /// Access the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.inner
    }

    /// Consume the event, yielding the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.inner
    }
}

/// The JSON type name of a value, for diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
