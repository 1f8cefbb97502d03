//! Per-record field mapping threaded through the processor pipeline

use super::log_record::LogRecord;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Key under which the record message is stored
pub const EVENT_KEY: &str = "event";

/// Insertion-ordered mutable mapping built from one [`LogRecord`]
///
/// Each pipeline invocation owns its `EventDict`. The originating record travels
/// alongside the fields (never inside them) so processors can project from it.
#[derive(Debug, Clone, Default)]
pub struct EventDict {
    fields: Map<String, Value>,
    record: Option<Arc<LogRecord>>,
}

impl EventDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a record: `event` first, then the call-site context in order
    pub fn from_record(record: Arc<LogRecord>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            EVENT_KEY.to_string(),
            Value::String(record.message.clone()),
        );
        for (key, value) in record.context.fields() {
            fields.insert(key.to_string(), value.to_json_value());
        }
        Self {
            fields,
            record: Some(record),
        }
    }

    /// Originating record, if this dict was seeded from one
    pub fn record(&self) -> Option<&LogRecord> {
        self.record.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Value rendered for humans: strings bare, everything else as JSON text
    pub fn display_value(&self, key: &str) -> Option<String> {
        self.fields.get(key).map(display)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Insert only if the key is absent
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        // shift_remove keeps the remaining keys in order
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Serialize for EventDict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl FromIterator<(String, Value)> for EventDict {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
            record: None,
        }
    }
}

impl PartialEq for EventDict {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
