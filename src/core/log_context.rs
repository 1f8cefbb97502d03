//! Structured logging context for key-value fields
//!
//! This module provides:
//! - `LogContext`: ordered per-record structured fields
//! - thread-local ambient context (`bind_context`, `scoped_context`, ...) merged into
//!   every record emitted from the binding thread
//! - `ContextGuard`: RAII guard for scoped ambient fields

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Convert to serde_json::Value for JSON serialization
    ///
    /// Non-finite floats have no JSON representation and are stringified.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::UInt(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(f.to_string())),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<u64> for FieldValue {
    fn from(u: u64) -> Self {
        FieldValue::UInt(u)
    }
}

impl From<u32> for FieldValue {
    fn from(u: u32) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<usize> for FieldValue {
    fn from(u: usize) -> Self {
        FieldValue::UInt(u as u64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Ordered key-value fields attached to a log record
///
/// Insertion order is kept so renderers print fields the way they were given.
/// Re-adding a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogContext {
    fields: Vec<(String, FieldValue)>,
}

impl LogContext {
    /// Create a new empty log context
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to the context
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.add_field(key, value);
        self
    }

    /// Add a field to the context (mutable version)
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate over fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check if context has any fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Fields as space-separated `key=value` pairs
impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for LogContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = LogContext::new();
        for (k, v) in iter {
            ctx.add_field(k, v);
        }
        ctx
    }
}

thread_local! {
    static AMBIENT_CONTEXT: RefCell<LogContext> = RefCell::new(LogContext::new());
}

/// Bind a field into the current thread's ambient context
///
/// Every record emitted from this thread carries the field until it is unbound.
pub fn bind_context<K, V>(key: K, value: V)
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    AMBIENT_CONTEXT.with(|ctx| ctx.borrow_mut().add_field(key, value));
}

/// Remove a field from the current thread's ambient context
pub fn unbind_context(key: &str) {
    AMBIENT_CONTEXT.with(|ctx| {
        ctx.borrow_mut().remove(key);
    });
}

/// Remove all ambient fields bound on the current thread
pub fn clear_context() {
    AMBIENT_CONTEXT.with(|ctx| *ctx.borrow_mut() = LogContext::new());
}

/// Snapshot of the current thread's ambient context
pub fn current_context() -> LogContext {
    AMBIENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Run `f` against the current thread's ambient context without cloning it
pub(crate) fn with_current_context<R>(f: impl FnOnce(&LogContext) -> R) -> R {
    AMBIENT_CONTEXT.with(|ctx| f(&ctx.borrow()))
}

/// Bind an ambient field for the lifetime of the returned guard
///
/// # Example
///
/// ```
/// use structured_logger::core::log_context::{current_context, scoped_context};
///
/// {
///     let _guard = scoped_context("request_id", "abc-123");
///     assert!(current_context().contains_key("request_id"));
/// }
/// assert!(!current_context().contains_key("request_id"));
/// ```
pub fn scoped_context<K, V>(key: K, value: V) -> ContextGuard
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    let key = key.into();
    let previous = AMBIENT_CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        let previous = ctx.get(&key).cloned();
        ctx.add_field(key.clone(), value);
        previous
    });
    ContextGuard {
        key,
        previous,
        _not_send: PhantomData,
    }
}

/// RAII guard for scoped context fields
///
/// When dropped, restores the field's previous value (or removes it). The guard is
/// tied to the thread that created it.
pub struct ContextGuard {
    key: String,
    previous: Option<FieldValue>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        AMBIENT_CONTEXT.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            match previous {
                Some(value) => ctx.add_field(self.key.clone(), value),
                None => {
                    ctx.remove(&self.key);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_creation() {
        let ctx = LogContext::new();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_log_context_keeps_insertion_order() {
        let ctx = LogContext::new()
            .with_field("zeta", 1)
            .with_field("alpha", "two")
            .with_field("mid", true);

        let keys: Vec<&str> = ctx.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(ctx.to_string(), "zeta=1 alpha=two mid=true");
    }

    #[test]
    fn test_log_context_replace_in_place() {
        let ctx = LogContext::new()
            .with_field("a", 1)
            .with_field("b", 2)
            .with_field("a", 3);

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.to_string(), "a=3 b=2");
    }

    #[test]
    fn test_non_finite_float_is_stringified() {
        let value = FieldValue::Float(f64::NAN).to_json_value();
        assert_eq!(value, serde_json::Value::String("NaN".to_string()));

        let value = FieldValue::Float(1.5).to_json_value();
        assert_eq!(value, serde_json::json!(1.5));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some("x")), FieldValue::from("x"));
    }

    #[test]
    fn test_ambient_bind_and_unbind() {
        clear_context();
        bind_context("request_id", "abc");
        bind_context("user", 7);
        assert_eq!(current_context().len(), 2);

        unbind_context("request_id");
        let ctx = current_context();
        assert!(!ctx.contains_key("request_id"));
        assert!(ctx.contains_key("user"));

        clear_context();
        assert!(current_context().is_empty());
    }

    #[test]
    fn test_scoped_context_restores_previous_value() {
        clear_context();
        bind_context("tenant", "outer");
        {
            let _guard = scoped_context("tenant", "inner");
            assert_eq!(current_context().get("tenant"), Some(&FieldValue::from("inner")));
        }
        assert_eq!(current_context().get("tenant"), Some(&FieldValue::from("outer")));
        clear_context();
    }

    #[test]
    fn test_ambient_context_is_per_thread() {
        clear_context();
        bind_context("main_only", true);

        let seen = std::thread::spawn(|| current_context().contains_key("main_only"))
            .join()
            .unwrap();
        assert!(!seen);
        clear_context();
    }
}
