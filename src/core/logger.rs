//! Logger handles
//!
//! A [`Logger`] is a cheap, clonable handle naming one node of a
//! [`LoggerRegistry`](super::registry::LoggerRegistry). Records are built at the call
//! site, including the caller location, and handed to the registry for dispatch.

use super::{
    log_context::{FieldValue, LogContext},
    log_level::LogLevel,
    log_record::{ExceptionInfo, LogRecord},
    registry::LoggerRegistry,
};
use std::panic::Location;
use std::sync::Arc;

#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    registry: Arc<LoggerRegistry>,
    bound: LogContext,
}

impl Logger {
    pub(crate) fn new(name: String, registry: Arc<LoggerRegistry>) -> Self {
        Self {
            name: name.into(),
            registry,
            bound: LogContext::new(),
        }
    }

    /// Dotted logger name; empty for the root
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<LoggerRegistry> {
        &self.registry
    }

    /// New handle that adds `key=value` to every record it emits
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use structured_logger::core::LoggerRegistry;
    ///
    /// let registry = Arc::new(LoggerRegistry::new());
    /// let request_log = registry.get_logger("app.http").bind("request_id", "r-42");
    /// assert_eq!(request_log.bound_context().len(), 1);
    /// ```
    #[must_use]
    pub fn bind<K, V>(&self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let mut bound = self.clone();
        bound.bound.add_field(key, value);
        bound
    }

    pub fn bound_context(&self) -> &LogContext {
        &self.bound
    }

    /// Set the explicit level of this logger only
    pub fn set_level(&self, level: LogLevel) {
        self.registry.set_level(&self.name, level);
    }

    pub fn effective_level(&self) -> LogLevel {
        self.registry.effective_level(&self.name)
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        self.registry.is_enabled_for(&self.name, level)
    }

    /// Bound fields first, then call-site fields; call-site values win
    fn merged(&self, context: LogContext) -> LogContext {
        if self.bound.is_empty() {
            return context;
        }
        let mut merged = self.bound.clone();
        for (key, value) in context.fields() {
            merged.add_field(key, value.clone());
        }
        merged
    }

    pub(crate) fn record(
        &self,
        level: LogLevel,
        method: &str,
        message: String,
        context: LogContext,
    ) -> LogRecord {
        LogRecord::new(self.name.as_ref(), level, message)
            .with_method(method)
            .with_context(self.merged(context))
    }

    pub(crate) fn emit(&self, record: LogRecord) {
        self.registry.dispatch(record);
    }

    #[track_caller]
    fn emit_at(&self, level: LogLevel, method: &str, message: String, context: LogContext) {
        if !self.is_enabled_for(level) {
            return;
        }
        let caller = Location::caller();
        let record = self
            .record(level, method, message, context)
            .with_location(caller.file(), caller.line(), None);
        self.emit(record);
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit_at(level, level.method_name(), message.into(), LogContext::new());
    }

    #[track_caller]
    pub fn log_with_context(&self, level: LogLevel, message: impl Into<String>, context: LogContext) {
        self.emit_at(level, level.method_name(), message.into(), context);
    }

    /// Emit with printf-style positional arguments (`%s`, `%d`, ...)
    #[track_caller]
    pub fn log_args(&self, level: LogLevel, template: impl Into<String>, args: Vec<FieldValue>) {
        if !self.is_enabled_for(level) {
            return;
        }
        let caller = Location::caller();
        let record = self
            .record(level, level.method_name(), template.into(), LogContext::new())
            .with_args(args)
            .with_location(caller.file(), caller.line(), None);
        self.emit(record);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.emit_at(LogLevel::Debug, "debug", message.into(), LogContext::new());
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.emit_at(LogLevel::Info, "info", message.into(), LogContext::new());
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>) {
        self.emit_at(LogLevel::Warning, "warning", message.into(), LogContext::new());
    }

    /// Alias of [`Logger::warning`]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.emit_at(LogLevel::Warning, "warn", message.into(), LogContext::new());
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.emit_at(LogLevel::Error, "error", message.into(), LogContext::new());
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>) {
        self.emit_at(LogLevel::Critical, "critical", message.into(), LogContext::new());
    }

    #[track_caller]
    pub fn debug_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit_at(LogLevel::Debug, "debug", message.into(), context);
    }

    #[track_caller]
    pub fn info_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit_at(LogLevel::Info, "info", message.into(), context);
    }

    #[track_caller]
    pub fn warning_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit_at(LogLevel::Warning, "warning", message.into(), context);
    }

    #[track_caller]
    pub fn warn_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit_at(LogLevel::Warning, "warn", message.into(), context);
    }

    #[track_caller]
    pub fn error_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit_at(LogLevel::Error, "error", message.into(), context);
    }

    #[track_caller]
    pub fn critical_with_context(&self, message: impl Into<String>, context: LogContext) {
        self.emit_at(LogLevel::Critical, "critical", message.into(), context);
    }

    /// Log at ERROR with `error` and its source chain rendered under `exception`
    #[track_caller]
    pub fn exception<E>(&self, message: impl Into<String>, error: &E)
    where
        E: std::error::Error + ?Sized,
    {
        if !self.is_enabled_for(LogLevel::Error) {
            return;
        }
        let caller = Location::caller();
        let record = self
            .record(LogLevel::Error, "exception", message.into(), LogContext::new())
            .with_exception(ExceptionInfo::capture(error))
            .with_location(caller.file(), caller.line(), None);
        self.emit(record);
    }

    /// Flush every sink of the owning registry
    pub fn flush(&self) {
        self.registry.flush();
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("bound", &self.bound)
            .finish()
    }
}
