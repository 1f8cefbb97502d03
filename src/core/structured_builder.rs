//! Structured log builder for fluent record construction
//!
//! Provides a builder pattern for creating records with structured fields,
//! positional arguments, an attached error or a captured stack.

use super::log_context::{FieldValue, LogContext};
use super::log_level::LogLevel;
use super::log_record::ExceptionInfo;
use super::logger::Logger;
use std::panic::Location;

/// Builder for structured log records
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use structured_logger::core::LoggerRegistry;
///
/// let registry = Arc::new(LoggerRegistry::new());
/// let logger = registry.get_logger("app.http");
///
/// logger.info_builder()
///     .message("Request processed")
///     .field("user_id", 12345)
///     .field("latency_ms", 42.5)
///     .field("status", 200)
///     .log();
/// ```
pub struct StructuredLogBuilder<'a> {
    logger: &'a Logger,
    level: LogLevel,
    method: &'static str,
    message: String,
    args: Vec<FieldValue>,
    context: LogContext,
    exception: Option<ExceptionInfo>,
    stack_info: bool,
    location: Option<(&'static str, u32, &'static str)>,
}

impl<'a> StructuredLogBuilder<'a> {
    pub fn new(logger: &'a Logger, level: LogLevel) -> Self {
        Self::with_method(logger, level, level.method_name())
    }

    fn with_method(logger: &'a Logger, level: LogLevel, method: &'static str) -> Self {
        Self {
            logger,
            level,
            method,
            message: String::new(),
            args: Vec::new(),
            context: LogContext::new(),
            exception: None,
            stack_info: false,
            location: None,
        }
    }

    #[must_use]
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    #[must_use]
    pub fn field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.context.add_field(key, value);
        self
    }

    /// Add every field of `context`; later values replace earlier ones
    #[must_use]
    pub fn fields(mut self, context: LogContext) -> Self {
        for (key, value) in context.fields() {
            self.context.add_field(key, value.clone());
        }
        self
    }

    /// Positional argument for a `%s`/`%d` placeholder in the message
    #[must_use]
    pub fn arg(mut self, value: impl Into<FieldValue>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Attach an error; it is rendered with its source chain under `exception`
    #[must_use]
    pub fn error<E>(mut self, error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        self.exception = Some(ExceptionInfo::capture(error));
        self
    }

    /// Capture the current stack under `stack`
    #[must_use]
    pub fn stack_info(mut self) -> Self {
        self.stack_info = true;
        self
    }

    /// Set source location explicitly (used by the logging macros)
    #[must_use]
    pub fn location(mut self, file: &'static str, line: u32, module_path: &'static str) -> Self {
        self.location = Some((file, line, module_path));
        self
    }

    /// Build and dispatch the record
    #[track_caller]
    pub fn log(self) {
        if !self.logger.is_enabled_for(self.level) {
            return;
        }

        let (file, line, function) = match self.location {
            Some((file, line, module_path)) => (file, line, Some(module_path)),
            None => {
                let caller = Location::caller();
                (caller.file(), caller.line(), None)
            }
        };

        let mut record = self
            .logger
            .record(self.level, self.method, self.message, self.context)
            .with_args(self.args)
            .with_location(file, line, function);
        if let Some(exception) = self.exception {
            record = record.with_exception(exception);
        }
        if self.stack_info {
            record = record.with_stack_info();
        }
        self.logger.emit(record);
    }
}

impl Logger {
    pub fn builder(&self, level: LogLevel) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, level)
    }

    pub fn debug_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Debug)
    }

    pub fn info_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Info)
    }

    pub fn warning_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Warning)
    }

    pub fn error_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Error)
    }

    pub fn critical_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::new(self, LogLevel::Critical)
    }

    /// ERROR-level builder whose records are tagged as exceptions
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use structured_logger::core::LoggerRegistry;
    ///
    /// let registry = Arc::new(LoggerRegistry::new());
    /// let logger = registry.get_logger("app.db");
    /// let err = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
    ///
    /// logger.exception_builder()
    ///     .message("Query failed")
    ///     .field("table", "users")
    ///     .error(&err)
    ///     .log();
    /// ```
    pub fn exception_builder(&self) -> StructuredLogBuilder<'_> {
        StructuredLogBuilder::with_method(self, LogLevel::Error, "exception")
    }
}
