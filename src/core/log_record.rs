//! Log record structure
//!
//! A `LogRecord` is captured once at the call site. Everything the pipeline later
//! needs (caller location, thread, timestamp, stack) is collected here so that no
//! processor ever has to inspect the call stack again.

use super::log_context::{FieldValue, LogContext};
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::cell::RefCell;
use std::fmt;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Rendered view of an error attached to a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    /// `source()` chain, outermost cause first
    pub causes: Vec<String>,
}

impl ExceptionInfo {
    /// Capture an error and its source chain
    pub fn capture<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self {
            type_name: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
            causes,
        }
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)?;
        if !self.causes.is_empty() {
            write!(f, "\n\nCaused by:")?;
            for (idx, cause) in self.causes.iter().enumerate() {
                write!(f, "\n    {}: {}", idx, cause)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Dotted logger name
    pub name: String,
    pub level: LogLevel,
    /// Emission method used at the call site (`"warn"`, `"info"`, ...)
    pub method: String,
    pub message: String,
    /// printf-style positional arguments for `message`
    pub args: Vec<FieldValue>,
    pub context: LogContext,
    pub created: DateTime<Local>,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub function: Option<String>,
    pub thread_id: String,
    pub thread_name: Option<String>,
    pub exception: Option<ExceptionInfo>,
    pub stack_info: Option<String>,
}

impl LogRecord {
    pub fn new(name: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level,
            method: level.method_name().to_string(),
            message: message.into(),
            args: Vec::new(),
            context: LogContext::new(),
            created: Local::now(),
            file: None,
            line: None,
            function: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            exception: None,
            stack_info: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_location(mut self, file: &str, line: u32, function: Option<&str>) -> Self {
        self.file = Some(file.to_string());
        self.line = Some(line);
        self.function = function.map(str::to_string);
        self
    }

    pub fn with_args(mut self, args: Vec<FieldValue>) -> Self {
        self.args = args;
        self
    }

    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Capture the current stack; only done when the caller asks for it
    pub fn with_stack_info(mut self) -> Self {
        self.stack_info = Some(std::backtrace::Backtrace::force_capture().to_string());
        self
    }

    /// Base name of the source file, if known
    pub fn filename(&self) -> Option<&str> {
        self.file
            .as_deref()
            .map(|path| path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path))
    }

    /// Thread name, falling back to the thread id for unnamed threads
    pub fn thread(&self) -> &str {
        self.thread_name.as_deref().unwrap_or(&self.thread_id)
    }
}
