//! # Structured Logger
//!
//! Structured logging with hierarchical per-logger levels.
//!
//! ## Features
//!
//! - **Per-logger levels**: dotted logger names inherit the nearest explicit ancestor level
//! - **Overrides from the environment**: `LOGGING_LEVELS_FILE` (JSON/YAML file) or
//!   `LOGGING_LEVELS` (inline JSON/YAML), flat or nested
//! - **Processor pipeline**: context, logger name, level, caller, timestamp, positional
//!   arguments, stack and exception stages shared by every sink
//! - **Renderers**: plain text, ANSI-colored text for terminals, JSON lines for files
//! - **`log` facade bridge**: records from libraries using `log` share the same output
//!
//! ## Quick start
//!
//! ```no_run
//! use structured_logger::{configure, get_logger, info, LoggingConfig, LogLevel};
//!
//! configure(
//!     &LoggingConfig::new()
//!         .with_file("logs/app.jsonl", LogLevel::Warning)
//!         .with_level("uvicorn.access", "warn"),
//! )?;
//!
//! let logger = get_logger("app.http");
//! info!(logger, "Listening on {}", 8080; tls = false);
//! # Ok::<(), structured_logger::LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender};
    pub use crate::core::{
        bind_context, clear_context, configure, get_logger, reconcile_existing_loggers,
        scoped_context, unbind_context, Appender, ContextGuard, FieldValue, LevelOverrideMap,
        LogContext, LogLevel, Logger, LoggerError, LoggerRegistry, LoggingConfig, OutputFormat,
        Result, StructuredLogBuilder, TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, FileAppender};
pub use crate::core::{
    bind_context, clear_context, configure, configure_registry, current_context, get_logger,
    global_registry, reconcile_existing_loggers, scoped_context, unbind_context, Appender,
    ContextGuard, EventDict, FieldValue, LevelOverrideMap, LevelResolver, LogContext, LogLevel,
    LogRecord, Logger, LoggerError, LoggerRegistry, LoggingConfig, OutputFormat, Pipeline,
    Processor, Renderer, Result, Sink, StructuredLogBuilder, TimestampFormat,
};
