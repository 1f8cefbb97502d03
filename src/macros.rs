//! Logging macros for ergonomic log message formatting.
//!
//! The message takes `format!` arguments. Structured fields follow a `;` as
//! `key = value` pairs. The call site's file, line and module path are recorded.
//!
//! # Examples
//!
//! ```
//! use structured_logger::{get_logger, info, warning};
//!
//! let logger = get_logger("app.server");
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! warning!(logger, "Slow request"; path = "/search", elapsed_ms = 1250);
//! ```

/// Log at an explicit level.
///
/// # Examples
///
/// ```
/// use structured_logger::{get_logger, log, LogLevel};
///
/// let logger = get_logger("app");
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500; retryable = false);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $fmt:literal $(, $arg:expr)* ; $($key:ident = $value:expr),+ $(,)?) => {
        $logger
            .builder($level)
            .message(format!($fmt $(, $arg)*))
            $(.field(stringify!($key), $value))+
            .location(file!(), line!(), module_path!())
            .log()
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger
            .builder($level)
            .message(format!($($arg)+))
            .location(file!(), line!(), module_path!())
            .log()
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Alias of [`warning!`].
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
///
/// # Examples
///
/// ```
/// use structured_logger::{critical, get_logger};
///
/// let logger = get_logger("app.db");
/// critical!(logger, "Database unreachable after {} attempts", 5; host = "db-1");
/// ```
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
