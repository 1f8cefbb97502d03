//! Core logger types and traits

pub mod appender;
pub mod bridge;
pub mod config;
pub mod error;
pub mod event_dict;
pub mod level_resolver;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod output_format;
pub mod pipeline;
pub mod registry;
pub mod sink;
pub mod structured_builder;
pub mod timestamp;

pub use appender::Appender;
pub use bridge::LogBridge;
pub use config::{
    configure, configure_registry, configure_registry_with_console, get_logger, global_registry,
    reconcile_existing_loggers, LoggingConfig,
};
pub use error::{LoggerError, Result};
pub use event_dict::{EventDict, EVENT_KEY};
pub use level_resolver::{LevelOverrideMap, LevelResolver, LEVELS_ENV, LEVELS_FILE_ENV};
pub use log_context::{
    bind_context, clear_context, current_context, scoped_context, unbind_context, ContextGuard,
    FieldValue, LogContext,
};
pub use log_level::LogLevel;
pub use log_record::{ExceptionInfo, LogRecord};
pub use logger::Logger;
pub use output_format::{
    ColoredRenderer, JsonRenderer, OutputFormat, PlainRenderer, Renderer, STANDARD_FIELDS,
};
pub use pipeline::{Pipeline, Processor};
pub use registry::{normalize_name, LoggerRegistry};
pub use sink::Sink;
pub use structured_builder::StructuredLogBuilder;
pub use timestamp::{truncate_timestamp, TimestampFormat};
