//! Process-wide logging setup
//!
//! [`configure`] wires the global registry: root level, a console sink, an optional
//! JSON file sink, the processor pipeline, the `log` crate bridge and per-logger
//! overrides. [`configure_registry`] does the same for a caller-owned registry.

use super::{
    bridge,
    error::Result,
    level_resolver::{LevelOverrideMap, LevelResolver},
    log_level::LogLevel,
    logger::Logger,
    pipeline::Pipeline,
    registry::LoggerRegistry,
    sink::Sink,
    timestamp::TimestampFormat,
};
use crate::appenders::{ConsoleAppender, FileAppender};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Inputs to [`configure`]
///
/// Every field has a default, so partial JSON or YAML documents deserialize.
///
/// # Example
///
/// ```
/// use structured_logger::core::{LoggingConfig, LogLevel};
///
/// let config = LoggingConfig::new()
///     .with_console_level(LogLevel::Debug)
///     .with_file("logs/app.jsonl", LogLevel::Error)
///     .with_level("sqlx", "warn");
///
/// assert_eq!(config.file_level, LogLevel::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Root level and console sink threshold
    pub console_level: LogLevel,
    /// JSON lines file; no file sink when unset
    pub file: Option<PathBuf>,
    pub file_level: LogLevel,
    /// Explicit overrides; an empty or missing map defers to the environment
    pub levels: Option<LevelOverrideMap>,
    /// Force colored (or plain) console output instead of detecting a terminal
    pub colors: Option<bool>,
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            console_level: LogLevel::Info,
            file: None,
            file_level: LogLevel::Warning,
            levels: None,
            colors: None,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_console_level(mut self, level: LogLevel) -> Self {
        self.console_level = level;
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, level: LogLevel) -> Self {
        self.file = Some(path.into());
        self.file_level = level;
        self
    }

    #[must_use]
    pub fn with_levels(mut self, levels: LevelOverrideMap) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Add a single override
    #[must_use]
    pub fn with_level(mut self, logger: impl Into<String>, level: impl AsRef<str>) -> Self {
        self.levels
            .get_or_insert_with(LevelOverrideMap::new)
            .insert(logger, level);
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = Some(colors);
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn console_appender(&self) -> ConsoleAppender {
        match self.colors {
            Some(colors) => ConsoleAppender::with_colors(colors),
            None => ConsoleAppender::new(),
        }
    }
}

fn open_file_sink(path: &Path, level: LogLevel) -> Option<Arc<Sink>> {
    match FileAppender::new(path) {
        Ok(appender) => Some(Sink::new(level, appender)),
        Err(e) if e.is_permission_denied() => {
            eprintln!(
                "[LOGGER WARNING] Permission denied creating log file {}: {}. \
                 Continuing with console logging only.",
                path.display(),
                e
            );
            None
        }
        Err(e) => {
            eprintln!(
                "[LOGGER WARNING] Failed to create log file {}: {}. \
                 Continuing with console logging only.",
                path.display(),
                e
            );
            None
        }
    }
}

/// Configure `registry` from `config`, using the console chosen by the config
pub fn configure_registry<F>(
    registry: &LoggerRegistry,
    config: &LoggingConfig,
    resolver: &LevelResolver<F>,
) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    configure_registry_with_console(registry, config, resolver, config.console_appender())
}

/// Configure `registry` with a caller-supplied console appender
///
/// Safe to call repeatedly: sinks from a previous run are detached from the root
/// before new ones are attached.
pub fn configure_registry_with_console<F>(
    registry: &LoggerRegistry,
    config: &LoggingConfig,
    resolver: &LevelResolver<F>,
    console: ConsoleAppender,
) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    config.timestamp_format.validate()?;
    let overrides = resolver.resolve(config.levels.as_ref());

    registry.set_level("", config.console_level);
    registry.clear_sinks("");

    registry.add_sink("", Sink::new(config.console_level, console));

    if let Some(path) = &config.file {
        if let Some(sink) = open_file_sink(path, config.file_level) {
            registry.add_sink("", sink);
        }
    }

    registry.set_pipeline(Pipeline::standard(config.timestamp_format.clone()));

    registry.apply_overrides(&overrides)
}

static GLOBAL_REGISTRY: OnceLock<Arc<LoggerRegistry>> = OnceLock::new();

/// The process-wide registry used by [`configure`] and [`get_logger`]
pub fn global_registry() -> &'static Arc<LoggerRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| Arc::new(LoggerRegistry::new()))
}

/// Configure process-wide logging
///
/// Overrides come from `config.levels` when non-empty, otherwise from
/// `LOGGING_LEVELS_FILE` / `LOGGING_LEVELS`. Records sent through the `log` crate are
/// routed into the same hierarchy.
pub fn configure(config: &LoggingConfig) -> Result<()> {
    let registry = global_registry();
    configure_registry(registry, config, &LevelResolver::from_env())?;
    bridge::install(Arc::clone(registry));
    Ok(())
}

/// Logger handle on the process-wide registry
pub fn get_logger(name: &str) -> Logger {
    global_registry().get_logger(name)
}

/// Re-align loggers created before [`configure`] with the configured hierarchy
pub fn reconcile_existing_loggers() {
    global_registry().reconcile();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level_resolver::LEVELS_ENV;
    use crate::core::LoggerError;
    use crate::OutputFormat;
    use tempfile::tempdir;

    fn no_env() -> LevelResolver<impl Fn(&str) -> Option<String>> {
        LevelResolver::with_lookup(|_: &str| None)
    }

    fn quiet_console() -> ConsoleAppender {
        ConsoleAppender::to_writer(std::io::sink(), OutputFormat::Plain)
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.console_level, LogLevel::Info);
        assert_eq!(config.file_level, LogLevel::Warning);
        assert!(config.file.is_none());
        assert!(config.levels.is_none());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"console_level": "DEBUG", "levels": {"httpx": "warn"}}"#)
                .unwrap();
        assert_eq!(config.console_level, LogLevel::Debug);
        assert_eq!(config.file_level, LogLevel::Warning);
        assert_eq!(
            config.levels.unwrap().get("httpx"),
            Some("WARNING")
        );
    }

    #[test]
    fn test_root_level_and_sinks() {
        let dir = tempdir().unwrap();
        let registry = LoggerRegistry::new();
        let config = LoggingConfig::new()
            .with_console_level(LogLevel::Debug)
            .with_file(dir.path().join("logs").join("app.jsonl"), LogLevel::Error);

        configure_registry_with_console(&registry, &config, &no_env(), quiet_console()).unwrap();

        assert_eq!(registry.root_level(), LogLevel::Debug);
        assert_eq!(registry.sink_count(""), 2);
        assert!(dir.path().join("logs").join("app.jsonl").exists());
    }

    #[test]
    fn test_reconfigure_replaces_root_sinks() {
        let registry = LoggerRegistry::new();
        let config = LoggingConfig::new();

        configure_registry_with_console(&registry, &config, &no_env(), quiet_console()).unwrap();
        configure_registry_with_console(&registry, &config, &no_env(), quiet_console()).unwrap();

        assert_eq!(registry.sink_count(""), 1);
    }

    #[test]
    fn test_unusable_file_falls_back_to_console() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let registry = LoggerRegistry::new();
        let config = LoggingConfig::new().with_file(blocker.join("app.jsonl"), LogLevel::Warning);

        configure_registry_with_console(&registry, &config, &no_env(), quiet_console()).unwrap();
        assert_eq!(registry.sink_count(""), 1);
    }

    #[test]
    fn test_explicit_levels_applied() {
        let registry = LoggerRegistry::new();
        let config = LoggingConfig::new().with_level("uvicorn", "warn");

        configure_registry_with_console(&registry, &config, &no_env(), quiet_console()).unwrap();
        assert_eq!(registry.level("uvicorn"), Some(LogLevel::Warning));
    }

    #[test]
    fn test_environment_levels_applied() {
        let registry = LoggerRegistry::new();
        let resolver = LevelResolver::with_lookup(|key: &str| {
            (key == LEVELS_ENV).then(|| "sqlx:\n  query: ERROR".to_string())
        });

        configure_registry_with_console(&registry, &LoggingConfig::new(), &resolver, quiet_console())
            .unwrap();
        assert_eq!(registry.level("sqlx.query"), Some(LogLevel::Error));
    }

    #[test]
    fn test_invalid_level_is_an_error() {
        let registry = LoggerRegistry::new();
        let config = LoggingConfig::new().with_level("app", "LOUD");

        let result = configure_registry_with_console(&registry, &config, &no_env(), quiet_console());
        assert!(matches!(result, Err(LoggerError::InvalidLevel { .. })));
    }

    #[test]
    fn test_timestamp_format_installed() {
        let registry = LoggerRegistry::new();
        let config = LoggingConfig::new().with_timestamp_format(TimestampFormat::UnixMillis);

        configure_registry_with_console(&registry, &config, &no_env(), quiet_console()).unwrap();
        assert_eq!(registry.pipeline().names().len(), 8);
    }

    #[test]
    fn test_invalid_custom_timestamp_is_rejected() {
        let registry = LoggerRegistry::new();
        let config = LoggingConfig::new()
            .with_console_level(LogLevel::Debug)
            .with_timestamp_format(TimestampFormat::Custom("%Q".to_string()));

        let result = configure_registry_with_console(&registry, &config, &no_env(), quiet_console());
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
        assert_eq!(registry.root_level(), LogLevel::Warning);
        assert_eq!(registry.sink_count(""), 0);
    }
}
