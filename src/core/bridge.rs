//! Adapter from the `log` crate facade
//!
//! Libraries that log through `log::info!` and friends end up in the same hierarchy,
//! pipeline and sinks as records emitted through [`Logger`](super::logger::Logger).
//! The record target (usually a module path) becomes the logger name.

use super::{log_level::LogLevel, log_record::LogRecord, registry::LoggerRegistry};
use std::sync::Arc;

pub struct LogBridge {
    registry: Arc<LoggerRegistry>,
}

impl LogBridge {
    pub fn new(registry: Arc<LoggerRegistry>) -> Self {
        Self { registry }
    }

    fn to_record(&self, record: &log::Record<'_>) -> LogRecord {
        let name = self.registry.ensure_logger(record.target());
        let mut converted =
            LogRecord::new(name, LogLevel::from(record.level()), record.args().to_string());
        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            converted = converted.with_location(file, line, record.module_path());
        }
        converted
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.registry
            .is_enabled_for(metadata.target(), LogLevel::from(metadata.level()))
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            self.registry.dispatch(self.to_record(record));
        }
    }

    fn flush(&self) {
        self.registry.flush();
    }
}

/// Install a bridge to `registry` as the global `log` backend
///
/// Returns `false` if another backend was already installed; the first one wins.
pub fn install(registry: Arc<LoggerRegistry>) -> bool {
    let installed = log::set_boxed_logger(Box::new(LogBridge::new(registry))).is_ok();
    if installed {
        log::set_max_level(log::LevelFilter::Trace);
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Appender, EventDict, Result, Sink};
    use log::Log;
    use parking_lot::Mutex;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<EventDict>>>);

    impl Appender for Captured {
        fn append(&mut self, event: &EventDict) -> Result<()> {
            self.0.lock().push(event.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    fn bridge() -> (LogBridge, Arc<LoggerRegistry>, Captured) {
        let registry = Arc::new(LoggerRegistry::new());
        let captured = Captured::default();
        registry.set_level("", LogLevel::Info);
        registry.add_sink("", Sink::new(LogLevel::Debug, captured.clone()));
        (LogBridge::new(Arc::clone(&registry)), registry, captured)
    }

    #[test]
    fn test_foreign_record_goes_through_pipeline() {
        let (bridge, registry, captured) = bridge();

        bridge.log(
            &log::Record::builder()
                .args(format_args!("pool ready size={}", 8))
                .level(log::Level::Warn)
                .target("sqlx::pool")
                .file(Some("src/pool/inner.rs"))
                .line(Some(120))
                .module_path(Some("sqlx::pool::inner"))
                .build(),
        );

        let events = captured.0.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get_str("event"), Some("pool ready size=8"));
        assert_eq!(events[0].get_str("logger"), Some("sqlx.pool"));
        assert_eq!(events[0].get_str("level"), Some("WARNING"));
        assert_eq!(events[0].get_str("filename"), Some("inner.rs"));
        assert!(registry.contains("sqlx.pool"));
    }

    #[test]
    fn test_levels_apply_to_foreign_targets() {
        let (bridge, registry, captured) = bridge();
        registry.set_level("hyper", LogLevel::Error);

        let warn = log::Metadata::builder()
            .level(log::Level::Warn)
            .target("hyper::proto")
            .build();
        assert!(!bridge.enabled(&warn));

        let trace = log::Metadata::builder()
            .level(log::Level::Trace)
            .target("app")
            .build();
        assert!(!bridge.enabled(&trace));

        bridge.log(
            &log::Record::builder()
                .args(format_args!("dropped"))
                .level(log::Level::Warn)
                .target("hyper::proto")
                .build(),
        );
        assert!(captured.0.lock().is_empty());
    }
}
