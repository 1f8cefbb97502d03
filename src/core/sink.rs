//! Sinks: an appender plus its own level threshold

use super::{appender::Appender, event_dict::EventDict, log_level::LogLevel};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A shared output destination
///
/// Each sink filters on its own threshold independently of logger levels, and
/// serializes writes to its appender.
pub struct Sink {
    level: RwLock<LogLevel>,
    appender: Mutex<Box<dyn Appender>>,
}

impl Sink {
    pub fn new<A: Appender + 'static>(level: LogLevel, appender: A) -> Arc<Self> {
        Self::from_boxed(level, Box::new(appender))
    }

    pub fn from_boxed(level: LogLevel, appender: Box<dyn Appender>) -> Arc<Self> {
        Arc::new(Self {
            level: RwLock::new(level),
            appender: Mutex::new(appender),
        })
    }

    pub fn level(&self) -> LogLevel {
        *self.level.read()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.level.write() = level;
    }

    pub fn accepts(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    pub fn name(&self) -> String {
        self.appender.lock().name().to_string()
    }

    /// Write one event with panic isolation
    ///
    /// Returns `false` if the appender failed or panicked; the failure is reported
    /// on stderr and never propagated to the caller.
    pub fn handle(&self, event: &EventDict) -> bool {
        let mut appender = self.appender.lock();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            appender.append(event)
        }));

        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Sink '{}' failed: {}", appender.name(), e);
                false
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Sink '{}' panicked: {}. \
                     Other sinks continue to function.",
                    appender.name(),
                    panic_msg
                );
                false
            }
        }
    }

    pub fn flush(&self) {
        let mut appender = self.appender.lock();
        if let Err(e) = appender.flush() {
            eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", appender.name(), e);
        }
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("level", &self.level())
            .field("appender", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoggerError, Result};

    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&mut self, _event: &EventDict) -> Result<()> {
            Err(LoggerError::writer("Simulated failure"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingAppender;

    impl Appender for PanickingAppender {
        fn append(&mut self, _event: &EventDict) -> Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_threshold() {
        let sink = Sink::new(LogLevel::Warning, FailingAppender);
        assert!(!sink.accepts(LogLevel::Info));
        assert!(sink.accepts(LogLevel::Warning));
        assert!(sink.accepts(LogLevel::Critical));

        sink.set_level(LogLevel::Debug);
        assert!(sink.accepts(LogLevel::Debug));
    }

    #[test]
    fn test_failure_is_isolated() {
        let sink = Sink::new(LogLevel::Debug, FailingAppender);
        assert!(!sink.handle(&EventDict::new()));
        assert_eq!(sink.name(), "failing");
    }

    #[test]
    fn test_panic_is_isolated() {
        let sink = Sink::new(LogLevel::Debug, PanickingAppender);
        assert!(!sink.handle(&EventDict::new()));
        // the sink stays usable after a panic
        assert!(!sink.handle(&EventDict::new()));
    }
}
