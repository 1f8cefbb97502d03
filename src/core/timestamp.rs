//! Timestamp formatting utilities
//!
//! The pipeline stamps every event from the record's creation time. The default is
//! local time with microsecond precision; text renderers cut it back to
//! milliseconds with [`truncate_timestamp`].

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Length of `YYYY-MM-DD HH:MM:SS.mmm`
pub const TEXT_TIMESTAMP_LEN: usize = 23;

/// Timestamp format options for the timestamp stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Local time with microseconds: `2025-01-08 10:30:45.123456`
    #[default]
    LocalMicros,

    /// UTC ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 with the local offset: `2025-01-08T10:30:45.123456+01:00`
    Rfc3339,

    /// Unix timestamp in milliseconds, emitted as a JSON number
    UnixMillis,

    /// Custom strftime format, evaluated in local time
    ///
    /// # Examples
    ///
    /// ```
    /// use structured_logger::core::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Reject custom formats chrono cannot render
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(format_str) = self {
            if StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "timestamp_format",
                    format!("invalid strftime format '{}'", format_str),
                ));
            }
        }
        Ok(())
    }

    /// Format a local `DateTime` according to this format
    ///
    /// A custom format chrono cannot render falls back to [`TimestampFormat::LocalMicros`].
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::LocalMicros => datetime.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
            TimestampFormat::Iso8601Micros => datetime
                .with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%S%.6fZ")
                .to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(chrono::SecondsFormat::Micros, false),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    Err(_) => TimestampFormat::LocalMicros.format(datetime),
                }
            }
        }
    }

    /// Format as a JSON value: numbers for numeric formats, strings otherwise
    #[must_use]
    pub fn format_value(&self, datetime: &DateTime<Local>) -> serde_json::Value {
        match self {
            TimestampFormat::UnixMillis => {
                serde_json::Value::Number(datetime.timestamp_millis().into())
            }
            _ => serde_json::Value::String(self.format(datetime)),
        }
    }
}

/// Cut a timestamp to at most [`TEXT_TIMESTAMP_LEN`] characters
pub fn truncate_timestamp(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(TEXT_TIMESTAMP_LEN) {
        Some((idx, _)) => &timestamp[..idx],
        None => timestamp,
    }
}
