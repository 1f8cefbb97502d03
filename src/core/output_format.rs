//! Output formats and renderers
//!
//! Renderers are the terminal stage of the pipeline:
//! - Plain: `TIMESTAMP [LEVEL   ] [THREAD] [LOGGER:LINE] MESSAGE key=value...`
//! - Colored: the plain layout wrapped in ANSI colors, for interactive terminals
//! - Json: the whole event as one JSON object per line

use super::event_dict::{display, EventDict, EVENT_KEY};
use super::log_level::LogLevel;
use super::timestamp::truncate_timestamp;
use colored::Color;
use serde::{Deserialize, Serialize};

/// Keys the text renderers print in fixed positions (or not at all)
pub const STANDARD_FIELDS: [&str; 10] = [
    "timestamp",
    "level",
    "thread",
    "logger",
    "lineno",
    EVENT_KEY,
    "exception",
    "filename",
    "function",
    "_record",
];

/// Turns a processed event into a line of output
pub trait Renderer: Send + Sync {
    fn render(&self, event: &EventDict) -> String;
    fn name(&self) -> &str;
}

/// Output format for a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Plain text (default)
    ///
    /// Example: `2025-01-08 10:30:45.123 [INFO    ] [main] [app.http:42] Request processed status=200`
    #[default]
    Plain,

    /// Plain text layout with ANSI colors
    Colored,

    /// One JSON object per line
    ///
    /// Example: `{"event":"Request processed","status":200,"logger":"app.http","level":"INFO",...}`
    Json,
}

impl OutputFormat {
    /// Colored for interactive terminals, plain otherwise
    pub fn for_console(is_terminal: bool) -> Self {
        if is_terminal {
            OutputFormat::Colored
        } else {
            OutputFormat::Plain
        }
    }

    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Plain => Box::new(PlainRenderer),
            OutputFormat::Colored => Box::new(ColoredRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

/// Field content shared by the plain and colored layouts
struct TextLine<'a> {
    timestamp: String,
    level: String,
    thread: String,
    logger: String,
    lineno: String,
    event: String,
    extras: Vec<(&'a str, String)>,
    exception: Option<String>,
}

impl<'a> TextLine<'a> {
    fn from_event(event: &'a EventDict) -> Self {
        let text = |key: &str| event.display_value(key).unwrap_or_default();
        let timestamp = text("timestamp");

        Self {
            timestamp: truncate_timestamp(&timestamp).to_string(),
            level: event
                .display_value("level")
                .unwrap_or_else(|| "INFO".to_string()),
            thread: event
                .display_value("thread")
                .unwrap_or_else(|| "main".to_string()),
            logger: text("logger"),
            lineno: match event.get("lineno") {
                Some(serde_json::Value::Null) | None => String::new(),
                Some(value) => display(value),
            },
            event: text(EVENT_KEY),
            extras: event
                .iter()
                .filter(|(key, _)| !STANDARD_FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.as_str(), display(value)))
                .collect(),
            exception: event
                .display_value("exception")
                .filter(|exc| !exc.is_empty()),
        }
    }
}

/// Plain-text renderer for pipes and files
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render(&self, event: &EventDict) -> String {
        let line = TextLine::from_event(event);

        let mut out = format!(
            "{} [{:<8}] [{}] [{}:{}] {}",
            line.timestamp, line.level, line.thread, line.logger, line.lineno, line.event
        );
        for (key, value) in &line.extras {
            out.push_str(&format!(" {}={}", key, value));
        }
        if let Some(exception) = line.exception {
            out.push('\n');
            out.push_str(&exception);
        }
        out
    }

    fn name(&self) -> &str {
        "plain"
    }
}

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";

fn fg(color: Color) -> String {
    format!("\x1b[{}m", color.to_fg_str())
}

fn level_style(level: &str) -> String {
    match level.parse::<LogLevel>() {
        Ok(LogLevel::Critical) => format!("{}{}", fg(LogLevel::Critical.color_code()), BOLD),
        Ok(level) => fg(level.color_code()),
        Err(_) => RESET.to_string(),
    }
}

/// ANSI-colored renderer for interactive terminals
///
/// Strips down to exactly the [`PlainRenderer`] output once escape codes are removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColoredRenderer;

impl Renderer for ColoredRenderer {
    fn render(&self, event: &EventDict) -> String {
        let line = TextLine::from_event(event);

        let mut out = format!(
            "{DIM}{}{RESET} [{}{:<8}{RESET}] [{}{}{RESET}] [{}{}{RESET}:{}{}{RESET}] {}{}{RESET}",
            line.timestamp,
            level_style(&line.level),
            line.level,
            fg(Color::Blue),
            line.thread,
            fg(Color::BrightMagenta),
            line.logger,
            fg(Color::BrightBlack),
            line.lineno,
            fg(Color::BrightWhite),
            line.event,
        );
        let key_color = fg(Color::Cyan);
        let value_color = fg(Color::Yellow);
        for (key, value) in &line.extras {
            out.push_str(&format!(
                " {}{}{RESET}={}{}{RESET}",
                key_color, key, value_color, value
            ));
        }
        if let Some(exception) = line.exception {
            out.push('\n');
            out.push_str(&exception);
        }
        out
    }

    fn name(&self) -> &str {
        "colored"
    }
}

/// JSON renderer: the full event, one object per line
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, event: &EventDict) -> String {
        serde_json::to_string(event).unwrap_or_else(|e| {
            serde_json::json!({
                "event": event.display_value(EVENT_KEY).unwrap_or_default(),
                "render_error": e.to_string(),
            })
            .to_string()
        })
    }

    fn name(&self) -> &str {
        "json"
    }
}
