//! Processor pipeline
//!
//! Every record is turned into an [`EventDict`] and passed through an ordered list of
//! processors before a renderer turns it into text. The standard order is:
//!
//! 1. [`MergeContext`] - ambient thread-local context
//! 2. [`AddLoggerName`] - `logger`
//! 3. [`AddLogLevel`] - `level`
//! 4. [`AddCallerInfo`] - `filename`, `lineno`, `function`, `thread`
//! 5. [`TimeStamper`] - `timestamp`
//! 6. [`PositionalArgumentsFormatter`] - printf-style args merged into `event`
//! 7. [`StackInfoRenderer`] - `stack`
//! 8. [`ExceptionFormatter`] - `exception`
//!
//! Processors are pure: they only touch the event they are given and never do I/O.

use super::event_dict::{EventDict, EVENT_KEY};
use super::log_context::{with_current_context, FieldValue};
use super::log_level::normalize_level_name;
use super::log_record::LogRecord;
use super::output_format::Renderer;
use super::timestamp::TimestampFormat;
use std::sync::Arc;

/// One transformation stage
pub trait Processor: Send + Sync {
    fn process(&self, logger: &str, method: &str, event: EventDict) -> EventDict;
    fn name(&self) -> &str;
}

/// Merges the thread's ambient context; call-site fields win
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeContext;

impl Processor for MergeContext {
    fn process(&self, _logger: &str, _method: &str, mut event: EventDict) -> EventDict {
        with_current_context(|ctx| {
            for (key, value) in ctx.fields() {
                event.set_default(key, value.to_json_value());
            }
        });
        event
    }

    fn name(&self) -> &str {
        "merge_context"
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AddLoggerName;

impl Processor for AddLoggerName {
    fn process(&self, logger: &str, _method: &str, mut event: EventDict) -> EventDict {
        event.insert("logger", logger);
        event
    }

    fn name(&self) -> &str {
        "add_logger_name"
    }
}

/// Upper-cases the method name; `warn` becomes `WARNING`, `exception` becomes `ERROR`
#[derive(Debug, Default, Clone, Copy)]
pub struct AddLogLevel;

impl Processor for AddLogLevel {
    fn process(&self, _logger: &str, method: &str, mut event: EventDict) -> EventDict {
        let level = if method.eq_ignore_ascii_case("exception") {
            "ERROR".to_string()
        } else {
            normalize_level_name(method)
        };
        event.insert("level", level);
        event
    }

    fn name(&self) -> &str {
        "add_log_level"
    }
}

/// Copies caller info the record collected at emission time
///
/// Never walks the stack itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct AddCallerInfo;

impl Processor for AddCallerInfo {
    fn process(&self, _logger: &str, _method: &str, mut event: EventDict) -> EventDict {
        let caller = event.record().map(|record| {
            (
                record.filename().map(str::to_string),
                record.line,
                record.function.clone(),
                record.thread().to_string(),
            )
        });

        if let Some((filename, lineno, function, thread)) = caller {
            event.insert("filename", filename);
            event.insert("lineno", lineno);
            event.insert("function", function);
            event.insert("thread", thread);
        }
        event
    }

    fn name(&self) -> &str {
        "add_caller_info"
    }
}

/// Stamps `timestamp` from the record's creation time
#[derive(Debug, Default, Clone)]
pub struct TimeStamper {
    format: TimestampFormat,
}

impl TimeStamper {
    pub fn new(format: TimestampFormat) -> Self {
        Self { format }
    }
}

impl Processor for TimeStamper {
    fn process(&self, _logger: &str, _method: &str, mut event: EventDict) -> EventDict {
        let created = match event.record() {
            Some(record) => record.created,
            None => chrono::Local::now(),
        };
        event.insert("timestamp", self.format.format_value(&created));
        event
    }

    fn name(&self) -> &str {
        "timestamper"
    }
}

/// Replaces `%s`-style placeholders in `event` with the record's positional args
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionalArgumentsFormatter;

impl Processor for PositionalArgumentsFormatter {
    fn process(&self, _logger: &str, _method: &str, mut event: EventDict) -> EventDict {
        let formatted = match event.record() {
            Some(record) if !record.args.is_empty() => event
                .get_str(EVENT_KEY)
                .map(|template| format_positional(template, &record.args)),
            _ => None,
        };
        if let Some(formatted) = formatted {
            event.insert(EVENT_KEY, formatted);
        }
        event
    }

    fn name(&self) -> &str {
        "positional_arguments"
    }
}

/// printf-style substitution for `%s %d %i %f %r` and `%%`
///
/// Missing arguments leave the placeholder untouched; surplus arguments are ignored.
pub fn format_positional(template: &str, args: &[FieldValue]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(spec @ ('s' | 'd' | 'i' | 'f' | 'r')) => {
                chars.next();
                match args.next() {
                    Some(arg) => push_arg(&mut out, spec, arg),
                    None => {
                        out.push('%');
                        out.push(spec);
                    }
                }
            }
            _ => out.push('%'),
        }
    }
    out
}

fn push_arg(out: &mut String, spec: char, arg: &FieldValue) {
    use std::fmt::Write;

    let _ = match (spec, arg) {
        ('r', FieldValue::String(s)) => write!(out, "'{}'", s),
        ('d' | 'i', FieldValue::Float(f)) if f.is_finite() => write!(out, "{}", f.trunc() as i64),
        ('f', FieldValue::Int(i)) => write!(out, "{:.6}", *i as f64),
        ('f', FieldValue::UInt(u)) => write!(out, "{:.6}", *u as f64),
        ('f', FieldValue::Float(f)) => write!(out, "{:.6}", f),
        (_, other) => write!(out, "{}", other),
    };
}

/// Attaches stack text when the caller asked for it
#[derive(Debug, Default, Clone, Copy)]
pub struct StackInfoRenderer;

impl Processor for StackInfoRenderer {
    fn process(&self, _logger: &str, _method: &str, mut event: EventDict) -> EventDict {
        let stack = event.record().and_then(|r| r.stack_info.clone());
        if let Some(stack) = stack {
            event.insert("stack", stack);
        }
        event
    }

    fn name(&self) -> &str {
        "stack_info"
    }
}

/// Renders an attached error and its cause chain to text
#[derive(Debug, Default, Clone, Copy)]
pub struct ExceptionFormatter;

impl Processor for ExceptionFormatter {
    fn process(&self, _logger: &str, _method: &str, mut event: EventDict) -> EventDict {
        let exception = event
            .record()
            .and_then(|r| r.exception.as_ref())
            .map(|exc| exc.to_string());
        if let Some(exception) = exception {
            event.insert("exception", exception);
        }
        event
    }

    fn name(&self) -> &str {
        "format_exception"
    }
}

/// Ordered list of processors shared by every sink
pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
}

impl Pipeline {
    /// Build a pipeline from custom processors, run in the given order
    pub fn new(processors: Vec<Box<dyn Processor>>) -> Self {
        Self { processors }
    }

    /// The standard eight-stage pipeline
    pub fn standard(timestamp_format: TimestampFormat) -> Self {
        Self::new(vec![
            Box::new(MergeContext),
            Box::new(AddLoggerName),
            Box::new(AddLogLevel),
            Box::new(AddCallerInfo),
            Box::new(TimeStamper::new(timestamp_format)),
            Box::new(PositionalArgumentsFormatter),
            Box::new(StackInfoRenderer),
            Box::new(ExceptionFormatter),
        ])
    }

    /// Processor names in execution order
    pub fn names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Seed an event from `record` and run every processor over it
    pub fn run(&self, record: Arc<LogRecord>) -> EventDict {
        let logger = record.name.clone();
        let method = record.method.clone();
        self.processors
            .iter()
            .fold(EventDict::from_record(record), |event, processor| {
                processor.process(&logger, &method, event)
            })
    }

    /// Run the pipeline and hand the result to `renderer`
    pub fn render(&self, record: Arc<LogRecord>, renderer: &dyn Renderer) -> String {
        renderer.render(&self.run(record))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard(TimestampFormat::default())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("processors", &self.names())
            .finish()
    }
}
