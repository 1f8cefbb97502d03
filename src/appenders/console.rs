//! Console appender implementation

use crate::core::{Appender, EventDict, LoggerError, OutputFormat, Renderer, Result};
use std::io::{IsTerminal, Write};

enum Target {
    Stdout,
    Writer(Box<dyn Write + Send>),
}

/// Writes rendered lines to stdout, or to any writer
///
/// The default renderer is colored when stdout is an interactive terminal and
/// plain text otherwise.
pub struct ConsoleAppender {
    renderer: Box<dyn Renderer>,
    target: Target,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::with_colors(std::io::stdout().is_terminal())
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self::with_output_format(OutputFormat::for_console(use_colors))
    }

    /// Write to stdout with an explicit output format
    ///
    /// # Example
    ///
    /// ```
    /// use structured_logger::appenders::ConsoleAppender;
    /// use structured_logger::OutputFormat;
    ///
    /// let appender = ConsoleAppender::with_output_format(OutputFormat::Json);
    /// ```
    pub fn with_output_format(format: OutputFormat) -> Self {
        Self {
            renderer: format.renderer(),
            target: Target::Stdout,
        }
    }

    /// Write to an arbitrary stream instead of stdout
    pub fn to_writer<W>(writer: W, format: OutputFormat) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            renderer: format.renderer(),
            target: Target::Writer(Box::new(writer)),
        }
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }
}

fn write_line(writer: &mut dyn Write, line: &str) -> Result<()> {
    writeln!(writer, "{}", line)
        .map_err(|e| LoggerError::writer(format!("console write failed: {}", e)))
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, event: &EventDict) -> Result<()> {
        let output = self.renderer.render(event);
        match &mut self.target {
            Target::Stdout => write_line(&mut std::io::stdout().lock(), &output),
            Target::Writer(writer) => write_line(writer.as_mut(), &output),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match &mut self.target {
            Target::Stdout => std::io::stdout().flush()?,
            Target::Writer(writer) => writer.flush()?,
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
