//! JSON lines file appender

use crate::core::{Appender, EventDict, JsonRenderer, LoggerError, Renderer, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends each event as a single-line JSON object
///
/// Parent directories are created on open. Output is machine-readable regardless of
/// whether the process runs on a terminal.
pub struct FileAppender {
    path: PathBuf,
    writer: BufWriter<File>,
    renderer: JsonRenderer,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.is_dir() {
            return Err(LoggerError::file_appender(
                path.display().to_string(),
                "path is a directory",
            ));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "creating log directory",
                    parent.display().to_string(),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            renderer: JsonRenderer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Appender for FileAppender {
    fn append(&mut self, event: &EventDict) -> Result<()> {
        let line = self.renderer.render(event);
        writeln!(self.writer, "{}", line)?;
        // keep lines visible to readers of the file without waiting for drop
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
