//! Appender trait for log output destinations

use super::{error::Result, event_dict::EventDict};

/// Renders processed events and writes them somewhere
pub trait Appender: Send {
    fn append(&mut self, event: &EventDict) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
