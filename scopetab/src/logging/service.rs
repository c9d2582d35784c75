//! Logging service and its sinks

use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::Arc;

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Line format written by [`ConsoleLogger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    Text,
    /// One JSON object per line
    Json,
}

/// Writes events to the terminal; errors go to stderr
pub struct ConsoleLogger {
    format: ConsoleFormat,
}

impl ConsoleLogger {
    pub fn new(format: ConsoleFormat) -> Self {
        Self { format }
    }

    fn render(&self, event: &LogEvent) -> String {
        match self.format {
            ConsoleFormat::Text => event.format(),
            ConsoleFormat::Json => event.format_json().unwrap_or_else(|_| event.format()),
        }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.render(event);
        match event.level {
            LogLevel::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// Level filter in front of an optional sink.
///
/// Without a sink events are still filtered and then dropped; the global
/// collector records them independently.
pub struct LoggingService {
    sink: Option<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(sink: Option<Arc<dyn Logger>>, min_level: LogLevel) -> Self {
        Self { sink, min_level }
    }

    /// Sink chosen from the installed logging preferences; JSON wins over text
    pub fn with_config() -> Self {
        let format = if config::use_structured_logging() {
            Some(ConsoleFormat::Json)
        } else if config::use_console_logging() {
            Some(ConsoleFormat::Text)
        } else {
            None
        };

        let sink = format.map(|f| Arc::new(ConsoleLogger::new(f)) as Arc<dyn Logger>);
        Self::new(sink, config::get_min_log_level())
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if !self.should_log(event.level) {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.log(&event);
        }
    }
}
