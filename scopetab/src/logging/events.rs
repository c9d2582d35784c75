//! Log events

use super::codes::{self, Code};
use crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
use crate::utils::Span;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Lower is more severe; a service passes events at or below its level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

/// Cuts `message` to the compiled length limit on a char boundary
fn clip(message: &str) -> String {
    if message.len() <= MAX_LOG_MESSAGE_LENGTH {
        return message.to_string();
    }
    let mut cut = MAX_LOG_MESSAGE_LENGTH;
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    message[..cut].to_string()
}

impl LogEvent {
    pub fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: clip(message),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    /// Info-level event carrying an `I0xx` code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    /// `[LEVEL] CODE - message at line:column`
    pub fn format(&self) -> String {
        let mut line = format!(
            "[{}] {} - {}",
            self.level.as_str(),
            self.code,
            self.message
        );
        if let Some(span) = &self.span {
            line.push_str(&format!(" at {}:{}", span.start().line, span.start().column));
        }
        line
    }

    /// One-line JSON object for `--json-logs`
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "category": self.category(),
            "severity": codes::get_severity(self.code.as_str()).as_str(),
            "message": self.message,
        });

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "line": span.start().line,
                "column": span.start().column,
                "end_line": span.end().line,
                "end_column": span.end().column,
            });
        }
        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::table::DUPLICATE_NAME, "Duplicate name 'x'");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E090");
        assert_eq!(event.category(), "SymbolTable");
    }

    #[test]
    fn test_event_formatting_includes_span() {
        let event = LogEvent::error(codes::analysis::UNDECLARED_IDENTIFIER, "Undeclared 'q'")
            .with_span(Span::identifier(7, 3, 1));
        let formatted = event.format();

        assert!(formatted.starts_with("[ERROR] E110 - Undeclared 'q'"));
        assert!(formatted.ends_with("at 7:3"));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::warning_with_code(
            codes::analysis::SHADOWED_DECLARATION,
            "'x' hides an outer declaration",
        )
        .with_context("outer_level", "0");

        let json = event.format_json().unwrap();
        assert!(json.contains("\"level\":\"WARN\""));
        assert!(json.contains("\"code\":\"W110\""));
        assert!(json.contains("\"outer_level\":\"0\""));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let long = "é".repeat(MAX_LOG_MESSAGE_LENGTH);
        let event = LogEvent::debug(&long);
        assert!(event.message.len() <= MAX_LOG_MESSAGE_LENGTH);
        assert!(event.message.len() >= MAX_LOG_MESSAGE_LENGTH - 1);
    }
}
