//! Log entry structure

use super::field::Field;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::panic::Location;

/// One record, fully materialized after the level gate opened
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Info sub-level requested through `v(n)`, if any
    pub verbosity: Option<i32>,
    pub message: String,
    pub timestamp: DateTime<Local>,
    /// Dot-joined hierarchical logger name
    pub logger_name: Option<String>,
    /// Short `dir/file.rs:line` of the call site
    pub caller: Option<String>,
    pub stacktrace: Option<String>,
    pub fields: Vec<Field>,
}

impl LogEntry {
    /// Sanitize text to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// to prevent attackers from injecting fake log entries. Applied to the
    /// message and to the logger name, the free-text columns of a record.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: &str) -> Self {
        Self {
            level,
            verbosity: None,
            message: Self::sanitize_message(message),
            timestamp: Local::now(),
            logger_name: None,
            caller: None,
            stacktrace: None,
            fields: Vec::new(),
        }
    }

    pub fn with_verbosity(mut self, verbosity: Option<i32>) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_logger_name(mut self, name: Option<&str>) -> Self {
        self.logger_name = name.map(Self::sanitize_message);
        self
    }

    pub fn with_caller(mut self, location: &Location<'_>) -> Self {
        self.caller = Some(short_caller(location));
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: String) -> Self {
        self.stacktrace = Some(stacktrace);
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }
}

/// Keep only the last directory and the file name, `core/logger.rs:42`.
fn short_caller(location: &Location<'_>) -> String {
    let file = location.file();
    let mut parts = file.rsplitn(3, ['/', '\\']);
    let name = parts.next().unwrap_or(file);
    match parts.next() {
        Some(dir) => format!("{}/{}:{}", dir, name, location.line()),
        None => format!("{}:{}", name, location.line()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_sanitized() {
        let entry = LogEntry::new(LogLevel::Info, "line one\nFAKE ERROR\tx");
        assert_eq!(entry.message, "line one\\nFAKE ERROR\\tx");
    }

    #[test]
    fn test_logger_name_sanitized() {
        let entry = LogEntry::new(LogLevel::Info, "hi").with_logger_name(Some("api\nERROR\tforged"));
        assert_eq!(entry.logger_name.as_deref(), Some("api\\nERROR\\tforged"));
    }

    #[test]
    fn test_short_caller() {
        let entry = LogEntry::new(LogLevel::Info, "here").with_caller(Location::caller());
        let caller = entry.caller.expect("caller set");
        assert!(caller.starts_with("core/log_entry.rs:"), "got {}", caller);
    }
}
