//! Info sub-levels
//!
//! `logger.v(n)` answers "is level `-n` enabled" once and hands back an
//! [`InfoLogger`]. When it is not, the result is the stateless
//! [`InfoLogger::Disabled`] and every call on it returns immediately.

use super::field::Field;
use super::kv::KvArg;
use super::log_level::LogLevel;
use super::logger::Logger;
use std::fmt;
use std::panic::Location;

/// Info-only logging capability at a fixed verbosity
#[derive(Debug, Clone, Default)]
pub enum InfoLogger {
    #[default]
    Disabled,
    Enabled { logger: Logger, verbosity: i32 },
}

impl InfoLogger {
    pub(crate) fn bound(logger: Logger, verbosity: i32) -> Self {
        InfoLogger::Enabled { logger, verbosity }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        matches!(self, InfoLogger::Enabled { .. })
    }

    /// Verbosity this capability was created for; `None` when disabled.
    pub fn verbosity(&self) -> Option<i32> {
        match self {
            InfoLogger::Enabled { verbosity, .. } => Some(*verbosity),
            InfoLogger::Disabled => None,
        }
    }

    #[track_caller]
    pub fn info(&self, message: &str, fields: &[Field]) {
        if let InfoLogger::Enabled { logger, verbosity } = self {
            logger.log_fields(LogLevel::Info, Some(*verbosity), message, fields, Location::caller());
        }
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        if let InfoLogger::Enabled { logger, verbosity } = self {
            logger.log_format(LogLevel::Info, Some(*verbosity), args, Location::caller());
        }
    }

    #[track_caller]
    pub fn infow(&self, message: &str, kvs: Vec<KvArg>) {
        if let InfoLogger::Enabled { logger, verbosity } = self {
            logger.log_kv(LogLevel::Info, Some(*verbosity), message, kvs, Location::caller());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OutputFormat, OutputTarget};
    use crate::sinks::MemorySink;

    fn capture(level: LogLevel) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .min_level(level)
            .format(OutputFormat::Json)
            .output(OutputTarget::custom(sink.clone()))
            .sampling(None)
            .build()
            .unwrap();
        (logger, sink)
    }

    #[test]
    fn test_v0_matches_info() {
        let (logger, _) = capture(LogLevel::Info);
        assert!(logger.v(0).enabled());
        assert!(!logger.v(1).enabled());
    }

    #[test]
    fn test_debug_enables_v1_only() {
        let (logger, _) = capture(LogLevel::Debug);
        assert!(logger.v(1).enabled());
        assert!(!logger.v(2).enabled());
    }

    #[test]
    fn test_negative_verbosity_is_more_severe() {
        let (logger, _) = capture(LogLevel::Warn);
        assert!(!logger.v(0).enabled());
        assert!(logger.v(-1).enabled());
    }

    #[test]
    fn test_enabled_records_verbosity() {
        let (logger, sink) = capture(LogLevel::Debug);
        logger.v(1).info("chatty", &[Field::int("n", 3)]);

        let lines = sink.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[0]["v"], 1);
        assert_eq!(lines[0]["n"], 3);
    }

    #[test]
    fn test_disabled_writes_nothing() {
        let (logger, sink) = capture(LogLevel::Info);
        let v = logger.v(3);
        v.info("hidden", &[]);
        v.infof(format_args!("hidden {}", 1));
        v.infow("hidden", crate::kvs!["k", "v"]);
        assert!(sink.is_empty());
        assert_eq!(v.verbosity(), None);
    }
}
