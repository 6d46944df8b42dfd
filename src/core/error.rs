//! Error types for the logger system
//!
//! Only construction and sink I/O can fail. Malformed logging calls are
//! reported as diagnostic records and never surface here.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// An output target could not be opened
    #[error("Cannot open sink '{target}': {source}")]
    SinkOpen {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a sink construction error
    pub fn sink_open(target: impl Into<String>, source: std::io::Error) -> Self {
        LoggerError::SinkOpen {
            target: target.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("level", "unknown level 'loud'");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory");
        let err = LoggerError::sink_open("/missing/dir/app.log", io_err);
        assert!(matches!(err, LoggerError::SinkOpen { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::config("format", "unknown format 'xml'");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for format: unknown format 'xml'"
        );

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = LoggerError::sink_open("/var/log/app.log", io_err);
        assert_eq!(err.to_string(), "Cannot open sink '/var/log/app.log': denied");
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("flushing sink", "stdout", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("flushing sink"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
