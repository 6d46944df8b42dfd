//! Logging macros for ergonomic log message formatting.
//!
//! The `*f!` macros wrap their arguments in [`format_args!`], so nothing is
//! rendered unless the level is enabled. [`kvs!`](crate::kvs) builds the
//! loosely typed key-value lists taken by the `*w` methods.
//!
//! # Examples
//!
//! ```
//! use leveled_logger::prelude::*;
//! use leveled_logger::{infof, kvs};
//!
//! let logger = Logger::console_default();
//!
//! let port = 8080;
//! infof!(logger, "Server listening on port {}", port);
//!
//! logger.infow("request served", kvs!["status", 200, "path", "/health"]);
//! ```

/// Build a key-value argument list.
///
/// # Examples
///
/// ```
/// use leveled_logger::{kvs, KvArg, FieldValue};
///
/// let args = kvs!["user", "alice", "attempts", 3];
/// assert_eq!(args.len(), 4);
/// assert_eq!(args[3], KvArg::Value(FieldValue::Int(3)));
/// ```
#[macro_export]
macro_rules! kvs {
    () => {
        ::std::vec::Vec::<$crate::KvArg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::KvArg::from($arg)),+]
    };
}

/// Log a formatted debug-level message.
///
/// ```
/// # use leveled_logger::prelude::*;
/// # let logger = Logger::console_default();
/// use leveled_logger::debugf;
/// debugf!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted info-level message.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(::std::format_args!($($arg)+))
    };
}

/// Log a formatted warn-level message.
///
/// ```
/// # use leveled_logger::prelude::*;
/// # let logger = Logger::console_default();
/// use leveled_logger::warnf;
/// warnf!(logger, "Retry {} of {}", 1, 3);
/// ```
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted error-level message.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted panic-level message, then panic.
#[macro_export]
macro_rules! panicf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(::std::format_args!($($arg)+))
    };
}

/// Log a formatted fatal-level message, then exit the process.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::std::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, Logger, OutputFormat, OutputTarget};
    use crate::sinks::MemorySink;

    fn capture() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .min_level(LogLevel::Debug)
            .format(OutputFormat::Json)
            .output(OutputTarget::custom(sink.clone()))
            .disable_stacktrace(true)
            .sampling(None)
            .build()
            .unwrap();
        (logger, sink)
    }

    #[test]
    fn test_format_macros() {
        let (logger, sink) = capture();
        debugf!(logger, "Count: {}", 5);
        infof!(logger, "Items: {}", 100);
        warnf!(logger, "Retry {} of {}", 1, 3);
        errorf!(logger, "Code: {}", 500);

        let messages: Vec<String> = sink
            .json_lines()
            .iter()
            .map(|l| l["message"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(messages, ["Count: 5", "Items: 100", "Retry 1 of 3", "Code: 500"]);
    }

    #[test]
    fn test_panicf_macro() {
        let (logger, sink) = capture();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            panicf!(logger, "bad state: {}", 7);
        }));
        assert!(result.is_err());
        assert_eq!(sink.json_lines()[0]["level"], "PANIC");
    }

    #[test]
    fn test_kvs_empty_and_trailing_comma() {
        let empty = kvs![];
        assert!(empty.is_empty());
        let args = kvs!["a", 1,];
        assert_eq!(args.len(), 2);
    }
}
