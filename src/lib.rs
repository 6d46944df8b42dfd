//! # Leveled Logger
//!
//! Leveled, structured logging with a cheap severity gate and immutable,
//! derivable logger handles.
//!
//! ## Features
//!
//! - **Cheap Gate**: Disabled calls return before any message or field work
//! - **Three Call Shapes**: Typed fields, lazy formatting, loose key-value lists
//! - **Derivation**: `with_name`, `with_fields` and `from_context` never touch the receiver
//! - **Process Default**: Free functions in [`global`] that can be reinitialized at runtime
//!
//! ```
//! use leveled_logger::prelude::*;
//! use leveled_logger::kvs;
//!
//! let capture = MemorySink::new();
//! let logger = Logger::builder()
//!     .min_level(LogLevel::Warn)
//!     .output(OutputTarget::custom(capture.clone()))
//!     .build()
//!     .unwrap();
//!
//! logger.info("dropped", &[]);
//! logger.with_name("db").warnw("slow query", kvs!["ms", 950]);
//! assert_eq!(capture.len(), 1);
//! ```

pub mod core;
pub mod global;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        Context, Field, FieldValue, InfoLogger, KvArg, LogLevel, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, OutputFormat, OutputTarget, RequestContext, Result, Sink,
    };
    pub use crate::sinks::{ConsoleSink, FileSink, MemorySink};
}

pub use crate::core::{
    normalize, shared, Context, EncoderConfig, Field, FieldValue, InfoLogger,
    KvArg, KvDiagnostic, LogEntry, LogLevel, LogSampler, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, LoggerMetrics, Normalized, OutputFormat, OutputTarget, RequestContext, Result,
    SamplingConfig, SharedSink, Sink, TimestampFormat, KEY_REQUEST_ID, KEY_USERNAME,
};
pub use sinks::{ConsoleSink, ConsoleStream, FileSink, MemorySink};
