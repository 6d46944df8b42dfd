//! Core logger types and traits

pub mod config;
pub mod context;
pub mod error;
pub mod field;
pub mod kv;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod sampling;
pub mod sink;
pub mod timestamp;
pub mod verbosity;

pub use config::{LoggerBuilder, LoggerConfig, OutputTarget};
pub use context::{Context, RequestContext, KEY_REQUEST_ID, KEY_USERNAME};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldValue};
pub use kv::{normalize, KvArg, KvDiagnostic, Normalized};
pub use log_entry::LogEntry;
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::LoggerMetrics;
pub use output_format::{EncoderConfig, OutputFormat};
pub use sampling::{LogSampler, SamplingConfig};
pub use sink::{shared, SharedSink, Sink};
pub use timestamp::TimestampFormat;
pub use verbosity::InfoLogger;
