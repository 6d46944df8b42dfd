//! Logger configuration
//!
//! `LoggerConfig` is read once at startup, usually as a section of the host's
//! own configuration file, and turned into a [`Logger`]. It is never mutated
//! by a running logger; reconfiguring means building a new one.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::logger::Logger;
use super::output_format::OutputFormat;
use super::sampling::SamplingConfig;
use super::sink::{shared, SharedSink, Sink};
use super::timestamp::TimestampFormat;
use crate::sinks::{ConsoleSink, FileSink};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where encoded records go
///
/// Parsed from strings: `stdout`, `stderr`, anything else is a file path.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum OutputTarget {
    Stdout,
    Stderr,
    File(PathBuf),
    Custom(SharedSink),
}

impl OutputTarget {
    pub fn custom<S: Sink + 'static>(sink: S) -> Self {
        OutputTarget::Custom(shared(sink))
    }

    pub fn open(&self) -> Result<SharedSink> {
        Ok(match self {
            OutputTarget::Stdout => shared(ConsoleSink::stdout()),
            OutputTarget::Stderr => shared(ConsoleSink::stderr()),
            OutputTarget::File(path) => shared(FileSink::new(path.clone())?),
            OutputTarget::Custom(sink) => Arc::clone(sink),
        })
    }

    /// Whether both targets name the same destination.
    pub fn same_destination(&self, other: &OutputTarget) -> bool {
        match (self, other) {
            (OutputTarget::Stdout, OutputTarget::Stdout) => true,
            (OutputTarget::Stderr, OutputTarget::Stderr) => true,
            (OutputTarget::File(a), OutputTarget::File(b)) => a == b,
            (OutputTarget::Custom(a), OutputTarget::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for OutputTarget {
    fn from(s: &str) -> Self {
        match s.trim() {
            "stdout" => OutputTarget::Stdout,
            "stderr" => OutputTarget::Stderr,
            path => OutputTarget::File(PathBuf::from(path)),
        }
    }
}

impl From<String> for OutputTarget {
    fn from(s: String) -> Self {
        OutputTarget::from(s.as_str())
    }
}

impl fmt::Debug for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => f.write_str("stdout"),
            OutputTarget::Stderr => f.write_str("stderr"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
            OutputTarget::Custom(sink) => write!(f, "custom({})", sink.lock().name()),
        }
    }
}

/// Logger options
///
/// Keys are kebab-case when deserialized, and every key is optional:
///
/// ```
/// use leveled_logger::{LoggerConfig, LogLevel};
///
/// let config = LoggerConfig::from_json(r#"{
///     "level": "warn",
///     "format": "json",
///     "output-paths": ["stdout"],
///     "disable-caller": true
/// }"#).unwrap();
///
/// assert_eq!(config.min_level(), LogLevel::Warn);
/// assert!(config.disable_caller);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggerConfig {
    /// Minimum level; unknown values fall back to info
    pub level: String,
    /// `console` or `json`
    pub format: String,
    pub output_paths: Vec<OutputTarget>,
    /// Destinations that additionally receive error-and-above records and
    /// the logger's own write failures
    pub error_output_paths: Vec<OutputTarget>,
    pub disable_caller: bool,
    pub disable_stacktrace: bool,
    /// Only honored by the console format
    pub enable_color: bool,
    pub development: bool,
    pub name: String,
    pub timestamp_format: TimestampFormat,
    /// Ignored in development mode
    pub sampling: Option<SamplingConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: OutputFormat::Console.as_str().to_string(),
            output_paths: vec![OutputTarget::Stdout],
            error_output_paths: vec![OutputTarget::Stderr],
            disable_caller: false,
            disable_stacktrace: false,
            enable_color: false,
            development: false,
            name: String::new(),
            timestamp_format: TimestampFormat::default(),
            sampling: Some(SamplingConfig::default()),
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configured minimum level, or `Info` when the value is not a level.
    pub fn min_level(&self) -> LogLevel {
        self.level.parse().unwrap_or(LogLevel::Info)
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format
            .parse()
            .map_err(|message: String| LoggerError::config("format", message))
    }

    /// Sampling in effect; development mode turns it off.
    pub fn effective_sampling(&self) -> Option<&SamplingConfig> {
        if self.development {
            None
        } else {
            self.sampling.as_ref()
        }
    }

    /// Every problem with the options, without stopping at the first.
    ///
    /// An invalid level is reported here but does not prevent building a
    /// logger; an invalid format does.
    pub fn validate(&self) -> Vec<LoggerError> {
        let mut errs = Vec::new();
        if let Err(message) = self.level.parse::<LogLevel>() {
            errs.push(LoggerError::config("level", message));
        }
        if let Err(err) = self.output_format() {
            errs.push(err);
        }
        if self.output_paths.is_empty() {
            errs.push(LoggerError::config("output-paths", "no output configured"));
        }
        errs
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use leveled_logger::prelude::*;
///
/// let capture = MemorySink::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .format(OutputFormat::Json)
///     .output(OutputTarget::custom(capture.clone()))
///     .name("api")
///     .build()
///     .unwrap();
///
/// logger.debug("ready", &[]);
/// assert_eq!(capture.len(), 1);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    outputs_set: bool,
    error_outputs_set: bool,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            outputs_set: false,
            error_outputs_set: false,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.config.level = level.to_str().to_lowercase();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format.as_str().to_string();
        self
    }

    /// Add a normal output. The first call replaces the default stdout.
    #[must_use = "builder methods return a new value"]
    pub fn output(mut self, target: impl Into<OutputTarget>) -> Self {
        if !self.outputs_set {
            self.config.output_paths.clear();
            self.outputs_set = true;
        }
        self.config.output_paths.push(target.into());
        self
    }

    /// Add an error output. The first call replaces the default stderr.
    #[must_use = "builder methods return a new value"]
    pub fn error_output(mut self, target: impl Into<OutputTarget>) -> Self {
        if !self.error_outputs_set {
            self.config.error_output_paths.clear();
            self.error_outputs_set = true;
        }
        self.config.error_output_paths.push(target.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn disable_caller(mut self, disable: bool) -> Self {
        self.config.disable_caller = disable;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn disable_stacktrace(mut self, disable: bool) -> Self {
        self.config.disable_stacktrace = disable;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn enable_color(mut self, enable: bool) -> Self {
        self.config.enable_color = enable;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn development(mut self, development: bool) -> Self {
        self.config.development = development;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sampling(mut self, sampling: Option<SamplingConfig>) -> Self {
        self.config.sampling = sampling;
        self
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn into_config(self) -> LoggerConfig {
        self.config
    }

    /// Build the Logger, opening every output
    pub fn build(self) -> Result<Logger> {
        Logger::new(self.config)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
