//! Main logger implementation
//!
//! A [`Logger`] is an immutable handle: a shared backend (sinks, encoder,
//! level, sampler) plus the name and bound fields of this particular handle.
//! Cloning and deriving only bump reference counts; the backend is never
//! duplicated and never changes after construction.
//!
//! Every severity has three call shapes that meet in one private `emit`:
//!
//! - fields: `info("msg", &[Field::int("n", 1)])`
//! - format: `infof(format_args!("n={}", n))`, rendered only past the gate
//! - key-value: `infow("msg", kvs!["n", 1])`, normalized only past the gate

use super::{
    config::{LoggerBuilder, LoggerConfig, OutputTarget},
    context::{RequestContext, KEY_REQUEST_ID, KEY_USERNAME},
    error::Result,
    field::Field,
    kv::{normalize, KvArg, KvDiagnostic},
    log_entry::LogEntry,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    output_format::{EncoderConfig, OutputFormat},
    sampling::LogSampler,
    sink::{shared, SharedSink},
    verbosity::InfoLogger,
};
use crate::sinks::ConsoleSink;
use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Backend shared by a logger and everything derived from it
struct Core {
    min_level: LogLevel,
    encoder: EncoderConfig,
    /// Receive every record
    outputs: Vec<SharedSink>,
    /// Error outputs not already in `outputs`; receive Error and above
    extra_error_outputs: Vec<SharedSink>,
    /// Full error output list, for the logger's own failures
    error_outputs: Vec<SharedSink>,
    add_caller: bool,
    add_stacktrace: bool,
    sampler: Option<LogSampler>,
    metrics: LoggerMetrics,
    config: LoggerConfig,
}

impl Core {
    fn build(config: LoggerConfig) -> Result<Self> {
        let format = config.output_format()?;
        let mut opened: Vec<(OutputTarget, SharedSink)> = Vec::new();

        let mut open = |target: &OutputTarget| -> Result<SharedSink> {
            if let Some((_, sink)) = opened.iter().find(|(t, _)| t.same_destination(target)) {
                return Ok(Arc::clone(sink));
            }
            let sink = target.open()?;
            opened.push((target.clone(), Arc::clone(&sink)));
            Ok(sink)
        };

        let outputs = config
            .output_paths
            .iter()
            .map(&mut open)
            .collect::<Result<Vec<_>>>()?;
        let error_outputs = config
            .error_output_paths
            .iter()
            .map(&mut open)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::assemble(config, format, outputs, error_outputs))
    }

    fn assemble(
        config: LoggerConfig,
        format: OutputFormat,
        outputs: Vec<SharedSink>,
        error_outputs: Vec<SharedSink>,
    ) -> Self {
        let outputs = dedup(outputs);
        let error_outputs = dedup(error_outputs);
        let extra_error_outputs = error_outputs
            .iter()
            .filter(|e| !outputs.iter().any(|o| Arc::ptr_eq(o, e)))
            .cloned()
            .collect();

        Self {
            min_level: config.min_level(),
            encoder: EncoderConfig {
                format,
                timestamp_format: config.timestamp_format.clone(),
                color: config.enable_color,
            },
            outputs,
            extra_error_outputs,
            error_outputs,
            add_caller: !config.disable_caller,
            add_stacktrace: !config.disable_stacktrace,
            sampler: config.effective_sampling().cloned().map(LogSampler::new),
            metrics: LoggerMetrics::new(),
            config,
        }
    }

    #[inline]
    fn enabled_rank(&self, rank: i32) -> bool {
        rank >= self.min_level.rank()
    }

    fn write(&self, entry: &LogEntry) {
        let mut line = self.encoder.format.encode(entry, &self.encoder);
        line.push('\n');

        let targets = self.outputs.iter().chain(
            entry
                .level
                .is_error_or_above()
                .then_some(&self.extra_error_outputs)
                .into_iter()
                .flatten(),
        );

        let mut failed = false;
        for sink in targets {
            let result = sink.lock().write(line.as_bytes());
            if let Err(e) = result {
                failed = true;
                self.report_internal(&format!("write error: {}", e));
            }
        }

        if !failed {
            self.metrics.record_written();
        }

        // Panic and Fatal records must reach their destination before
        // control leaves the logger.
        if entry.level > LogLevel::Error {
            let _ = self.sync();
        }
    }

    /// Flush every sink, reporting failures; returns the first one.
    fn sync(&self) -> Result<()> {
        let mut first_err = None;
        for sink in self.outputs.iter().chain(&self.extra_error_outputs) {
            let result = sink.lock().flush();
            if let Err(e) = result {
                self.report_internal(&format!("sync error: {}", e));
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Report the logger's own failure to the error outputs.
    fn report_internal(&self, message: &str) {
        self.metrics.record_write_error();
        let line = format!(
            "{} {}\n",
            self.encoder.timestamp_format.format(&chrono::Local::now()),
            message
        );
        let mut delivered = false;
        for sink in &self.error_outputs {
            let mut sink = sink.lock();
            if sink.write(line.as_bytes()).is_ok() && sink.flush().is_ok() {
                delivered = true;
            }
        }
        if !delivered {
            eprintln!("[LOGGER ERROR] {}", message);
        }
    }
}

fn dedup(sinks: Vec<SharedSink>) -> Vec<SharedSink> {
    let mut unique: Vec<SharedSink> = Vec::with_capacity(sinks.len());
    for sink in sinks {
        if !unique.iter().any(|s| Arc::ptr_eq(s, &sink)) {
            unique.push(sink);
        }
    }
    unique
}

/// Leveled structured logger
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    name: Option<Arc<str>>,
    fields: Arc<[Field]>,
}

impl Logger {
    /// Build a logger from `config`, opening every output.
    ///
    /// Fails only if the format is unknown or an output cannot be opened.
    /// An unknown level is not an error; it falls back to info.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let name = (!config.name.is_empty()).then(|| Arc::from(config.name.as_str()));
        Ok(Self {
            core: Arc::new(Core::build(config)?),
            name,
            fields: Arc::from(Vec::new()),
        })
    }

    /// Info level, console format, stdout and stderr.
    pub fn console_default() -> Self {
        let config = LoggerConfig::default();
        let core = Core::assemble(
            config,
            OutputFormat::Console,
            vec![shared(ConsoleSink::stdout())],
            vec![shared(ConsoleSink::stderr())],
        );
        Self {
            core: Arc::new(core),
            name: None,
            fields: Arc::from(Vec::new()),
        }
    }

    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Whether a record at `level` would be written.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.core.enabled_rank(level.rank())
    }

    pub fn min_level(&self) -> LogLevel {
        self.core.min_level
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Fields bound by derivation, in the order they were added
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.core.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.core.metrics
    }

    /// Whether both handles share one backend.
    pub fn same_backend(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    /// Single emission primitive. Callers have already passed the gate.
    pub(crate) fn emit(
        &self,
        level: LogLevel,
        verbosity: Option<i32>,
        message: &str,
        fields: Vec<Field>,
        location: &Location<'_>,
    ) {
        if let Some(ref sampler) = self.core.sampler {
            if !sampler.should_sample(level, message) {
                self.core.metrics.record_sampled_out();
                return;
            }
        }

        let mut all_fields = Vec::with_capacity(self.fields.len() + fields.len());
        all_fields.extend(self.fields.iter().cloned());
        all_fields.extend(fields);

        let mut entry = LogEntry::new(level, message)
            .with_verbosity(verbosity)
            .with_logger_name(self.name.as_deref())
            .with_fields(all_fields);
        if self.core.add_caller {
            entry = entry.with_caller(location);
        }
        if self.core.add_stacktrace && level.is_error_or_above() {
            entry = entry.with_stacktrace(Backtrace::force_capture().to_string());
        }

        self.core.write(&entry);
    }

    pub(crate) fn log_fields(
        &self,
        level: LogLevel,
        verbosity: Option<i32>,
        message: &str,
        fields: &[Field],
        location: &Location<'_>,
    ) {
        self.emit(level, verbosity, message, fields.to_vec(), location);
    }

    pub(crate) fn log_format(
        &self,
        level: LogLevel,
        verbosity: Option<i32>,
        args: fmt::Arguments<'_>,
        location: &Location<'_>,
    ) {
        let message = match args.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(args.to_string()),
        };
        self.emit(level, verbosity, &message, Vec::new(), location);
    }

    pub(crate) fn log_kv(
        &self,
        level: LogLevel,
        verbosity: Option<i32>,
        message: &str,
        kvs: Vec<KvArg>,
        location: &Location<'_>,
    ) {
        let fields = self.normalize_kvs(kvs, location);
        self.emit(level, verbosity, message, fields, location);
    }

    fn normalize_kvs(&self, kvs: Vec<KvArg>, location: &Location<'_>) -> Vec<Field> {
        let normalized = normalize(kvs, Vec::new());
        if let Some(diagnostic) = normalized.diagnostic {
            self.report_malformed(&diagnostic, location);
        }
        normalized.fields
    }

    fn report_malformed(&self, diagnostic: &KvDiagnostic, location: &Location<'_>) {
        self.core.metrics.record_malformed_call();
        if self.enabled(LogLevel::Error) {
            self.emit(
                LogLevel::Error,
                None,
                diagnostic.message(),
                vec![diagnostic.field()],
                location,
            );
        }
    }

    #[inline]
    fn gated_fields(&self, level: LogLevel, message: &str, fields: &[Field], location: &Location<'_>) {
        if self.enabled(level) {
            self.log_fields(level, None, message, fields, location);
        }
    }

    #[inline]
    fn gated_format(&self, level: LogLevel, args: fmt::Arguments<'_>, location: &Location<'_>) {
        if self.enabled(level) {
            self.log_format(level, None, args, location);
        }
    }

    #[inline]
    fn gated_kv(&self, level: LogLevel, message: &str, kvs: Vec<KvArg>, location: &Location<'_>) {
        if self.enabled(level) {
            self.log_kv(level, None, message, kvs, location);
        }
    }
}

macro_rules! severity_methods {
    ($level:expr, $fields:ident, $format:ident, $kv:ident) => {
        #[track_caller]
        #[inline]
        pub fn $fields(&self, message: &str, fields: &[Field]) {
            self.gated_fields($level, message, fields, Location::caller());
        }

        #[track_caller]
        #[inline]
        pub fn $format(&self, args: fmt::Arguments<'_>) {
            self.gated_format($level, args, Location::caller());
        }

        #[track_caller]
        #[inline]
        pub fn $kv(&self, message: &str, kvs: Vec<KvArg>) {
            self.gated_kv($level, message, kvs, Location::caller());
        }
    };
}

impl Logger {
    severity_methods!(LogLevel::Debug, debug, debugf, debugw);
    severity_methods!(LogLevel::Info, info, infof, infow);
    severity_methods!(LogLevel::Warn, warn, warnf, warnw);
    severity_methods!(LogLevel::Error, error, errorf, errorw);

    /// Log at Panic level, then unwind the current thread.
    ///
    /// The unwind happens even when Panic records are filtered out, and can
    /// be caught with [`std::panic::catch_unwind`]. The panic payload is the
    /// message.
    #[track_caller]
    pub fn panic(&self, message: &str, fields: &[Field]) -> ! {
        self.gated_fields(LogLevel::Panic, message, fields, Location::caller());
        panic!("{}", message)
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        let message = args.to_string();
        self.gated_fields(LogLevel::Panic, &message, &[], Location::caller());
        panic!("{}", message)
    }

    #[track_caller]
    pub fn panicw(&self, message: &str, kvs: Vec<KvArg>) -> ! {
        self.gated_kv(LogLevel::Panic, message, kvs, Location::caller());
        panic!("{}", message)
    }

    /// Log at Fatal level, flush every sink, then exit the process with
    /// status 1. Nothing runs after this, not even destructors.
    #[track_caller]
    pub fn fatal(&self, message: &str, fields: &[Field]) -> ! {
        self.gated_fields(LogLevel::Fatal, message, fields, Location::caller());
        self.terminate()
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.gated_format(LogLevel::Fatal, args, Location::caller());
        self.terminate()
    }

    #[track_caller]
    pub fn fatalw(&self, message: &str, kvs: Vec<KvArg>) -> ! {
        self.gated_kv(LogLevel::Fatal, message, kvs, Location::caller());
        self.terminate()
    }

    fn terminate(&self) -> ! {
        let _ = self.core.sync();
        std::process::exit(1)
    }

    /// Info sub-level capability. Disabled levels get the no-op variant.
    #[inline]
    pub fn v(&self, verbosity: i32) -> InfoLogger {
        if self.core.enabled_rank(LogLevel::verbosity_rank(verbosity)) {
            InfoLogger::bound(self.clone(), verbosity)
        } else {
            InfoLogger::Disabled
        }
    }

    /// New logger with `kvs` bound to every record it writes.
    ///
    /// Malformed input is reported through this logger and the well-formed
    /// prefix is still bound.
    #[track_caller]
    #[must_use]
    pub fn with_fields(&self, kvs: Vec<KvArg>) -> Logger {
        let fields = self.normalize_kvs(kvs, Location::caller());
        self.with_typed_fields(fields)
    }

    /// New logger with already-typed fields bound.
    #[must_use]
    pub fn with_typed_fields(&self, fields: Vec<Field>) -> Logger {
        if fields.is_empty() {
            return self.clone();
        }
        let mut merged = Vec::with_capacity(self.fields.len() + fields.len());
        merged.extend(self.fields.iter().cloned());
        merged.extend(fields);
        Logger {
            core: Arc::clone(&self.core),
            name: self.name.clone(),
            fields: Arc::from(merged),
        }
    }

    /// New logger whose name has `segment` appended, dot-separated.
    #[must_use]
    pub fn with_name(&self, segment: &str) -> Logger {
        if segment.is_empty() {
            return self.clone();
        }
        let name = match self.name {
            Some(ref name) => Arc::from(format!("{}.{}", name, segment)),
            None => Arc::from(segment),
        };
        Logger {
            core: Arc::clone(&self.core),
            name: Some(name),
            fields: Arc::clone(&self.fields),
        }
    }

    /// New logger carrying the request id and principal of `ctx`.
    ///
    /// Missing values are bound as empty strings.
    #[must_use]
    pub fn from_context<C: RequestContext + ?Sized>(&self, ctx: &C) -> Logger {
        let request_id = ctx.value(KEY_REQUEST_ID).unwrap_or_default();
        let username = ctx.value(KEY_USERNAME).unwrap_or_default();
        self.with_typed_fields(vec![
            Field::string(KEY_REQUEST_ID, request_id),
            Field::string(KEY_USERNAME, username),
        ])
    }

    /// Flush every sink
    pub fn flush(&self) -> Result<()> {
        self.core.sync()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.core.min_level)
            .field("format", &self.core.encoder.format)
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// Each write becomes one Info record, trailing newline trimmed.
impl std::io::Write for Logger {
    #[track_caller]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.enabled(LogLevel::Info) {
            let text = String::from_utf8_lossy(buf);
            self.log_fields(
                LogLevel::Info,
                None,
                text.trim_end_matches(['\n', '\r']),
                &[],
                Location::caller(),
            );
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Logger::flush(self).map_err(std::io::Error::other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kvs;
    use crate::sinks::MemorySink;

    fn capture(level: LogLevel) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let target = OutputTarget::custom(sink.clone());
        let logger = Logger::builder()
            .min_level(level)
            .format(crate::core::OutputFormat::Json)
            .output(target.clone())
            .error_output(target)
            .sampling(None)
            .build()
            .unwrap();
        (logger, sink)
    }

    #[test]
    fn test_builder_basic() {
        let logger = Logger::builder().min_level(LogLevel::Debug).build().unwrap();
        assert!(logger.enabled(LogLevel::Debug));
        assert_eq!(logger.metrics().total_written(), 0);
    }

    #[test]
    fn test_console_default() {
        let logger = Logger::console_default();
        assert_eq!(logger.min_level(), LogLevel::Info);
        assert!(!logger.enabled(LogLevel::Debug));
        assert!(logger.name().is_none());
    }

    #[test]
    fn test_shared_sink_receives_error_once() {
        let (logger, sink) = capture(LogLevel::Debug);
        logger.error("boom", &[]);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_distinct_error_sink_gets_only_errors() {
        let out = MemorySink::new();
        let err = MemorySink::new();
        let logger = Logger::builder()
            .output(OutputTarget::custom(out.clone()))
            .error_output(OutputTarget::custom(err.clone()))
            .build()
            .unwrap();

        logger.info("fine", &[]);
        logger.warn("careful", &[]);
        logger.error("broken", &[]);

        assert_eq!(out.len(), 3);
        assert_eq!(err.len(), 1);
        assert!(err.lines()[0].contains("broken"));
    }

    #[test]
    fn test_format_message_rendered() {
        let (logger, sink) = capture(LogLevel::Info);
        let port = 8080;
        logger.infof(format_args!("listening on {}", port));
        assert_eq!(sink.json_lines()[0]["message"], "listening on 8080");
    }

    #[test]
    fn test_caller_is_call_site() {
        let (logger, sink) = capture(LogLevel::Info);
        logger.info("where", &[]);
        let caller = sink.json_lines()[0]["caller"].as_str().unwrap().to_string();
        assert!(caller.starts_with("core/logger.rs:"), "got {}", caller);
    }

    #[test]
    fn test_stacktrace_only_for_errors() {
        let (logger, sink) = capture(LogLevel::Info);
        logger.warn("w", &[]);
        logger.error("e", &[]);
        let lines = sink.json_lines();
        assert!(lines[0].get("stacktrace").is_none());
        assert!(lines[1]["stacktrace"].is_string());
    }

    #[test]
    fn test_name_chain() {
        let (logger, _sink) = capture(LogLevel::Info);
        let child = logger.with_name("api").with_name("").with_name("users");
        assert_eq!(child.name(), Some("api.users"));
        assert!(child.same_backend(&logger));
    }

    #[test]
    fn test_with_fields_reports_malformed_through_parent() {
        let (logger, sink) = capture(LogLevel::Info);
        let child = logger.with_fields(kvs!["svc", "api", "dangling"]);

        assert_eq!(child.fields(), &[Field::string("svc", "api")]);
        assert_eq!(logger.metrics().malformed_calls(), 1);
        let lines = sink.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["ignored key"], "dangling");
    }

    #[test]
    fn test_io_write_emits_info() {
        use std::io::Write;
        let (mut logger, sink) = capture(LogLevel::Info);
        writeln!(logger, "from a writer").unwrap();
        assert_eq!(sink.json_lines()[0]["message"], "from a writer");
    }

    #[test]
    fn test_io_write_reports_call_site() {
        use std::io::Write;
        let (mut logger, sink) = capture(LogLevel::Info);
        logger.write(b"direct\n").unwrap();
        let expected = format!("core/logger.rs:{}", line!() - 1);
        assert_eq!(sink.json_lines()[0]["caller"], expected.as_str());
    }

    #[test]
    fn test_sampling_drops_repeats() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .output(OutputTarget::custom(sink.clone()))
            .sampling(Some(crate::core::SamplingConfig {
                initial: 2,
                thereafter: 0,
                tick: std::time::Duration::from_secs(3600),
            }))
            .build()
            .unwrap();

        for _ in 0..5 {
            logger.info("repeated", &[]);
        }
        logger.info("different", &[]);

        assert_eq!(sink.len(), 3);
        assert_eq!(logger.metrics().sampled_out(), 3);
    }

    #[test]
    fn test_development_disables_sampling() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .output(OutputTarget::custom(sink.clone()))
            .development(true)
            .sampling(Some(crate::core::SamplingConfig {
                initial: 1,
                thereafter: 0,
                tick: std::time::Duration::from_secs(3600),
            }))
            .build()
            .unwrap();

        for _ in 0..5 {
            logger.info("repeated", &[]);
        }
        assert_eq!(sink.len(), 5);
    }

    #[test]
    fn test_invalid_format_fails_construction() {
        let config = LoggerConfig {
            format: "xml".to_string(),
            ..LoggerConfig::default()
        };
        assert!(Logger::new(config).is_err());
    }
}
