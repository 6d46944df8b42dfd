//! Process-wide default logger
//!
//! Until [`init`] is called the default is [`Logger::console_default`]. Every
//! free function here forwards to whatever logger is installed at the moment
//! of the call; a handle obtained earlier keeps logging to its own backend
//! after a reinitialization.
//!
//! ```
//! use leveled_logger::{global, LoggerConfig};
//!
//! global::init(LoggerConfig::from_json(r#"{"level": "debug"}"#).unwrap()).unwrap();
//! global::debug("configured", &[]);
//! ```

use crate::core::{Field, InfoLogger, KvArg, LogLevel, Logger, LoggerConfig, RequestContext, Result};
use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use parking_lot::{const_mutex, Mutex};
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Readers load the current logger without locking; a replacement is one
/// pointer swap.
static DEFAULT: Lazy<ArcSwap<Logger>> =
    Lazy::new(|| ArcSwap::from_pointee(Logger::console_default()));

/// Serializes initializations so that concurrent callers replace the default
/// one after another.
static INIT_LOCK: Mutex<()> = const_mutex(());

/// Build a logger from `config` and install it as the process default.
///
/// On error the previous default stays installed.
pub fn init(config: LoggerConfig) -> Result<()> {
    let _guard = INIT_LOCK.lock();
    let logger = Logger::new(config)?;
    install(logger);
    Ok(())
}

/// Same as [`init`]; the default can be replaced any number of times.
pub fn reinit(config: LoggerConfig) -> Result<()> {
    init(config)
}

/// Install an already built logger as the process default.
pub fn set_default(logger: Logger) {
    let _guard = INIT_LOCK.lock();
    install(logger);
}

fn install(logger: Logger) {
    let previous = DEFAULT.swap(Arc::new(logger));
    let _ = previous.flush();
}

/// Handle to the current default logger.
pub fn default_logger() -> Logger {
    Logger::clone(&DEFAULT.load())
}

macro_rules! forward_severity {
    ($($fields:ident, $format:ident, $kv:ident => $level:expr;)*) => {
        $(
            #[track_caller]
            pub fn $fields(message: &str, fields: &[Field]) {
                let logger = DEFAULT.load();
                if logger.enabled($level) {
                    logger.log_fields($level, None, message, fields, Location::caller());
                }
            }

            #[track_caller]
            pub fn $format(args: fmt::Arguments<'_>) {
                let logger = DEFAULT.load();
                if logger.enabled($level) {
                    logger.log_format($level, None, args, Location::caller());
                }
            }

            #[track_caller]
            pub fn $kv(message: &str, kvs: Vec<KvArg>) {
                let logger = DEFAULT.load();
                if logger.enabled($level) {
                    logger.log_kv($level, None, message, kvs, Location::caller());
                }
            }
        )*
    };
}

forward_severity! {
    debug, debugf, debugw => LogLevel::Debug;
    info, infof, infow => LogLevel::Info;
    warn, warnf, warnw => LogLevel::Warn;
    error, errorf, errorw => LogLevel::Error;
}

#[track_caller]
pub fn panic(message: &str, fields: &[Field]) -> ! {
    default_logger().panic(message, fields)
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    default_logger().panicf(args)
}

#[track_caller]
pub fn panicw(message: &str, kvs: Vec<KvArg>) -> ! {
    default_logger().panicw(message, kvs)
}

#[track_caller]
pub fn fatal(message: &str, fields: &[Field]) -> ! {
    default_logger().fatal(message, fields)
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) -> ! {
    default_logger().fatalf(args)
}

#[track_caller]
pub fn fatalw(message: &str, kvs: Vec<KvArg>) -> ! {
    default_logger().fatalw(message, kvs)
}

pub fn enabled(level: LogLevel) -> bool {
    DEFAULT.load().enabled(level)
}

pub fn v(verbosity: i32) -> InfoLogger {
    DEFAULT.load().v(verbosity)
}

#[track_caller]
pub fn with_fields(kvs: Vec<KvArg>) -> Logger {
    default_logger().with_fields(kvs)
}

pub fn with_name(segment: &str) -> Logger {
    DEFAULT.load().with_name(segment)
}

pub fn from_context<C: RequestContext + ?Sized>(ctx: &C) -> Logger {
    DEFAULT.load().from_context(ctx)
}

/// Flush the current default logger.
pub fn flush() -> Result<()> {
    default_logger().flush()
}
