//! Request-scoped values and logger propagation
//!
//! A request context carries string values under well-known keys. The logger
//! reads the request id and the authenticated principal from it, and a
//! [`Context`] can also carry a logger for code further down the call chain.

use super::logger::Logger;
use std::collections::HashMap;

/// Context key holding the request id
pub const KEY_REQUEST_ID: &str = "requestID";

/// Context key holding the authenticated principal
pub const KEY_USERNAME: &str = "username";

/// Read-only view of request-scoped values
pub trait RequestContext {
    fn value(&self, key: &str) -> Option<&str>;
}

impl RequestContext for HashMap<String, String> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl<C: RequestContext + ?Sized> RequestContext for &C {
    fn value(&self, key: &str) -> Option<&str> {
        (**self).value(key)
    }
}

/// Values of one request, optionally with a logger attached
///
/// ```
/// use leveled_logger::{Context, Logger, KEY_REQUEST_ID};
/// use leveled_logger::RequestContext;
///
/// let ctx = Context::new().with_request_id("req-1").with_username("alice");
/// assert_eq!(ctx.value(KEY_REQUEST_ID), Some("req-1"));
///
/// let logger = Logger::console_default().from_context(&ctx);
/// assert_eq!(logger.fields().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: HashMap<String, String>,
    logger: Option<Logger>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        self.with_value(KEY_REQUEST_ID, request_id)
    }

    #[must_use]
    pub fn with_username(self, username: impl Into<String>) -> Self {
        self.with_value(KEY_USERNAME, username)
    }

    /// Attach a logger to hand down the call chain.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The attached logger, or the process default if none was attached.
    pub fn logger(&self) -> Logger {
        match self.logger {
            Some(ref logger) => logger.clone(),
            None => crate::global::default_logger(),
        }
    }
}

impl RequestContext for Context {
    fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, OutputTarget};
    use crate::sinks::MemorySink;

    #[test]
    fn test_from_context_binds_both_keys() {
        let logger = Logger::console_default();
        let ctx = Context::new().with_request_id("r-42").with_username("bob");

        let derived = logger.from_context(&ctx);
        assert_eq!(
            derived.fields(),
            &[
                Field::string(KEY_REQUEST_ID, "r-42"),
                Field::string(KEY_USERNAME, "bob"),
            ]
        );
        assert!(logger.fields().is_empty());
    }

    #[test]
    fn test_from_context_missing_values_are_empty() {
        let logger = Logger::console_default();
        let derived = logger.from_context(&Context::new());
        assert_eq!(
            derived.fields(),
            &[
                Field::string(KEY_REQUEST_ID, ""),
                Field::string(KEY_USERNAME, ""),
            ]
        );
    }

    #[test]
    fn test_hash_map_context() {
        let mut values = HashMap::new();
        values.insert(KEY_REQUEST_ID.to_string(), "abc".to_string());
        let derived = Logger::console_default().from_context(&values);
        assert_eq!(derived.fields()[0], Field::string(KEY_REQUEST_ID, "abc"));
        assert_eq!(derived.fields()[1], Field::string(KEY_USERNAME, ""));
    }

    #[test]
    fn test_attached_logger_is_returned() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .output(OutputTarget::custom(sink.clone()))
            .name("handler")
            .build()
            .unwrap();

        let ctx = Context::new().with_logger(logger.clone());
        let from_ctx = ctx.logger();
        assert!(from_ctx.same_backend(&logger));
        assert_eq!(from_ctx.name(), Some("handler"));
    }
}
