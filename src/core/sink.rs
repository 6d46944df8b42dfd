//! Sink trait for log output destinations

use super::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;

/// Destination for encoded records. One call to `write` carries one line,
/// newline included.
pub trait Sink: Send {
    fn write(&mut self, line: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// A sink shared between every logger built from the same configuration
pub type SharedSink = Arc<Mutex<dyn Sink>>;

pub fn shared<S: Sink + 'static>(sink: S) -> SharedSink {
    Arc::new(Mutex::new(sink))
}
