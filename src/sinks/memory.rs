//! In-memory sink for capturing output
//!
//! Clones share one buffer, so a test can keep a handle while the logger owns
//! another and then inspect what was written.

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    lines: Mutex<Vec<String>>,
    flushes: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Inner>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured lines, trailing newline stripped.
    pub fn lines(&self) -> Vec<String> {
        self.inner.lines.lock().clone()
    }

    /// Captured JSON lines parsed; lines that are not JSON are skipped.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.inner
            .lines
            .lock()
            .iter()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flush_count(&self) -> usize {
        self.inner.flushes.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.inner.lines.lock().clear();
    }

    /// Whether two handles share a buffer.
    pub fn same_buffer(&self, other: &MemorySink) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Sink for MemorySink {
    fn write(&mut self, line: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(line);
        self.inner
            .lines
            .lock()
            .push(text.trim_end_matches('\n').to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() -> Result<()> {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        writer.write(b"{\"a\":1}\n")?;
        writer.write(b"plain text\n")?;
        writer.flush()?;

        assert_eq!(sink.lines(), vec!["{\"a\":1}", "plain text"]);
        assert_eq!(sink.json_lines().len(), 1);
        assert_eq!(sink.flush_count(), 1);
        assert!(sink.same_buffer(&writer));
        assert!(!sink.same_buffer(&MemorySink::new()));
        Ok(())
    }
}
