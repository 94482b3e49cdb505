//! Bounded diagnostic log for GPU and shader errors.
//!
//! Device-level errors are asynchronous and must never tear down the frame
//! loop, so they are captured here for later inspection instead of being
//! propagated. The log holds a fixed number of entries; once full, the
//! oldest entry is evicted.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Maximum number of retained entries.
pub const ERROR_LOG_CAPACITY: usize = 256;

/// Fixed-capacity circular log of error messages.
#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: VecDeque<String>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(ERROR_LOG_CAPACITY),
        }
    }

    /// Append an entry, evicting the oldest once the capacity is reached.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");

        if self.entries.len() == ERROR_LOG_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(message);
    }

    /// Entries in insertion order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Cloneable handle to an [`ErrorLog`].
///
/// The wgpu uncaptured-error callback needs its own handle to the log, so
/// the log lives behind `Arc<Mutex<..>>` even though the sandbox itself is
/// single-threaded.
#[derive(Debug, Clone, Default)]
pub struct SharedErrorLog {
    inner: Arc<Mutex<ErrorLog>>,
}

impl SharedErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: impl Into<String>) {
        self.lock().push(message);
    }

    /// Copy of the current entries, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().entries().map(str::to_owned).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ErrorLog> {
        // A panic while holding the lock poisons it but leaves the log usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read() {
        let mut log = ErrorLog::new();
        log.push("first");
        log.push("second");

        let entries: Vec<_> = log.entries().collect();
        assert_eq!(entries, ["first", "second"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut log = ErrorLog::new();
        for i in 0..ERROR_LOG_CAPACITY + 10 {
            log.push(format!("entry {i}"));
        }

        assert_eq!(log.len(), ERROR_LOG_CAPACITY);
        assert_eq!(log.entries().next(), Some("entry 10"));
    }

    #[test]
    fn test_clear() {
        let mut log = ErrorLog::new();
        log.push("entry");
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_shared_handles_see_same_log() {
        let a = SharedErrorLog::new();
        let b = a.clone();
        a.push("from a");
        b.push("from b");

        assert_eq!(a.snapshot(), ["from a", "from b"]);
        assert_eq!(a.len(), b.len());
    }
}
