//! Thread-safe sequence counter for set-clipboard messages.
//!
//! The agent deduplicates clipboard writes by sequence number, so every
//! set-clipboard message must carry a value strictly greater than the
//! previous one. The counter is incremented *before* each send: a fresh
//! session sends 1 first.

use std::sync::atomic::{AtomicI64, Ordering};

/// A monotonically increasing counter for set-clipboard sequence numbers.
///
/// Starts at 0; [`next`](ClipboardSequence::next) increments and returns the
/// new value, so the first call yields 1.
#[derive(Debug, Default)]
pub struct ClipboardSequence {
    inner: AtomicI64,
}

impl ClipboardSequence {
    /// Creates a new counter starting at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter and returns the new value.
    ///
    /// `Ordering::Relaxed` suffices: the value is only used for message
    /// numbering, not for memory synchronisation between threads.
    pub fn next(&self) -> i64 {
        self.inner.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the most recently issued value without incrementing.
    pub fn current(&self) -> i64 {
        self.inner.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_value_is_one() {
        let seq = ClipboardSequence::new();
        assert_eq!(seq.next(), 1);
    }

    #[test]
    fn test_increments_by_exactly_one_per_call() {
        let seq = ClipboardSequence::new();
        for expected in 1..=100 {
            assert_eq!(seq.next(), expected);
        }
    }

    #[test]
    fn test_current_does_not_advance() {
        let seq = ClipboardSequence::new();
        seq.next();
        assert_eq!(seq.current(), 1);
        assert_eq!(seq.current(), 1);
        assert_eq!(seq.next(), 2);
    }

    #[test]
    fn test_values_are_unique_across_threads() {
        let seq = Arc::new(ClipboardSequence::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let s = Arc::clone(&seq);
                thread::spawn(move || (0..1000).map(|_| s.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8 * 1000, "no two sends may share a sequence");
    }
}
