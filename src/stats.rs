//! Logger statistics
//!
//! Thread-safe counters updated from the write path.
//! Uses lock-free atomics for all operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by every destination of one logger (fully lock-free)
#[derive(Debug, Default)]
pub struct Stats {
    /// Messages appended to a sink
    messages: AtomicU64,
    /// Bytes appended to a sink
    bytes: AtomicU64,
    /// Messages dropped by the disable mask
    dropped_disabled: AtomicU64,
    /// Messages dropped because the entry is failed, uninitialized or closed
    dropped_unavailable: AtomicU64,
    /// Messages dropped because an unguarded entry was busy
    dropped_contended: AtomicU64,
    /// Messages whose append returned an error
    write_errors: AtomicU64,
    /// Rotations performed
    rotations: AtomicU64,
    /// Rotations that hit at least one error
    rotation_errors: AtomicU64,
}

/// Point-in-time copy of `Stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub messages: u64,
    pub bytes: u64,
    pub dropped_disabled: u64,
    pub dropped_unavailable: u64,
    pub dropped_contended: u64,
    pub write_errors: u64,
    pub rotations: u64,
    pub rotation_errors: u64,
}

impl StatsSnapshot {
    /// Total messages that never reached a sink
    pub fn dropped(&self) -> u64 {
        self.dropped_disabled + self.dropped_unavailable + self.dropped_contended
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_written(&self, bytes: usize) {
        self.messages.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_dropped_disabled(&self) {
        self.dropped_disabled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_dropped_unavailable(&self) {
        self.dropped_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_dropped_contended(&self) {
        self.dropped_contended.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rotation(&self, failed: bool) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.rotation_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            messages: self.messages.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            dropped_disabled: self.dropped_disabled.load(Ordering::Relaxed),
            dropped_unavailable: self.dropped_unavailable.load(Ordering::Relaxed),
            dropped_contended: self.dropped_contended.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_errors: self.rotation_errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counters_from_threads() {
        let stats = Arc::new(Stats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        stats.add_written(10);
                        stats.add_dropped_disabled();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snap = stats.snapshot();
        assert_eq!(snap.messages, 400);
        assert_eq!(snap.bytes, 4000);
        assert_eq!(snap.dropped(), 400);
    }

    #[test]
    fn test_rotation_errors_counted_separately() {
        let stats = Stats::new();
        stats.add_rotation(false);
        stats.add_rotation(true);
        let snap = stats.snapshot();
        assert_eq!(snap.rotations, 2);
        assert_eq!(snap.rotation_errors, 1);
    }
}
