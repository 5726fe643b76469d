//! Dispatch layer
//!
//! `Logger` is the process-scoped context: the destination registry plus the
//! override/disable controller. `Logger::log` is the single write entry
//! point and never reports failure to its caller.
//!
//! Write path:
//! 1. disable mask check on the requested destination (no formatting yet)
//! 2. process override (never applied to `Drop`), mask check again
//! 3. entry must be initialized and not failed
//! 4. format the record, take the entry guard
//! 5. reopen a handle lost by a previous rotation, rotate if due
//! 6. append, release the guard, then report any rotation error on the
//!    fallback destination

use crate::config::LogConfig;
use crate::destination::{DstMask, LogDst};
use crate::error::{LogError, Result};
use crate::record::format_record;
use crate::registry::{Entry, InitReport, Registry};
use crate::rotation;
use crate::stats::{Stats, StatsSnapshot};
use crate::transport::{PlatformTransport, Transport};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Destination that receives the logger's own diagnostics
pub const FALLBACK_DST: LogDst = LogDst::Stdout;

/// Override slot value meaning "no override"
const NO_OVERRIDE: usize = usize::MAX;

/// Process-scoped logger context
pub struct Logger {
    registry: Registry,
    /// Ordinal of the override destination, or `NO_OVERRIDE`
    override_dst: AtomicUsize,
    /// `DstMask` bits of disabled destinations
    disabled: AtomicU64,
    closed: AtomicBool,
    stats: Stats,
}

impl Logger {
    /// Logger over the platform transport
    pub fn new(config: &LogConfig) -> Self {
        Self::with_transport(config, Arc::new(PlatformTransport))
    }

    /// Logger over a custom transport
    pub fn with_transport(config: &LogConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry: Registry::new(config, transport),
            override_dst: AtomicUsize::new(NO_OVERRIDE),
            disabled: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            stats: Stats::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // =========================================================================
    // Init / shutdown
    // =========================================================================

    /// Initialize every eligible destination (see `Registry::init`).
    ///
    /// Each entry failing in this call is reported once on the fallback
    /// destination.
    pub fn init(&self, level: u32) -> InitReport {
        let report = self.registry.init(level);
        for (dst, err) in &report.failed {
            self.diagnostic(
                *dst,
                format_args!("log: cannot init {} destination: {}", dst, err),
            );
        }
        report
    }

    /// Flush and close every destination; later writes are dropped
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.registry.close_all();
    }

    // =========================================================================
    // Override / disable controller
    // =========================================================================

    /// Redirect every write (except to `Drop`) to `dst` until cleared.
    ///
    /// Inherited by children forked while it is set. Refused for a
    /// destination whose entry has failed.
    pub fn set_proc_log_dst(&self, dst: LogDst) -> Result<()> {
        if self.registry.entry(dst).is_failed() {
            return Err(LogError::DestinationFailed { name: dst.name() });
        }
        self.override_dst.store(dst.index(), Ordering::Relaxed);
        Ok(())
    }

    pub fn clear_proc_log_dst(&self) {
        self.override_dst.store(NO_OVERRIDE, Ordering::Relaxed);
    }

    /// Current process override
    pub fn proc_log_dst(&self) -> Option<LogDst> {
        match self.override_dst.load(Ordering::Relaxed) {
            NO_OVERRIDE => None,
            index => LogDst::from_index(index).ok(),
        }
    }

    /// Replace the disabled destination mask wholesale
    pub fn set_disabled_log_dst_mask(&self, mask: impl Into<DstMask>) {
        self.disabled.store(mask.into().bits(), Ordering::Relaxed);
    }

    pub fn disabled_log_dst_mask(&self) -> DstMask {
        DstMask::from_bits(self.disabled.load(Ordering::Relaxed))
    }

    /// Destination a write to `dst` actually lands on
    #[inline]
    pub fn resolve(&self, dst: LogDst) -> LogDst {
        if dst == LogDst::Drop {
            return dst;
        }
        match self.override_dst.load(Ordering::Relaxed) {
            NO_OVERRIDE => dst,
            index => LogDst::from_index(index).unwrap_or(dst),
        }
    }

    // =========================================================================
    // Write path
    // =========================================================================

    /// Write one message to `dst`. Never fails from the caller's view.
    pub fn log(&self, dst: LogDst, args: fmt::Arguments<'_>) {
        let disabled = self.disabled_log_dst_mask();
        if disabled.contains(dst) {
            self.stats.add_dropped_disabled();
            return;
        }
        let dst = self.resolve(dst);
        if dst == LogDst::Drop {
            return;
        }
        if disabled.contains(dst) {
            self.stats.add_dropped_disabled();
            return;
        }
        if self.closed.load(Ordering::Acquire) {
            self.stats.add_dropped_unavailable();
            return;
        }
        let entry = self.registry.entry(dst);
        if !entry.is_ready() {
            self.stats.add_dropped_unavailable();
            return;
        }

        let line = format_record(args);
        if let Err(e) = self.write_entry(entry, line.as_bytes()) {
            self.diagnostic(
                dst,
                format_args!("log: {} rotation failed: {}", dst, e),
            );
        }
    }

    /// Write a plain string to `dst`
    pub fn log_str(&self, dst: LogDst, message: &str) {
        self.log(dst, format_args!("{}", message));
    }

    /// Write to a destination given by its raw ordinal.
    ///
    /// An out-of-range ordinal is a programming error: it panics in debug
    /// builds and is dropped otherwise.
    pub fn log_index(&self, index: usize, args: fmt::Arguments<'_>) {
        match LogDst::from_index(index) {
            Ok(dst) => self.log(dst, args),
            Err(e) => {
                if cfg!(debug_assertions) {
                    panic!("{}", e);
                }
                self.stats.add_dropped_unavailable();
            }
        }
    }

    /// Rotate if due and append, under the entry guard.
    ///
    /// Returns the rotation error, if any; the append still happens on
    /// whatever handle rotation left behind.
    fn write_entry(&self, entry: &Entry, buf: &[u8]) -> Result<()> {
        let Some(mut state) = entry.acquire() else {
            self.stats.add_dropped_contended();
            return Ok(());
        };

        let path = entry.config().sink.file_path();
        if state.output.is_none() && !self.closed.load(Ordering::Acquire) {
            // A previous rotation could not reopen the live file.
            if let Ok(out) = self.registry.transport().open(&entry.config().sink) {
                state.output = Some(out);
            }
        }

        let mut rotation_err = None;
        let policy = entry.policy();
        let due = state
            .output
            .as_ref()
            .is_some_and(|out| policy.is_due(out.size()));
        if let (true, Some(path)) = (due, path) {
            let result =
                rotation::rotate(self.registry.transport(), path, policy, &mut state.output);
            self.stats.add_rotation(result.is_err());
            rotation_err = result.err();
        }

        match state.output.as_mut() {
            Some(out) => match out.append(buf) {
                Ok(()) => self.stats.add_written(buf.len()),
                Err(e) => {
                    self.stats.add_write_error();
                    debug!(destination = %entry.dst(), error = %e, "log write failed");
                }
            },
            None => self.stats.add_dropped_unavailable(),
        }
        drop(state);

        rotation_err.map_or(Ok(()), Err)
    }

    /// Best-effort report of a logger problem concerning `about`
    fn diagnostic(&self, about: LogDst, args: fmt::Arguments<'_>) {
        warn!(destination = %about, "{}", args);
        if about == FALLBACK_DST || self.disabled_log_dst_mask().contains(FALLBACK_DST) {
            return;
        }
        let entry = self.registry.entry(FALLBACK_DST);
        if !entry.is_ready() {
            return;
        }
        let line = format_record(args);
        if let Some(mut state) = entry.acquire() {
            if let Some(out) = state.output.as_mut() {
                let _ = out.append(line.as_bytes());
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.registry.close_all();
    }
}

// =============================================================================
// Tests
// =============================================================================
