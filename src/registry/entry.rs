//! Registry entry: configuration and live state of one destination

use crate::config::DestinationConfig;
use crate::constants::{
    LOG_FLAG_INIT_DONE, LOG_FLAG_INIT_FAIL, LOG_FLAG_INIT_MSG, LOG_FLAG_MUTEX,
};
use crate::destination::LogDst;
use crate::rotation::RotationPolicy;
use crate::transport::{platform_flags, Output};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU32, Ordering};

/// Writer serialization of an entry
///
/// `Guarded` entries serve several threads and block on the entry lock.
/// `Unguarded` entries are assumed to have a single writer: they only ever
/// try the lock, and a busy lock (the assumption was broken) drops the
/// message instead of waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Unguarded,
    Guarded,
}

/// Mutable part of an entry, only touched with the entry lock held
pub struct SinkState {
    pub output: Option<Box<dyn Output>>,
}

/// One registry slot
pub struct Entry {
    dst: LogDst,
    config: DestinationConfig,
    policy: RotationPolicy,
    guard: Guard,
    flags: AtomicU32,
    state: Mutex<SinkState>,
}

impl Entry {
    pub(crate) fn new(dst: LogDst, config: DestinationConfig) -> Self {
        let guard = if config.guarded {
            Guard::Guarded
        } else {
            Guard::Unguarded
        };
        let mut flags = platform_flags(&config.sink);
        if config.guarded {
            flags |= LOG_FLAG_MUTEX;
        }
        if config.init_banner {
            flags |= LOG_FLAG_INIT_MSG;
        }
        Self {
            dst,
            policy: RotationPolicy::for_config(&config),
            config,
            guard,
            flags: AtomicU32::new(flags),
            state: Mutex::new(SinkState { output: None }),
        }
    }

    pub fn dst(&self) -> LogDst {
        self.dst
    }

    pub fn config(&self) -> &DestinationConfig {
        &self.config
    }

    pub fn policy(&self) -> RotationPolicy {
        self.policy
    }

    pub fn guard(&self) -> Guard {
        self.guard
    }

    /// Current `LOG_FLAG_*` bits
    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    pub(crate) fn set_flags(&self, bits: u32) {
        self.flags.fetch_or(bits, Ordering::AcqRel);
    }

    pub fn is_initialized(&self) -> bool {
        self.flags() & LOG_FLAG_INIT_DONE != 0
    }

    pub fn is_failed(&self) -> bool {
        self.flags() & LOG_FLAG_INIT_FAIL != 0
    }

    /// Initialized and not failed
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.flags() & (LOG_FLAG_INIT_DONE | LOG_FLAG_INIT_FAIL) == LOG_FLAG_INIT_DONE
    }

    /// Take the entry lock according to its guard mode.
    ///
    /// Returns `None` only for an unguarded entry whose lock is busy.
    /// Unguarded entries never wait: the try-lock stands in for "no
    /// locking" and still rules out two writers on one handle.
    #[inline]
    pub(crate) fn acquire(&self) -> Option<MutexGuard<'_, SinkState>> {
        match self.guard {
            Guard::Guarded => Some(self.state.lock()),
            Guard::Unguarded => self.state.try_lock(),
        }
    }

    /// Blocking lock regardless of guard mode (init and shutdown paths)
    pub(crate) fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock()
    }

    /// Whether a handle is currently open
    pub fn is_open(&self) -> bool {
        self.state.lock().output.is_some()
    }
}
