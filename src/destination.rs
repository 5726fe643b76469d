//! Log destinations
//!
//! `LogDst` is the closed, build-dependent enumeration of logical outputs.
//! Its ordinal is used directly as the registry index, so the order below is
//! stable: `Stdout` first, feature variants after `Monitor`, `Drop` last.

use crate::error::{LogError, Result};
use std::fmt;
use std::str::FromStr;

/// Logical log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogDst {
    /// Process stdout (must stay first, it is the fallback)
    Stdout,
    /// Serial console device
    Console,
    /// Generic agent log file
    Unum,
    /// HTTP request/response log file
    Http,
    /// Monitor process log file
    Monitor,
    /// Firmware updater process log file
    #[cfg(feature = "fw-updater")]
    Update,
    /// Firmware updater monitor log file
    #[cfg(feature = "fw-updater")]
    UpdateMonitor,
    /// Support portal process log file
    #[cfg(feature = "support")]
    Support,
    /// Debug log file
    #[cfg(feature = "debug-log")]
    Debug,
    /// Discards everything (keep it last)
    Drop,
}

/// Default destination of `log!`
pub const LOG_DST: LogDst = LogDst::Unum;

/// Default destination of `log_dbg!`
pub const LOG_DBG_DST: LogDst = LogDst::Console;

impl LogDst {
    /// Every destination of this build in ordinal order
    pub const ALL: &'static [LogDst] = &[
        LogDst::Stdout,
        LogDst::Console,
        LogDst::Unum,
        LogDst::Http,
        LogDst::Monitor,
        #[cfg(feature = "fw-updater")]
        LogDst::Update,
        #[cfg(feature = "fw-updater")]
        LogDst::UpdateMonitor,
        #[cfg(feature = "support")]
        LogDst::Support,
        #[cfg(feature = "debug-log")]
        LogDst::Debug,
        LogDst::Drop,
    ];

    /// Registry table size (`LOG_DST_MAX`)
    pub const COUNT: usize = Self::ALL.len();

    /// Registry index of this destination
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Destination for a raw registry index
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(LogError::InvalidDestination { index })
    }

    /// Stable name used in config files and on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Console => "console",
            Self::Unum => "unum",
            Self::Http => "http",
            Self::Monitor => "monitor",
            #[cfg(feature = "fw-updater")]
            Self::Update => "update",
            #[cfg(feature = "fw-updater")]
            Self::UpdateMonitor => "update-monitor",
            #[cfg(feature = "support")]
            Self::Support => "support",
            #[cfg(feature = "debug-log")]
            Self::Debug => "debug",
            Self::Drop => "drop",
        }
    }

    /// Bit of this destination in a `DstMask`
    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << self.index()
    }
}

impl fmt::Display for LogDst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogDst {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|dst| dst.name() == wanted)
            .ok_or_else(|| LogError::UnknownDestination {
                name: s.to_string(),
            })
    }
}

// The disable mask is a single 64-bit word.
const _: () = assert!(LogDst::COUNT <= 64);

/// Bitmask over destination ordinals (set bit = destination disabled)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DstMask(u64);

impl DstMask {
    /// Mask with no destination set
    pub const EMPTY: DstMask = DstMask(0);

    /// Build from raw bits (bit N = destination with ordinal N)
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Build from a list of destinations
    pub fn of(dsts: &[LogDst]) -> Self {
        Self(dsts.iter().fold(0, |acc, dst| acc | dst.bit()))
    }

    /// Whether `dst` is set
    #[inline]
    pub const fn contains(self, dst: LogDst) -> bool {
        self.0 & dst.bit() != 0
    }

    /// Copy with `dst` set
    pub const fn with(self, dst: LogDst) -> Self {
        Self(self.0 | dst.bit())
    }

    /// Copy with `dst` cleared
    pub const fn without(self, dst: LogDst) -> Self {
        Self(self.0 & !dst.bit())
    }

    /// Destinations set in this mask
    pub fn iter(self) -> impl Iterator<Item = LogDst> {
        LogDst::ALL.iter().copied().filter(move |dst| self.contains(*dst))
    }
}

impl From<u64> for DstMask {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}
