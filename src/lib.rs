//! Multi-destination rotating logger for embedded agents
//!
//! Routes messages to one of a fixed set of destinations (stdout, serial
//! console, per-subsystem log files), bounds each file with size-based
//! rotation, and lets a process redirect or mute destinations at runtime.
//!
//! - `LogDst` / `DstMask` - destination enumeration and disable bitmask
//! - `LogConfig` - TOML configuration with per-destination overrides
//! - `Registry` - fixed destination table and staged init
//! - `rotation` - numbered and in-place cut rotation
//! - `Logger` - write path, override and disable controls
//! - `global` - process-wide logger and the logging macros
//!
//! ```no_run
//! use unum_log::{LogConfig, LogDst, Logger};
//!
//! let logger = Logger::new(&LogConfig::with_log_dir("/tmp"));
//! let report = logger.init(0);
//! if let Err(e) = report.status() {
//!     eprintln!("{}", e);
//! }
//! logger.log(LogDst::Http, format_args!("GET / -> {}", 200));
//! ```

pub mod config;
pub mod constants;
pub mod destination;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod global;
pub mod record;
pub mod registry;
pub mod rotation;
pub mod stats;
pub mod transport;

pub use config::{DestinationConfig, DestinationOverride, LogConfig, SinkKind, SinkKindSetting};
pub use destination::{DstMask, LogDst, LOG_DBG_DST, LOG_DST};
pub use dispatch::{Logger, FALLBACK_DST};
pub use error::{LogError, Result};
pub use global::{
    clear_proc_log_dst, log_init, set_disabled_log_dst_mask, set_proc_log_dst, unum_log,
};
pub use registry::{Guard, InitReport, Registry};
pub use stats::StatsSnapshot;
pub use transport::{Output, PlatformTransport, Transport};

/// Write a formatted message to a destination through the process logger
///
/// ```no_run
/// unum_log::unum_log!(unum_log::LogDst::Http, "GET {} -> {}", "/", 200);
/// ```
#[macro_export]
macro_rules! unum_log {
    ($dst:expr, $($arg:tt)+) => {
        $crate::global::unum_log($dst, format_args!($($arg)+))
    };
}

/// Write to the default destination (`LOG_DST`)
#[macro_export]
macro_rules! log {
    ($($arg:tt)+) => {
        $crate::unum_log!($crate::LOG_DST, $($arg)+)
    };
}

/// Write to the debug destination (`LOG_DBG_DST`), debug builds only
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! log_dbg {
    ($($arg:tt)+) => {
        $crate::unum_log!($crate::LOG_DBG_DST, $($arg)+)
    };
}

/// Expands to nothing outside debug builds
#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! log_dbg {
    ($($arg:tt)+) => {
        ()
    };
}
