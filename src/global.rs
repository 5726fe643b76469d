//! Process-wide logger
//!
//! One `Logger` per process, installed explicitly with `install()` or
//! lazily with the default configuration on first use. The free functions
//! here mirror the `Logger` methods for call sites that do not carry a
//! logger reference; the `unum_log!`, `log!` and `log_dbg!` macros route
//! through them.
//!
//! Libraries and tests that need isolated registries should build their own
//! `Logger` instead.

use crate::config::LogConfig;
use crate::destination::{DstMask, LogDst};
use crate::dispatch::Logger;
use crate::error::{LogError, Result};
use crate::registry::InitReport;
use std::fmt;
use std::sync::OnceLock;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install the process logger built from `config`
pub fn install(config: &LogConfig) -> Result<&'static Logger> {
    install_logger(Logger::new(config))
}

/// Install an already built process logger
pub fn install_logger(logger: Logger) -> Result<&'static Logger> {
    LOGGER
        .set(logger)
        .map_err(|_| LogError::AlreadyInstalled)?;
    Ok(self::logger())
}

/// The process logger, installing the default configuration if needed
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(&LogConfig::default()))
}

/// Initialize the process logger.
///
/// Never aborts: destinations that fail are listed in the report, and
/// `InitReport::status()` turns that into an error for callers that care.
pub fn log_init(level: u32) -> InitReport {
    logger().init(level)
}

/// Write to `dst` through the process logger
#[inline]
pub fn unum_log(dst: LogDst, args: fmt::Arguments<'_>) {
    logger().log(dst, args);
}

pub fn set_proc_log_dst(dst: LogDst) -> Result<()> {
    logger().set_proc_log_dst(dst)
}

pub fn clear_proc_log_dst() {
    logger().clear_proc_log_dst();
}

pub fn set_disabled_log_dst_mask(mask: impl Into<DstMask>) {
    logger().set_disabled_log_dst_mask(mask);
}

/// Flush and close the process logger's destinations
pub fn shutdown() {
    if let Some(logger) = LOGGER.get() {
        logger.shutdown();
    }
}
