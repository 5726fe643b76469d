//! Crate-wide constants
//!
//! Flag bits, size defaults and rotation bounds shared by the registry,
//! the rotation engine and the configuration layer.

// =============================================================================
// Entry flags (low 16 bits are common, high 16 bits are platform specific)
// =============================================================================

/// The entry has been initialized
pub const LOG_FLAG_INIT_DONE: u32 = 0x0001;

/// The entry initialization has failed (writes are dropped)
pub const LOG_FLAG_INIT_FAIL: u32 = 0x0002;

/// The entry requires mutex protection (serves multiple threads)
pub const LOG_FLAG_MUTEX: u32 = 0x0004;

/// Log the startup banner right after the entry is opened
pub const LOG_FLAG_INIT_MSG: u32 = 0x0008;

/// Sink is a regular file that can be rotated
pub const LOG_FLAG_FILE: u32 = 0x0001_0000;

/// Sink is the process stdout
pub const LOG_FLAG_STDOUT: u32 = 0x0002_0000;

/// Sink is a raw terminal/serial device
pub const LOG_FLAG_TTY: u32 = 0x0004_0000;

/// Mask of the platform specific flag bits
pub const LOG_FLAG_PLATFORM_MASK: u32 = 0xFFFF_0000;

// =============================================================================
// Paths
// =============================================================================

/// Max log file pathname length the logger will deal with
pub const LOG_MAX_PATH: usize = 128;

/// Default directory for relative log file names
pub const DEFAULT_LOG_DIR: &str = "/var/log";

/// Default serial console device
pub const DEFAULT_CONSOLE_DEVICE: &str = "/dev/console";

// =============================================================================
// Rotation
// =============================================================================

/// Highest backup number removed by the stale-backup cleanup at init.
///
/// If the retention count shrinks from X to Y between runs, backups
/// numbered Y..=LOG_ROTATE_CLEANUP_MAX are deleted.
pub const LOG_ROTATE_CLEANUP_MAX: u32 = 9;

/// Upper bound for both the retention count and the cleanup bound
pub const LOG_ROTATE_BACKUP_LIMIT: u32 = 64;

// =============================================================================
// Init levels
// =============================================================================

/// Regular init level, opens every non-debug destination
pub const LOG_LEVEL_DEFAULT: u32 = 0;

/// Debug init level, additionally opens debug-only destinations
pub const LOG_LEVEL_DEBUG: u32 = 1;

// =============================================================================
// Sizes
// =============================================================================

/// 1 KiB
pub const KIB: u64 = 1024;
