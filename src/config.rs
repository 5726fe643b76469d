//! Configuration management
//!
//! The logger config is a TOML file deserialized into `LogConfig`. Every
//! field is optional: built-in per-destination defaults are merged with the
//! `[destinations.<name>]` overrides by `LogConfig::resolve()`.
//!
//! ```toml
//! log_dir = "/tmp/unum"
//! cleanup_max = 9
//!
//! [destinations.http]
//! max_size = 131072
//! cut_size = 65536
//! retain = 3
//! ```
//!
//! Per-entry validation (`cut_size > max_size`, `retain` above the backup limit,
//! missing or too long paths) is deferred to `Registry::init`, where it fails
//! only the offending entry.

use crate::constants::{
    DEFAULT_CONSOLE_DEVICE, DEFAULT_LOG_DIR, KIB, LOG_LEVEL_DEFAULT, LOG_MAX_PATH,
    LOG_ROTATE_BACKUP_LIMIT, LOG_ROTATE_CLEANUP_MAX,
};
#[cfg(feature = "debug-log")]
use crate::constants::LOG_LEVEL_DEBUG;
use crate::destination::LogDst;
use crate::error::{LogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// =============================================================================
// Sink kinds
// =============================================================================

/// Sink kind as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKindSetting {
    File,
    Stdout,
    Console,
}

/// Resolved sink the transport opens for an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkKind {
    /// Process stdout
    Stdout,
    /// Raw console/serial device, opened for writing, never created
    Console { device: PathBuf },
    /// Rotating regular file
    File { path: PathBuf },
    /// Discards everything, never opened
    Discard,
}

impl SinkKind {
    /// File path for rotating sinks
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::File { path } => Some(path),
            _ => None,
        }
    }
}

// =============================================================================
// Destination configuration
// =============================================================================

/// Per-destination overrides from the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DestinationOverride {
    /// Sink kind (file, stdout, console)
    pub kind: Option<SinkKindSetting>,
    /// File path (relative paths are joined to `log_dir`)
    pub path: Option<PathBuf>,
    /// Rotate when the live file reaches this many bytes (0 = never)
    pub max_size: Option<u64>,
    /// Size the live file is cut down to when no backups are kept
    pub cut_size: Option<u64>,
    /// Numbered backups kept in addition to the live file
    pub retain: Option<u32>,
    /// Serialize writers with a mutex
    pub guarded: Option<bool>,
    /// Write the startup banner after opening
    pub init_banner: Option<bool>,
    /// Lowest init level that opens this destination
    pub min_level: Option<u32>,
}

/// Fully resolved configuration of one registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationConfig {
    pub sink: SinkKind,
    pub max_size: u64,
    pub cut_size: u64,
    pub retain: u32,
    pub guarded: bool,
    pub init_banner: bool,
    pub min_level: u32,
}

impl DestinationConfig {
    fn file(path: PathBuf, max_size: u64, cut_size: u64, retain: u32) -> Self {
        Self {
            sink: SinkKind::File { path },
            max_size,
            cut_size,
            retain,
            guarded: true,
            init_banner: false,
            min_level: LOG_LEVEL_DEFAULT,
        }
    }

    fn stream(sink: SinkKind) -> Self {
        Self {
            sink,
            max_size: 0,
            cut_size: 0,
            retain: 0,
            guarded: true,
            init_banner: false,
            min_level: LOG_LEVEL_DEFAULT,
        }
    }

    /// Whether this entry rotates at all
    pub fn rotates(&self) -> bool {
        self.max_size > 0 && self.sink.file_path().is_some()
    }

    /// Check thresholds and the file name template
    pub fn validate(&self) -> Result<()> {
        if self.max_size > 0 && self.cut_size > self.max_size {
            return Err(LogError::ConfigValidation {
                field: "cut_size",
                reason: format!(
                    "cut_size {} exceeds max_size {}",
                    self.cut_size, self.max_size
                ),
            });
        }
        if self.retain > LOG_ROTATE_BACKUP_LIMIT {
            return Err(LogError::ConfigValidation {
                field: "retain",
                reason: format!(
                    "{} backups exceeds the limit of {}",
                    self.retain, LOG_ROTATE_BACKUP_LIMIT
                ),
            });
        }
        if let SinkKind::File { path } | SinkKind::Console { device: path } = &self.sink {
            let len = path.as_os_str().len();
            if len == 0 {
                return Err(LogError::ConfigValidation {
                    field: "path",
                    reason: "empty path".into(),
                });
            }
            if len > LOG_MAX_PATH {
                return Err(LogError::ConfigValidation {
                    field: "path",
                    reason: format!("{} bytes exceeds the {} byte limit", len, LOG_MAX_PATH),
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Logger configuration
// =============================================================================

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Directory for relative log file names
    pub log_dir: PathBuf,
    /// Serial console device
    pub console_device: PathBuf,
    /// Highest stale backup number removed at init
    pub cleanup_max: u32,
    /// Startup banner text (defaults to crate name and version)
    pub banner: Option<String>,
    /// Overrides keyed by destination name
    pub destinations: BTreeMap<String, DestinationOverride>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            console_device: PathBuf::from(DEFAULT_CONSOLE_DEVICE),
            cleanup_max: LOG_ROTATE_CLEANUP_MAX,
            banner: None,
            destinations: BTreeMap::new(),
        }
    }
}

impl LogConfig {
    /// Default config with every file destination placed under `dir`
    pub fn with_log_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Load and check a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LogError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| LogError::ConfigParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        config.check_names()?;
        Ok(config)
    }

    /// Parse and check config text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| LogError::ConfigParse {
            path: PathBuf::from("<inline>"),
            source: Box::new(e),
        })?;
        config.check_names()?;
        Ok(config)
    }

    /// Set (replace) the override of one destination
    pub fn set_override(&mut self, dst: LogDst, over: DestinationOverride) -> &mut Self {
        self.destinations.insert(dst.name().to_string(), over);
        self
    }

    /// Override of one destination, created empty if absent
    pub fn override_mut(&mut self, dst: LogDst) -> &mut DestinationOverride {
        self.destinations.entry(dst.name().to_string()).or_default()
    }

    fn check_names(&self) -> Result<()> {
        for name in self.destinations.keys() {
            let _: LogDst = name.parse()?;
        }
        if self.cleanup_max > LOG_ROTATE_BACKUP_LIMIT {
            return Err(LogError::ConfigValidation {
                field: "cleanup_max",
                reason: format!(
                    "{} is above {}",
                    self.cleanup_max, LOG_ROTATE_BACKUP_LIMIT
                ),
            });
        }
        Ok(())
    }

    /// Built-in configuration of a destination
    pub fn default_for(&self, dst: LogDst) -> DestinationConfig {
        let file = |name: &str| self.log_dir.join(name);
        match dst {
            LogDst::Stdout => DestinationConfig::stream(SinkKind::Stdout),
            LogDst::Console => DestinationConfig::stream(SinkKind::Console {
                device: self.console_device.clone(),
            }),
            LogDst::Unum => DestinationConfig {
                init_banner: true,
                ..DestinationConfig::file(file("unum.log"), 256 * KIB, 128 * KIB, 2)
            },
            LogDst::Http => DestinationConfig::file(file("http.log"), 64 * KIB, 32 * KIB, 1),
            LogDst::Monitor => DestinationConfig {
                guarded: false,
                init_banner: true,
                ..DestinationConfig::file(file("monitor.log"), 32 * KIB, 16 * KIB, 0)
            },
            #[cfg(feature = "fw-updater")]
            LogDst::Update => DestinationConfig {
                init_banner: true,
                ..DestinationConfig::file(file("fw_update.log"), 64 * KIB, 32 * KIB, 1)
            },
            #[cfg(feature = "fw-updater")]
            LogDst::UpdateMonitor => DestinationConfig {
                guarded: false,
                init_banner: true,
                ..DestinationConfig::file(file("fw_update_monitor.log"), 32 * KIB, 16 * KIB, 0)
            },
            #[cfg(feature = "support")]
            LogDst::Support => DestinationConfig {
                init_banner: true,
                ..DestinationConfig::file(file("support.log"), 64 * KIB, 32 * KIB, 1)
            },
            #[cfg(feature = "debug-log")]
            LogDst::Debug => DestinationConfig {
                min_level: LOG_LEVEL_DEBUG,
                ..DestinationConfig::file(file("debug.log"), 512 * KIB, 256 * KIB, 1)
            },
            LogDst::Drop => DestinationConfig {
                guarded: false,
                ..DestinationConfig::stream(SinkKind::Discard)
            },
        }
    }

    /// Built-in defaults merged with the config file override
    pub fn resolve(&self, dst: LogDst) -> DestinationConfig {
        let mut cfg = self.default_for(dst);
        // The drop sentinel is not configurable.
        if dst == LogDst::Drop {
            return cfg;
        }
        let Some(over) = self.destinations.get(dst.name()) else {
            return cfg;
        };

        let path = over.path.as_ref().map(|p| self.log_dir.join(p));
        match over.kind {
            Some(SinkKindSetting::Stdout) => cfg.sink = SinkKind::Stdout,
            Some(SinkKindSetting::Console) => {
                cfg.sink = SinkKind::Console {
                    device: path.unwrap_or_else(|| self.console_device.clone()),
                }
            }
            Some(SinkKindSetting::File) => {
                cfg.sink = SinkKind::File {
                    path: path
                        .or_else(|| cfg.sink.file_path().map(Path::to_path_buf))
                        .unwrap_or_default(),
                }
            }
            None => {
                if let Some(path) = path {
                    match &mut cfg.sink {
                        SinkKind::File { path: p } | SinkKind::Console { device: p } => *p = path,
                        _ => {}
                    }
                }
            }
        }
        if let Some(v) = over.max_size {
            cfg.max_size = v;
        }
        if let Some(v) = over.cut_size {
            cfg.cut_size = v;
        }
        if let Some(v) = over.retain {
            cfg.retain = v;
        }
        if let Some(v) = over.guarded {
            cfg.guarded = v;
        }
        if let Some(v) = over.init_banner {
            cfg.init_banner = v;
        }
        if let Some(v) = over.min_level {
            cfg.min_level = v;
        }
        cfg
    }

    /// Startup banner text
    pub fn banner_text(&self) -> String {
        self.banner.clone().unwrap_or_else(|| {
            format!(
                "{} {} started",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
