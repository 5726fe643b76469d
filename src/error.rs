//! Centralized error types for the logger
//!
//! All logger errors are represented by the `LogError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, LogError>`.
//!
//! None of these ever reach a `Logger::log` caller: the write path absorbs
//! every failure. They surface from init, configuration and the override
//! controls only.

use std::fmt;
use std::path::PathBuf;

/// All logger errors
#[derive(Debug)]
pub enum LogError {
    // === IO ===
    /// File system operation failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Config ===
    /// Failed to read the config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid TOML for `LogConfig`
    ConfigParse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Destinations ===
    /// Raw destination index out of the enumeration range
    InvalidDestination { index: usize },
    /// Destination name not known to this build
    UnknownDestination { name: String },
    /// Destination entry is in the failed state
    DestinationFailed { name: &'static str },

    // === Global ===
    /// A process logger has already been installed
    AlreadyInstalled,
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } | Self::ConfigRead { source, .. } => Some(source),
            Self::ConfigParse { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "IO error: {}: {}", path.display(), source),
            Self::ConfigRead { path, .. } => {
                write!(f, "Cannot read config file: {}", path.display())
            }
            Self::ConfigParse { path, source } => {
                write!(f, "Invalid config file {}: {}", path.display(), source)
            }
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::InvalidDestination { index } => {
                write!(f, "Log destination index {} out of range", index)
            }
            Self::UnknownDestination { name } => write!(f, "Unknown log destination: {}", name),
            Self::DestinationFailed { name } => {
                write!(f, "Log destination {} failed to initialize", name)
            }
            Self::AlreadyInstalled => write!(f, "Process logger is already installed"),
        }
    }
}

/// Alias for Result with LogError
pub type Result<T> = std::result::Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_exposes_source() {
        let err = LogError::Io {
            path: PathBuf::from("/var/log/unum.log"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/var/log/unum.log"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = LogError::ConfigValidation {
            field: "cut_size",
            reason: "exceeds max_size".into(),
        };
        assert_eq!(err.to_string(), "Invalid cut_size: exceeds max_size");
        assert!(err.source().is_none());
    }
}
