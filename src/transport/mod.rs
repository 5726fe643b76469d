//! Sink transport abstraction
//!
//! Separates the platform I/O from the logger core:
//! - **Transport**: how an output is opened and how its files are moved
//!   around (open, rename, remove, cut)
//! - **Output**: an open sink the dispatch layer appends formatted lines to
//!
//! The registry, rotation engine and dispatch layer only ever talk to these
//! two traits. `PlatformTransport` is the real implementation; tests plug in
//! wrappers that inject failures.
//!
//! # Durability
//!
//! Outputs are unbuffered: every `append` is a single write to the
//! underlying descriptor, so a crash never loses a line that `append`
//! reported as written.

pub mod file;
pub mod stream;

pub use file::FileOutput;
pub use stream::StdoutOutput;

use crate::config::SinkKind;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

/// An open log sink
pub trait Output: Send {
    /// Append one complete, already formatted record
    fn append(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Current size of the sink in bytes
    fn size(&self) -> u64;

    /// Push pending data to the OS
    fn flush(&mut self) -> io::Result<()>;
}

/// Platform adapter used by the logger core
///
/// # Lifecycle
///
/// 1. `open()` is called once per entry at init, and again after rotation
/// 2. `rename()`/`remove()`/`exists()` drive the numbered backup shift
/// 3. `cut()` implements the in-place truncation variant
///
/// Implementations must be usable from several threads at once; the core
/// serializes calls touching the same entry.
pub trait Transport: Send + Sync + 'static {
    /// Open (create/append for files) the output of a sink
    fn open(&self, sink: &SinkKind) -> io::Result<Box<dyn Output>>;

    /// Whether a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Rename a file, replacing the destination if it exists
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Delete a file
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Keep only the tail of a file, at most `keep` bytes. Returns the new size.
    fn cut(&self, path: &Path, keep: u64) -> io::Result<u64>;
}

/// Transport backed by `std::fs` and the process stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformTransport;

impl Transport for PlatformTransport {
    fn open(&self, sink: &SinkKind) -> io::Result<Box<dyn Output>> {
        match sink {
            SinkKind::Stdout => Ok(Box::new(StdoutOutput::new())),
            SinkKind::Console { device } => {
                // Devices are never created.
                let file = OpenOptions::new().append(true).open(device)?;
                Ok(Box::new(FileOutput::new(file, 0)))
            }
            SinkKind::File { path } => Ok(Box::new(FileOutput::open_append(path)?)),
            SinkKind::Discard => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "discard sink has no output",
            )),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn cut(&self, path: &Path, keep: u64) -> io::Result<u64> {
        file::cut_to_tail(path, keep)
    }
}

/// Platform flag bits for a sink kind (high 16 bits of the entry flags)
pub fn platform_flags(sink: &SinkKind) -> u32 {
    use crate::constants::{LOG_FLAG_FILE, LOG_FLAG_STDOUT, LOG_FLAG_TTY};
    match sink {
        SinkKind::File { .. } => LOG_FLAG_FILE,
        SinkKind::Stdout => LOG_FLAG_STDOUT,
        SinkKind::Console { .. } => LOG_FLAG_TTY,
        SinkKind::Discard => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{LOG_FLAG_FILE, LOG_FLAG_PLATFORM_MASK};

    #[test]
    fn test_open_file_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        let sink = SinkKind::File { path: path.clone() };

        let mut out = PlatformTransport.open(&sink).unwrap();
        out.append(b"one\n").unwrap();
        drop(out);
        let mut out = PlatformTransport.open(&sink).unwrap();
        assert_eq!(out.size(), 4);
        out.append(b"two\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_open_file_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SinkKind::File {
            path: dir.path().join("missing").join("a.log"),
        };
        assert!(PlatformTransport.open(&sink).is_err());
    }

    #[test]
    fn test_console_device_not_created() {
        let dir = tempfile::tempdir().unwrap();
        let device = dir.path().join("ttyS9");
        let sink = SinkKind::Console {
            device: device.clone(),
        };
        assert!(PlatformTransport.open(&sink).is_err());
        assert!(!device.exists());
    }

    #[test]
    fn test_discard_never_opens() {
        assert!(PlatformTransport.open(&SinkKind::Discard).is_err());
    }

    #[test]
    fn test_platform_flags_stay_in_high_bits() {
        let sink = SinkKind::File {
            path: "x.log".into(),
        };
        assert_eq!(platform_flags(&sink), LOG_FLAG_FILE);
        assert_eq!(platform_flags(&sink) & !LOG_FLAG_PLATFORM_MASK, 0);
        assert_eq!(platform_flags(&SinkKind::Discard), 0);
    }
}
