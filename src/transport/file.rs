//! File output and the in-place cut used by non-numbered rotation.

use super::Output;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Unbuffered append-only file output with a tracked size
#[derive(Debug)]
pub struct FileOutput {
    file: File,
    size: u64,
}

impl FileOutput {
    pub fn new(file: File, size: u64) -> Self {
        Self { file, size }
    }

    /// Open `path` for appending, creating it if needed
    pub fn open_append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self::new(file, size))
    }
}

impl Output for FileOutput {
    fn append(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)?;
        self.size = self.size.saturating_add(buf.len() as u64);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Truncate `path` in place to its last `keep` bytes.
///
/// When the kept tail starts in the middle of a line, the partial line is
/// dropped too, so the file keeps starting on a record boundary. The result
/// is always a suffix of the previous content. Returns the new size.
pub fn cut_to_tail(path: &Path, keep: u64) -> io::Result<u64> {
    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    let len = file.metadata()?.len();
    if len <= keep {
        return Ok(len);
    }

    // Read one byte before the tail to know whether it starts a line.
    let from = len - keep - 1;
    file.seek(SeekFrom::Start(from))?;
    let mut buf = Vec::with_capacity(keep as usize + 1);
    file.read_to_end(&mut buf)?;

    let start = if buf.first() == Some(&b'\n') {
        1
    } else {
        buf.iter()
            .skip(1)
            .position(|b| *b == b'\n')
            .map_or(1, |i| i + 2)
    };
    let tail = buf.get(start..).unwrap_or_default();

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(tail)?;
    file.flush()?;
    Ok(tail.len() as u64)
}
