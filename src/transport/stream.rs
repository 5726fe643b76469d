//! Stdout output
//!
//! Never rotated; the size is only the count of bytes written by this
//! process.

use super::Output;
use std::io::{self, Write};

#[derive(Debug, Default)]
pub struct StdoutOutput {
    written: u64,
}

impl StdoutOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Output for StdoutOutput {
    fn append(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(buf)?;
        out.flush()?;
        self.written = self.written.saturating_add(buf.len() as u64);
        Ok(())
    }

    fn size(&self) -> u64 {
        self.written
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}
