//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::Parser;
use std::path::PathBuf;
use unum_log::{DstMask, LogDst, LogError};

// =============================================================================
// CLI Definition
// =============================================================================

/// Write messages to an agent log destination
#[derive(Parser, Debug)]
#[command(name = "unum-log")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output of the logger itself
    #[arg(short, long)]
    pub verbose: bool,

    /// Logger config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Init level (1 also opens debug destinations)
    #[arg(short, long, default_value_t = 0)]
    pub level: u32,

    /// Destination to write to
    #[arg(short, long, value_name = "NAME", default_value = "unum", value_parser = parse_dst)]
    pub dst: LogDst,

    /// Destinations to disable (comma separated)
    #[arg(long, value_name = "NAME", value_delimiter = ',', value_parser = parse_dst)]
    pub disable: Vec<LogDst>,

    /// Message words; stdin lines are logged when empty
    pub message: Vec<String>,
}

fn parse_dst(s: &str) -> Result<LogDst, String> {
    s.parse().map_err(|e: LogError| e.to_string())
}

impl Cli {
    /// Mask built from `--disable`
    pub fn disabled_mask(&self) -> DstMask {
        DstMask::of(&self.disable)
    }

    /// Message from the trailing words, if any
    pub fn message_text(&self) -> Option<String> {
        if self.message.is_empty() {
            None
        } else {
            Some(self.message.join(" "))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
