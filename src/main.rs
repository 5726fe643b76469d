//! unum-log - write messages to agent log destinations
//!
//! Usage:
//!   unum-log "message"                    Log to the agent log (unum)
//!   unum-log --dst http "message"         Log to another destination
//!   some-cmd | unum-log --dst monitor     Log every stdin line
//!   unum-log -c log.toml --disable http   Use a config, mute destinations

mod cli;

use clap::Parser;
use std::io::BufRead;
use std::process::ExitCode;
use unum_log::{diagnostics, global, LogConfig, Result};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    diagnostics::init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("unum-log: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` when the selected destination could not be opened
fn run(cli: &cli::Cli) -> Result<bool> {
    let config = match &cli.config {
        Some(path) => LogConfig::load(path)?,
        None => LogConfig::default(),
    };

    let logger = global::install(&config)?;
    logger.set_disabled_log_dst_mask(cli.disabled_mask());

    let report = logger.init(cli.level);
    if let Err(e) = report.status() {
        tracing::warn!("{}", e);
    }
    let target = logger.resolve(cli.dst);
    let usable = !logger.registry().entry(target).is_failed();

    match cli.message_text() {
        Some(text) => logger.log_str(cli.dst, &text),
        None => {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => logger.log_str(cli.dst, &line),
                    Err(_) => break,
                }
            }
        }
    }

    logger.shutdown();
    Ok(usable)
}
