//! Tracing setup for the logger's own diagnostics
//!
//! The logger reports its internal problems (sink open failures, rotation
//! errors) as `tracing` events besides the fallback destination. Hosts that
//! already install a subscriber get them for free; the `unum-log` binary
//! installs this one.

/// Initialize internal tracing on stderr
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(tracing_subscriber::EnvFilter::new(level))
        .try_init();
}
