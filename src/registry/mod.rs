//! Destination registry
//!
//! Fixed table with one `Entry` per `LogDst`, indexed by the destination
//! ordinal. The table is built once from a `LogConfig` and never changes
//! shape; only each entry's flags and handle are mutated afterwards.
//!
//! `init(level)` brings every eligible entry to a usable (or failed) state:
//! - entries already initialized are left untouched (staged startup)
//! - entries whose `min_level` is above `level` are skipped for now
//! - configuration errors and open failures mark only that entry failed

mod entry;

pub use entry::{Entry, Guard, SinkState};

use crate::config::LogConfig;
use crate::constants::{LOG_FLAG_INIT_DONE, LOG_FLAG_INIT_FAIL, LOG_FLAG_INIT_MSG};
use crate::destination::{DstMask, LogDst};
use crate::error::{LogError, Result};
use crate::record::format_record;
use crate::rotation::{self, RotationPolicy};
use crate::transport::Transport;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one `Registry::init` call
///
/// Only lists entries processed by this call; entries initialized by an
/// earlier call appear in none of the sets.
#[derive(Debug, Default)]
pub struct InitReport {
    /// Level the init ran with
    pub level: u32,
    /// Entries opened successfully
    pub opened: DstMask,
    /// Entries skipped because of their `min_level`
    pub skipped: DstMask,
    /// Entries that failed, with the reason
    pub failed: Vec<(LogDst, LogError)>,
}

impl InitReport {
    /// Mask of failed entries
    pub fn failed_mask(&self) -> DstMask {
        DstMask::of(&self.failed.iter().map(|(dst, _)| *dst).collect::<Vec<_>>())
    }

    /// `Ok` when nothing failed, otherwise the first failed destination
    pub fn status(&self) -> Result<()> {
        match self.failed.first() {
            Some((dst, _)) => Err(LogError::DestinationFailed { name: dst.name() }),
            None => Ok(()),
        }
    }
}

/// The destination table
pub struct Registry {
    entries: [Entry; LogDst::COUNT],
    transport: Arc<dyn Transport>,
    cleanup_max: u32,
    banner: String,
    init_lock: Mutex<()>,
}

impl Registry {
    pub fn new(config: &LogConfig, transport: Arc<dyn Transport>) -> Self {
        let entries = std::array::from_fn(|i| {
            let dst = LogDst::ALL[i];
            Entry::new(dst, config.resolve(dst))
        });
        Self {
            entries,
            transport,
            cleanup_max: config.cleanup_max,
            banner: config.banner_text(),
            init_lock: Mutex::new(()),
        }
    }

    #[inline]
    pub fn entry(&self, dst: LogDst) -> &Entry {
        &self.entries[dst.index()]
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Mask of entries in the failed state
    pub fn failed_mask(&self) -> DstMask {
        self.entries
            .iter()
            .filter(|e| e.is_failed())
            .fold(DstMask::EMPTY, |mask, e| mask.with(e.dst()))
    }

    /// Open every eligible, not yet initialized entry
    pub fn init(&self, level: u32) -> InitReport {
        let _serial = self.init_lock.lock();
        let mut report = InitReport {
            level,
            ..InitReport::default()
        };

        for entry in &self.entries {
            if entry.is_initialized() {
                continue;
            }
            let dst = entry.dst();
            if dst == LogDst::Drop {
                entry.set_flags(LOG_FLAG_INIT_DONE);
                continue;
            }
            if entry.config().min_level > level {
                report.skipped = report.skipped.with(dst);
                continue;
            }
            match self.open_entry(entry, level) {
                Ok(()) => {
                    entry.set_flags(LOG_FLAG_INIT_DONE);
                    report.opened = report.opened.with(dst);
                    debug!(destination = %dst, "log destination opened");
                }
                Err(e) => {
                    entry.set_flags(LOG_FLAG_INIT_DONE | LOG_FLAG_INIT_FAIL);
                    warn!(destination = %dst, error = %e, "log destination failed");
                    report.failed.push((dst, e));
                }
            }
        }
        report
    }

    fn open_entry(&self, entry: &Entry, level: u32) -> Result<()> {
        let config = entry.config();
        config.validate()?;

        if let Some(path) = config.sink.file_path() {
            if entry.policy() != RotationPolicy::Never {
                let retain = entry.policy().retained();
                match rotation::cleanup_stale(self.transport(), path, retain, self.cleanup_max) {
                    Ok(0) => {}
                    Ok(n) => debug!(path = %path.display(), removed = n, "stale backups removed"),
                    Err(e) => warn!(error = %e, "stale backup cleanup incomplete"),
                }
            }
        }

        let mut output = self.transport.open(&config.sink).map_err(|e| LogError::Io {
            path: config
                .sink
                .file_path()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| entry.dst().name().into()),
            source: e,
        })?;

        if entry.flags() & LOG_FLAG_INIT_MSG != 0 {
            let line = format_record(format_args!(
                "{} (pid {}, log level {})",
                self.banner,
                std::process::id(),
                level
            ));
            let _ = output.append(line.as_bytes());
        }

        entry.lock().output = Some(output);
        Ok(())
    }

    /// Flush and close every handle
    pub fn close_all(&self) {
        for entry in &self.entries {
            if let Some(mut out) = entry.lock().output.take() {
                let _ = out.flush();
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DestinationOverride, SinkKindSetting};
    use crate::constants::LOG_LEVEL_DEFAULT;
    use crate::rotation::backup_path;
    use crate::transport::PlatformTransport;
    use std::fs;
    use std::path::Path;

    /// Config with stdout/console silenced into files under `dir`
    fn quiet_config(dir: &Path) -> LogConfig {
        let mut config = LogConfig::with_log_dir(dir);
        for dst in [LogDst::Stdout, LogDst::Console] {
            config.set_override(
                dst,
                DestinationOverride {
                    kind: Some(SinkKindSetting::File),
                    path: Some(format!("{}.out", dst).into()),
                    ..Default::default()
                },
            );
        }
        config
    }

    fn registry(config: &LogConfig) -> Registry {
        Registry::new(config, Arc::new(PlatformTransport))
    }

    #[test]
    fn test_table_is_indexed_by_ordinal() {
        let reg = registry(&LogConfig::default());
        for dst in LogDst::ALL {
            assert_eq!(reg.entry(*dst).dst(), *dst);
        }
        assert_eq!(reg.entries().count(), LogDst::COUNT);
    }

    #[test]
    fn test_init_opens_files_and_writes_banner() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&quiet_config(dir.path()));
        let report = reg.init(LOG_LEVEL_DEFAULT);

        assert!(report.status().is_ok(), "{:?}", report.failed);
        assert!(report.opened.contains(LogDst::Unum));
        assert!(reg.entry(LogDst::Unum).is_ready());
        assert!(reg.entry(LogDst::Drop).is_ready());
        assert!(!reg.entry(LogDst::Drop).is_open());

        let unum = fs::read_to_string(dir.path().join("unum.log")).unwrap();
        assert!(unum.contains("started"));
        assert_eq!(unum.lines().count(), 1);
        // http does not log the banner
        assert_eq!(fs::read_to_string(dir.path().join("http.log")).unwrap(), "");
    }

    #[test]
    fn test_init_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&quiet_config(dir.path()));
        reg.init(LOG_LEVEL_DEFAULT);
        let second = reg.init(LOG_LEVEL_DEFAULT);

        assert!(second.opened.iter().next().is_none());
        assert!(second.failed.is_empty());
        let unum = fs::read_to_string(dir.path().join("unum.log")).unwrap();
        assert_eq!(unum.lines().count(), 1, "banner written twice");
    }

    #[test]
    fn test_failed_entry_does_not_fail_others() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quiet_config(dir.path());
        config.override_mut(LogDst::Http).path = Some("missing/dir/http.log".into());
        let reg = registry(&config);
        let report = reg.init(LOG_LEVEL_DEFAULT);

        assert_eq!(report.failed_mask(), DstMask::of(&[LogDst::Http]));
        assert!(report.status().is_err());
        assert!(reg.entry(LogDst::Http).is_failed());
        assert!(reg.entry(LogDst::Http).is_initialized());
        assert!(reg.entry(LogDst::Unum).is_ready());
        assert_eq!(reg.failed_mask(), DstMask::of(&[LogDst::Http]));
    }

    #[test]
    fn test_misconfigured_thresholds_fail_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quiet_config(dir.path());
        let over = config.override_mut(LogDst::Monitor);
        over.max_size = Some(100);
        over.cut_size = Some(500);
        let reg = registry(&config);
        let report = reg.init(LOG_LEVEL_DEFAULT);

        assert!(matches!(
            report.failed.as_slice(),
            [(LogDst::Monitor, LogError::ConfigValidation { .. })]
        ));
        assert!(!dir.path().join("monitor.log").exists());
    }

    #[test]
    fn test_level_gates_entries_until_later_init() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quiet_config(dir.path());
        config.override_mut(LogDst::Http).min_level = Some(3);
        let reg = registry(&config);

        let first = reg.init(1);
        assert!(first.skipped.contains(LogDst::Http));
        assert!(!reg.entry(LogDst::Http).is_initialized());

        let second = reg.init(3);
        assert_eq!(second.opened, DstMask::of(&[LogDst::Http]));
        assert!(reg.entry(LogDst::Http).is_ready());
    }

    #[test]
    fn test_init_cleans_stale_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unum.log");
        for n in 0..5 {
            fs::write(backup_path(&path, n), "old").unwrap();
        }
        let reg = registry(&quiet_config(dir.path()));
        reg.init(LOG_LEVEL_DEFAULT);

        // unum keeps 2 backups by default
        assert!(backup_path(&path, 0).exists());
        assert!(backup_path(&path, 1).exists());
        for n in 2..5 {
            assert!(!backup_path(&path, n).exists());
        }
    }

    #[test]
    fn test_close_all_drops_handles() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&quiet_config(dir.path()));
        reg.init(LOG_LEVEL_DEFAULT);
        assert!(reg.entry(LogDst::Unum).is_open());
        reg.close_all();
        assert!(!reg.entry(LogDst::Unum).is_open());
    }
}
