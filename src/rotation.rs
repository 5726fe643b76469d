//! Rotation engine
//!
//! Bounds the size of a file destination once it reaches `max_size`:
//!
//! - **Numbered** (`retain >= 1`): close, shift `T.(i-1)` to `T.i` for
//!   `i = retain-1 ..= 1`, rename `T` to `T.0`, reopen a fresh `T`. The
//!   oldest backup is overwritten by the shift, so at most `retain` backups
//!   exist.
//! - **Cut** (`retain == 0`): close, keep only the last `cut_size` bytes of
//!   `T` in place, reopen. No second file is ever created.
//!
//! Every step is attempted even if an earlier one failed; the handle is left
//! in whatever state the last successful step produced and the first error
//! is returned for the caller to report.

use crate::config::{DestinationConfig, SinkKind};
use crate::error::{LogError, Result};
use crate::transport::{Output, Transport};
use std::path::{Path, PathBuf};

/// How a destination bounds its live file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Not a file or `max_size == 0`
    Never,
    /// Keep `retain` numbered backups
    Numbered { max_size: u64, retain: u32 },
    /// Truncate in place to the last `cut_size` bytes
    Cut { max_size: u64, cut_size: u64 },
}

impl RotationPolicy {
    pub fn for_config(cfg: &DestinationConfig) -> Self {
        if !cfg.rotates() {
            Self::Never
        } else if cfg.retain == 0 {
            Self::Cut {
                max_size: cfg.max_size,
                cut_size: cfg.cut_size,
            }
        } else {
            Self::Numbered {
                max_size: cfg.max_size,
                retain: cfg.retain,
            }
        }
    }

    /// Whether a live file of `size` bytes must be rotated before writing
    #[inline]
    pub fn is_due(&self, size: u64) -> bool {
        match *self {
            Self::Never => false,
            Self::Numbered { max_size, .. } | Self::Cut { max_size, .. } => size >= max_size,
        }
    }

    /// Numbered backups this policy keeps
    pub fn retained(&self) -> u32 {
        match *self {
            Self::Numbered { retain, .. } => retain,
            _ => 0,
        }
    }
}

/// Name of backup `n` of `path` (`<path>.<n>`)
pub fn backup_path(path: &Path, n: u32) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", n));
    PathBuf::from(name)
}

fn keep_first(first: &mut Option<LogError>, path: &Path, source: std::io::Error) {
    if first.is_none() {
        *first = Some(LogError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
}

/// Rotate the live file of a destination.
///
/// `output` is closed first and replaced by the reopened live file, or left
/// `None` when reopening fails.
pub fn rotate(
    transport: &dyn Transport,
    path: &Path,
    policy: RotationPolicy,
    output: &mut Option<Box<dyn Output>>,
) -> Result<()> {
    if let Some(mut out) = output.take() {
        let _ = out.flush();
    }

    let mut first = None;
    match policy {
        RotationPolicy::Never => {}
        RotationPolicy::Cut { cut_size, .. } => {
            if let Err(e) = transport.cut(path, cut_size) {
                keep_first(&mut first, path, e);
            }
        }
        RotationPolicy::Numbered { retain, .. } => {
            for i in (1..retain).rev() {
                let from = backup_path(path, i - 1);
                if transport.exists(&from) {
                    if let Err(e) = transport.rename(&from, &backup_path(path, i)) {
                        keep_first(&mut first, &from, e);
                    }
                }
            }
            if let Err(e) = transport.rename(path, &backup_path(path, 0)) {
                keep_first(&mut first, path, e);
            }
        }
    }

    let sink = SinkKind::File {
        path: path.to_path_buf(),
    };
    match transport.open(&sink) {
        Ok(out) => *output = Some(out),
        Err(e) => keep_first(&mut first, path, e),
    }

    first.map_or(Ok(()), Err)
}

/// Remove backups left over from a larger retention setting.
///
/// Deletes `<path>.<n>` for `n` in `retain..=bound` when present. Returns
/// the number of files removed; removal errors are reported after every
/// candidate has been tried.
pub fn cleanup_stale(
    transport: &dyn Transport,
    path: &Path,
    retain: u32,
    bound: u32,
) -> Result<usize> {
    let mut removed = 0;
    let mut first = None;
    for n in retain..=bound {
        let stale = backup_path(path, n);
        if !transport.exists(&stale) {
            continue;
        }
        match transport.remove(&stale) {
            Ok(()) => removed += 1,
            Err(e) => keep_first(&mut first, &stale, e),
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(removed),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::PlatformTransport;
    use proptest::prelude::*;
    use std::fs;

    fn open(path: &Path) -> Option<Box<dyn Output>> {
        PlatformTransport
            .open(&SinkKind::File {
                path: path.to_path_buf(),
            })
            .ok()
    }

    fn backups(path: &Path, bound: u32) -> Vec<u32> {
        (0..=bound)
            .filter(|n| backup_path(path, *n).exists())
            .collect()
    }

    #[test]
    fn test_backup_path_suffix() {
        assert_eq!(
            backup_path(Path::new("/var/log/unum.log"), 3),
            PathBuf::from("/var/log/unum.log.3")
        );
    }

    #[test]
    fn test_policy_selection() {
        let mut cfg = crate::config::LogConfig::default().resolve(crate::LogDst::Unum);
        assert!(matches!(
            RotationPolicy::for_config(&cfg),
            RotationPolicy::Numbered { retain: 2, .. }
        ));
        cfg.retain = 0;
        assert!(matches!(
            RotationPolicy::for_config(&cfg),
            RotationPolicy::Cut { .. }
        ));
        cfg.max_size = 0;
        assert_eq!(RotationPolicy::for_config(&cfg), RotationPolicy::Never);
        assert!(!RotationPolicy::Never.is_due(u64::MAX));
    }

    #[test]
    fn test_numbered_rotation_shifts_backups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unum.log");
        fs::write(&path, "live").unwrap();
        fs::write(backup_path(&path, 0), "zero").unwrap();
        fs::write(backup_path(&path, 1), "one").unwrap();

        let policy = RotationPolicy::Numbered {
            max_size: 4,
            retain: 2,
        };
        let mut out = open(&path);
        rotate(&PlatformTransport, &path, policy, &mut out).unwrap();

        assert_eq!(fs::read_to_string(backup_path(&path, 0)).unwrap(), "live");
        assert_eq!(fs::read_to_string(backup_path(&path, 1)).unwrap(), "zero");
        assert!(!backup_path(&path, 2).exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        assert_eq!(out.map(|o| o.size()), Some(0));
    }

    #[test]
    fn test_single_backup_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("http.log");
        let policy = RotationPolicy::Numbered {
            max_size: 1,
            retain: 1,
        };

        fs::write(&path, "first").unwrap();
        let mut out = None;
        rotate(&PlatformTransport, &path, policy, &mut out).unwrap();
        fs::write(&path, "second").unwrap();
        rotate(&PlatformTransport, &path, policy, &mut out).unwrap();

        assert_eq!(backups(&path, 9), vec![0]);
        assert_eq!(fs::read_to_string(backup_path(&path, 0)).unwrap(), "second");
    }

    #[test]
    fn test_cut_rotation_keeps_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        fs::write(&path, "aaaa\nbbbb\ncccc\n").unwrap();

        let policy = RotationPolicy::Cut {
            max_size: 15,
            cut_size: 10,
        };
        let mut out = open(&path);
        rotate(&PlatformTransport, &path, policy, &mut out).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "bbbb\ncccc\n");
        assert!(backups(&path, 9).is_empty());
        assert_eq!(out.map(|o| o.size()), Some(10));
    }

    #[test]
    fn test_rotation_reports_missing_live_file_but_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.log");
        let policy = RotationPolicy::Numbered {
            max_size: 1,
            retain: 1,
        };
        let mut out = None;
        let err = rotate(&PlatformTransport, &path, policy, &mut out).unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
        assert!(out.is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_cleanup_removes_above_retain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unum.log");
        for n in 0..6 {
            fs::write(backup_path(&path, n), "x").unwrap();
        }
        fs::write(backup_path(&path, 12), "beyond bound").unwrap();

        let removed = cleanup_stale(&PlatformTransport, &path, 2, 9).unwrap();
        assert_eq!(removed, 4);
        assert_eq!(backups(&path, 9), vec![0, 1]);
        assert!(backup_path(&path, 12).exists());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_numbered_backups_bounded_and_contiguous(
            retain in 1u32..5,
            rounds in 1usize..12,
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("p.log");
            let policy = RotationPolicy::Numbered { max_size: 1, retain };
            let mut out = open(&path);

            for round in 0..rounds {
                if let Some(o) = out.as_mut() {
                    o.append(format!("round {}\n", round).as_bytes()).unwrap();
                }
                rotate(&PlatformTransport, &path, policy, &mut out).unwrap();

                let present = backups(&path, 9);
                prop_assert!(present.len() as u32 <= retain);
                let expected: Vec<u32> = (0..present.len() as u32).collect();
                prop_assert_eq!(&present, &expected);
            }

            let newest = fs::read_to_string(backup_path(&path, 0)).unwrap();
            prop_assert_eq!(newest, format!("round {}\n", rounds - 1));
        }

        #[test]
        fn prop_cut_leaves_suffix_within_cut_size(
            lines in proptest::collection::vec("[a-z]{0,20}", 1..40),
            cut_size in 0u64..200,
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("c.log");
            let content: String = lines.iter().map(|l| format!("{}\n", l)).collect();
            fs::write(&path, &content).unwrap();

            let policy = RotationPolicy::Cut { max_size: cut_size, cut_size };
            let mut out = None;
            rotate(&PlatformTransport, &path, policy, &mut out).unwrap();

            let after = fs::read_to_string(&path).unwrap();
            prop_assert!(after.len() as u64 <= cut_size);
            prop_assert!(content.ends_with(&after));
        }
    }
}
