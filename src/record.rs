//! Log record formatting
//!
//! Every sink receives the same line layout:
//! `YYYY-MM-DD HH:MM:SS.mmm [<tid>] <message>\n`

use std::fmt::{self, Write};

/// Render one record, appending the newline the message may lack
pub fn format_record(args: fmt::Arguments<'_>) -> String {
    let mut line = String::with_capacity(128);
    let _ = write!(
        line,
        "{} [{}] ",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        thread_id()
    );
    let _ = line.write_fmt(args);
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

/// OS thread id of the caller (process id where unavailable)
#[inline]
pub fn thread_id() -> u64 {
    #[cfg(target_os = "linux")]
    {
        // SAFETY: gettid has no preconditions and cannot fail.
        unsafe { libc::syscall(libc::SYS_gettid) as u64 }
    }
    #[cfg(not(target_os = "linux"))]
    {
        u64::from(std::process::id())
    }
}
