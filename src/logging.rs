// SPDX-License-Identifier: MIT
//
// File sink for the `log` facade.
//
// The editor owns the terminal, so log lines cannot go to stderr. They go
// to the file named by `ALAYA_LOG`, one line per record:
//
//   [14:03:27] INFO alaya_editor::buffer_set: switched to notes.txt
//
// With `ALAYA_LOG` unset no logger is installed and every `log::` macro is
// a cheap level check.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

pub const LOG_PATH_VAR: &str = "ALAYA_LOG";
pub const LOG_LEVEL_VAR: &str = "ALAYA_LOG_LEVEL";

pub struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl FileLogger {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened.
    pub fn open(path: &Path, level: LevelFilter) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(&Local::now().format("%H:%M:%S").to_string(), record);
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{line}");
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn format_line(time: &str, record: &Record<'_>) -> String {
    format!(
        "[{time}] {} {}: {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// `error|warn|info|debug|trace`, case-insensitive. Anything else,
/// including unset, is `info`.
#[must_use]
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the file logger if `ALAYA_LOG` names a file. Returns whether
/// logging is on.
///
/// # Errors
///
/// Fails if the log file cannot be opened.
pub fn init_from_env() -> io::Result<bool> {
    let Some(path) = std::env::var_os(LOG_PATH_VAR) else {
        return Ok(false);
    };
    let level = parse_level(std::env::var(LOG_LEVEL_VAR).ok().as_deref());
    let logger = FileLogger::open(Path::new(&path), level)?;

    // A second install in the same process keeps the first logger.
    if log::set_logger(Box::leak(Box::new(logger))).is_ok() {
        log::set_max_level(level);
    }
    Ok(true)
}
