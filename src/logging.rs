//! File logger behind the `log` facade
//!
//! The terminal belongs to the TUI, so every record goes to a plain text file
//! with one timestamped line per record.

use crate::error::{CalframesError, Result};
use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default log location (~/.config/calframes/calframes.log)
pub fn default_log_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("calframes").join("calframes.log"))
}

/// Formats one log line: `2026-10-19 21:04:05.123 INFO  [calframes::panel] message`
pub fn format_line(time: &DateTime<Local>, level: Level, target: &str, message: &str) -> String {
    format!(
        "{} {:<5} [{}] {}",
        time.format("%Y-%m-%d %H:%M:%S%.3f"),
        level,
        target,
        message
    )
}

pub struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    /// Opens `path` for appending, creating parent directories as needed
    pub fn open(path: &Path, level: LevelFilter) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            level,
            file: Mutex::new(file),
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(
            &Local::now(),
            record.level(),
            record.target(),
            &record.args().to_string(),
        );

        // A poisoned lock or a full disk must never take the TUI down
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", line);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs a [`FileLogger`] writing to `path` as the global logger
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    let logger = FileLogger::open(path, level)?;

    log::set_logger(Box::leak(Box::new(logger))).map_err(|e| {
        CalframesError::ConfigError(format!("Failed to install logger: {}", e))
    })?;
    log::set_max_level(level);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn record_at<'a>(level: Level, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder()
            .level(level)
            .target("calframes::panel")
            .args(args)
            .build()
    }

    #[test]
    fn test_format_line() {
        let time = Local.with_ymd_and_hms(2026, 3, 14, 22, 5, 9).unwrap();
        let line = format_line(&time, Level::Info, "calframes::panel", "light: 3 images");

        assert_eq!(
            line,
            "2026-03-14 22:05:09.000 INFO  [calframes::panel] light: 3 images"
        );
    }

    #[test]
    fn test_logger_writes_enabled_records() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("calframes.log");
        let logger = FileLogger::open(&path, LevelFilter::Info).unwrap();

        logger.log(&record_at(Level::Warn, format_args!("cannot save")));
        logger.log(&record_at(Level::Debug, format_args!("dark: No image")));
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("WARN  [calframes::panel] cannot save"));
        assert!(!contents.contains("No image"));
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn test_logger_appends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("calframes.log");
        fs::write(&path, "earlier session\n").unwrap();

        let logger = FileLogger::open(&path, LevelFilter::Debug).unwrap();
        logger.log(&record_at(Level::Debug, format_args!("flat: 1 image")));
        logger.flush();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("earlier session\n"));
        assert!(contents.contains("flat: 1 image"));
    }

    #[test]
    fn test_enabled_respects_level() {
        let temp_dir = TempDir::new().unwrap();
        let logger =
            FileLogger::open(&temp_dir.path().join("calframes.log"), LevelFilter::Warn).unwrap();

        let error = Metadata::builder().level(Level::Error).build();
        let info = Metadata::builder().level(Level::Info).build();
        assert!(logger.enabled(&error));
        assert!(!logger.enabled(&info));
    }

    #[test]
    fn test_open_in_unwritable_location() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let result = FileLogger::open(&blocker.join("calframes.log"), LevelFilter::Info);
        assert!(result.is_err());
    }
}
