//! In-process logger behind the `log` facade
//!
//! Keeps the most recent entries in a ring buffer, appends every entry to a
//! log file when one is configured, and echoes entries at or above the echo
//! level to stderr.

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::error::{PitchwiseError, Result};

const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn format(&self) -> String {
        format!(
            "[{}] [{}] [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

struct LoggerState {
    ring_buffer: VecDeque<LogEntry>,
    max_entries: usize,
    file_path: Option<PathBuf>,
    echo_level: LevelFilter,
}

pub struct RingLogger {
    state: Mutex<LoggerState>,
}

static LOGGER: OnceLock<RingLogger> = OnceLock::new();

impl RingLogger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Mutex::new(LoggerState {
                ring_buffer: VecDeque::with_capacity(max_entries),
                max_entries: max_entries.max(1),
                file_path: None,
                echo_level: LevelFilter::Warn,
            }),
        }
    }

    pub fn set_file_path(&self, path: Option<PathBuf>) -> Result<()> {
        if let Some(parent) = path.as_ref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.state.lock().file_path = path;
        Ok(())
    }

    pub fn set_echo_level(&self, level: LevelFilter) {
        self.state.lock().echo_level = level;
    }

    pub fn recent(&self, n: usize) -> Vec<String> {
        self.state
            .lock()
            .ring_buffer
            .iter()
            .rev()
            .take(n)
            .map(LogEntry::format)
            .collect()
    }
}

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        };

        let mut state = self.state.lock();

        // A failed write must not take the caller down with it
        if let Some(path) = &state.file_path {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", entry.format());
            }
        }

        if entry.level <= state.echo_level {
            eprintln!("{}: {}", entry.level, entry.message);
        }

        if state.ring_buffer.len() >= state.max_entries {
            state.ring_buffer.pop_front();
        }
        state.ring_buffer.push_back(entry);
    }

    fn flush(&self) {}
}

fn global() -> &'static RingLogger {
    LOGGER.get_or_init(|| RingLogger::new(DEFAULT_CAPACITY))
}

/// Parse a level name such as `info` or `DEBUG`
pub fn parse_level(level: &str) -> Result<LevelFilter> {
    level.trim().parse::<LevelFilter>().map_err(|_| PitchwiseError::InvalidConfig {
        message: format!(
            "unknown logging level '{}' (expected off, error, warn, info, debug or trace)",
            level
        ),
    })
}

/// Install the global logger. Calling it again only updates the settings.
pub fn init(level: LevelFilter, file: Option<PathBuf>, verbose: bool) -> Result<()> {
    let logger = global();
    logger.set_file_path(file)?;
    logger.set_echo_level(if verbose { LevelFilter::Debug } else { LevelFilter::Warn });

    // Already installed by an earlier init
    let _ = log::set_logger(logger);
    log::set_max_level(if verbose { level.max(LevelFilter::Debug) } else { level });
    Ok(())
}

/// Most recent log lines, newest first
pub fn recent(n: usize) -> Vec<String> {
    global().recent(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn emit(logger: &RingLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(level)
                .target("pitchwise::test")
                .build(),
        );
    }

    #[test]
    fn test_ring_buffer_keeps_newest() {
        log::set_max_level(LevelFilter::Trace);
        let logger = RingLogger::new(2);
        logger.set_echo_level(LevelFilter::Off);
        emit(&logger, Level::Info, "first");
        emit(&logger, Level::Info, "second");
        emit(&logger, Level::Info, "third");

        let recent = logger.recent(10);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].ends_with("third"));
        assert!(recent[1].ends_with("second"));
        assert!(recent[0].contains("[INFO] [pitchwise::test]"));
    }

    #[test]
    fn test_file_output() {
        log::set_max_level(LevelFilter::Trace);
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("pitchwise.log");

        let logger = RingLogger::new(10);
        logger.set_echo_level(LevelFilter::Off);
        logger.set_file_path(Some(path.clone())).unwrap();
        emit(&logger, Level::Warn, "dataset fallback");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[WARN]"));
        assert!(content.contains("dataset fallback"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" info ").unwrap(), LevelFilter::Info);
        assert!(matches!(
            parse_level("loud"),
            Err(PitchwiseError::InvalidConfig { .. })
        ));
    }
}
