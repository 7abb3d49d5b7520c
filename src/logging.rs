/// Structured logging for the weather console.
///
/// Provides context-rich logging with source and station identifiers,
/// timestamps, and severity levels. The interactive screen owns stdout, so
/// console output goes to stderr and a log file captures the full record
/// for long-running sessions.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::WxError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    StationApi,
    Nws,
    Clipboard,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::StationApi => write!(f, "API"),
            DataSource::Nws => write!(f, "NWS"),
            DataSource::Clipboard => write!(f, "CLIP"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - a station gap or an empty feed, routine for AWOS sites
    Expected,
    /// Unexpected failure - indicates service degradation or a configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a fetch failure from its typed error.
///
/// Server-side 5xx and transport failures are transient upstream trouble;
/// 4xx means this client asked for something wrong (bad station id, changed
/// endpoint) and deserves an operator's attention.
pub fn classify_fetch_failure(err: &WxError) -> FailureType {
    match err {
        WxError::HttpError(code) if *code >= 500 => FailureType::Unknown,
        WxError::HttpError(_) => FailureType::Unexpected,
        WxError::Transport(_) => FailureType::Unknown,
        WxError::ParseError(_) => FailureType::Unexpected,
        WxError::NoDataAvailable(_) => FailureType::Expected,
        WxError::Clipboard(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to record
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to echo entries to stderr (off while the screen is active)
    console: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console,
        };

        *LOGGER.lock().unwrap() = Some(logger);
    }

    fn log(&self, level: LogLevel, source: DataSource, station: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let station_part = station.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!(
            "{} {} {}{}: {}",
            timestamp, level, source, station_part, message
        );

        if self.console {
            eprintln!("{}", log_entry);
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console: bool) {
    Logger::init(min_level, log_file.map(String::from), console);
}

/// Log a general informational message
pub fn info(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Info, source, station, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Warning, source, station, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Error, source, station, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, station: Option<&str>, message: &str) {
    if let Some(logger) = LOGGER.lock().unwrap().as_ref() {
        logger.log(LogLevel::Debug, source, station, message);
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a refresh/fetch failure with automatic classification.
pub fn log_fetch_failure(source: DataSource, station: &str, operation: &str, err: &WxError) {
    let failure_type = classify_fetch_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, Some(station), &message),
        FailureType::Unexpected => error(source, Some(station), &message),
        FailureType::Unknown => warn(source, Some(station), &message),
    }
}

// ---------------------------------------------------------------------------
// Backfill Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a history backfill.
pub fn log_backfill_summary(station: &str, requested_hours: i64, fetched: usize, kept: usize) {
    let message = format!(
        "Backfill complete: {} observations fetched for the last {}h, {} kept after pruning",
        fetched, requested_hours, kept
    );

    if fetched == 0 {
        warn(DataSource::Nws, Some(station), &message);
    } else {
        info(DataSource::Nws, Some(station), &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            classify_fetch_failure(&WxError::HttpError(502)),
            FailureType::Unknown,
            "upstream 5xx is transient"
        );
        assert_eq!(
            classify_fetch_failure(&WxError::HttpError(404)),
            FailureType::Unexpected,
            "4xx means our request is wrong"
        );
        assert_eq!(
            classify_fetch_failure(&WxError::NoDataAvailable("KMPR".to_string())),
            FailureType::Expected
        );
        assert_eq!(
            classify_fetch_failure(&WxError::Transport("connection refused".to_string())),
            FailureType::Unknown
        );
    }
}
