//! Logging service and its sinks
//!
//! The service filters by level once and fans each event out to every
//! sink. Console output goes to stderr so stdout stays free for tokens.

use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::runtime::LoggingPreferences;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// A destination for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Line format shared by the console and file sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        if preferences.use_structured_logging {
            LogFormat::Json
        } else {
            LogFormat::Human
        }
    }

    fn render(self, event: &LogEvent) -> String {
        match self {
            LogFormat::Human => event.to_string(),
            LogFormat::Json => event.to_json().unwrap_or_else(|_| event.to_string()),
        }
    }
}

pub struct LoggingService {
    sinks: Vec<Arc<dyn Logger>>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            sinks: Vec::new(),
            min_level,
        }
    }

    /// Console sink when enabled, plus an append-only log file if given
    pub fn from_preferences(
        preferences: &LoggingPreferences,
        log_file: Option<&Path>,
    ) -> io::Result<Self> {
        let format = LogFormat::from_preferences(preferences);
        let mut service = Self::new(config::effective_level(preferences));

        if preferences.enable_console_logging {
            service = service.with_sink(Arc::new(ConsoleLogger::new(format)));
        }
        if let Some(path) = log_file {
            service = service.with_sink(Arc::new(FileLogger::create(path, format)?));
        }

        Ok(service)
    }

    pub fn with_sink(mut self, sink: Arc<dyn Logger>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: &LogEvent) {
        if self.should_log(event.level) {
            for sink in &self.sinks {
                sink.log(event);
            }
        }
    }
}

pub struct ConsoleLogger {
    format: LogFormat,
}

impl ConsoleLogger {
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        eprintln!("{}", self.format.render(event));
    }
}

/// Appends one line per event to a log file (`--log-file`).
pub struct FileLogger {
    file: Mutex<File>,
    format: LogFormat,
}

impl FileLogger {
    /// Parent directories are created as needed.
    pub fn create(path: &Path, format: LogFormat) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: Mutex::new(file),
            format,
        })
    }
}

impl Logger for FileLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.format.render(event);
        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // A failed write must not turn into another log event
        let _ = writeln!(file, "{}", line);
    }
}

/// Keeps events in memory, bounded by `LOG_BUFFER_SIZE`; oldest drop first.
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn count_code(&self, code: &str) -> usize {
        self.lock().iter().filter(|e| e.code.as_str() == code).count()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        let capacity = config::get_error_buffer_size();
        if events.len() >= capacity {
            let excess = events.len() + 1 - capacity;
            events.drain(..excess);
        }
        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LogLevel as PreferredLevel;
    use crate::logging::codes;

    fn quiet_preferences() -> LoggingPreferences {
        LoggingPreferences {
            use_structured_logging: false,
            enable_console_logging: false,
            min_log_level: PreferredLevel::Debug,
            enable_cargo_style_output: true,
            include_file_context: true,
        }
    }

    #[test]
    fn test_level_filtering_applies_to_all_sinks() {
        let first = Arc::new(MemoryLogger::new());
        let second = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(LogLevel::Warning)
            .with_sink(first.clone())
            .with_sink(second.clone());

        service.log_event(&LogEvent::debug("scanning"));
        service.log_event(&LogEvent::info("file done"));
        service.log_event(&LogEvent::warning_with_code(
            codes::lexical::IDENTIFIER_TOO_LONG,
            "identifier too long",
        ));
        service.log_event(&LogEvent::error(
            codes::lexical::UNTERMINATED_COMMENT,
            "unterminated comment",
        ));

        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(first.count_code("E022"), 1);
    }

    #[test]
    fn test_memory_logger_is_bounded() {
        let logger = MemoryLogger::new();
        let capacity = config::get_error_buffer_size();
        for _ in 0..capacity + 5 {
            logger.log(&LogEvent::error(codes::lexical::INVALID_CHARACTER, "bad"));
        }
        logger.log(&LogEvent::info("last"));

        assert_eq!(logger.len(), capacity);
        assert_eq!(logger.events().last().map(|e| e.message.clone()), Some("last".to_string()));
    }

    #[test]
    fn test_console_disabled_means_no_sinks() {
        let service = LoggingService::from_preferences(&quiet_preferences(), None).unwrap();
        assert_eq!(service.sink_count(), 0);
    }

    #[test]
    fn test_log_file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("lexer.log");
        let service = LoggingService::from_preferences(&quiet_preferences(), Some(&path)).unwrap();
        assert_eq!(service.sink_count(), 1);

        service.log_event(&LogEvent::error(codes::lexical::INVALID_CHARACTER, "invalid character '$'"));
        service.log_event(&LogEvent::success(codes::success::TOKENIZATION_COMPLETE, "done"));

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("error[E020]"));
        assert!(lines[1].starts_with("info[I020]"));
    }

    #[test]
    fn test_structured_file_sink_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexer.jsonl");
        let logger = FileLogger::create(&path, LogFormat::Json).unwrap();

        logger.log(&LogEvent::warning_with_code(codes::lexical::COMMENT_TOO_LONG, "comment too long"));

        let written = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(written.trim()).unwrap();
        assert_eq!(json["code"], "W022");
        assert_eq!(json["level"], "warning");
    }
}
