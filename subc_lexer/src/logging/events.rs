//! Log events emitted by the lexer pipeline

use super::codes::{self, Code};
use crate::utils::Span;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Ordered from most to least important, so `level <= min_level` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    /// Source being lexed when the event was raised
    pub file: Option<PathBuf>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: truncate_message(message),
            span: None,
            file: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    /// Uncoded warning, reported as `W000`
    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, Code::new("W000"), message)
    }

    pub fn warning_with_code(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    /// Uncoded progress message, reported as `I000`
    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_file(mut self, file: PathBuf) -> Self {
        self.file = Some(file);
        self
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn recommended_action(&self) -> Option<&'static str> {
        self.code.metadata().map(|m| m.recommended_action)
    }

    /// `file:line:col` when both are known, otherwise whichever is
    pub fn location(&self) -> Option<String> {
        match (&self.file, &self.span) {
            (Some(file), Some(span)) => Some(format!("{}:{}", file.display(), span.start())),
            (Some(file), None) => Some(file.display().to_string()),
            (None, Some(span)) => Some(span.start().to_string()),
            (None, None) => None,
        }
    }

    /// One JSON object per event, for `SUBC_LOG_STRUCTURED=true`
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let record = EventRecord {
            timestamp: self
                .timestamp
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            level: self.level.as_str(),
            code: self.code.as_str(),
            category: codes::get_category(self.code.as_str()),
            severity: codes::get_severity(self.code.as_str()).as_str(),
            message: &self.message,
            file: self.file.as_ref().map(|p| p.display().to_string()),
            span: self.span.as_ref(),
            context: &self.context,
        };
        serde_json::to_string(&record)
    }
}

/// `error[E020]: invalid character '@' --> main.sc:2:3 (char=@)`
impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.level, self.code, self.message)?;
        if let Some(location) = self.location() {
            write!(f, " --> {}", location)?;
        }
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct EventRecord<'a> {
    timestamp: u64,
    level: &'static str,
    code: &'static str,
    category: &'static str,
    severity: &'static str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<&'a Span>,
    #[serde(skip_serializing_if = "no_context")]
    context: &'a BTreeMap<String, String>,
}

fn no_context(context: &&BTreeMap<String, String>) -> bool {
    context.is_empty()
}

fn truncate_message(message: &str) -> String {
    let limit = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
    match message.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}
