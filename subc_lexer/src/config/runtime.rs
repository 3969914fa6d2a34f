//! Runtime preferences read from `SUBC_*` environment variables
//!
//! Each `Default` impl consults the environment, so `RuntimeConfig::default()`
//! is the configuration a fresh process runs with. Unparseable values fall
//! back to the built-in default silently.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Environment variable names
pub mod env_vars {
    pub const REQUIRE_SOURCE_EXTENSION: &str = "SUBC_REQUIRE_SOURCE_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "SUBC_ENABLE_PERFORMANCE_LOGGING";
    pub const MAX_FILE_SIZE: &str = "SUBC_MAX_FILE_SIZE";

    pub const FAIL_ON_ERROR_TOKENS: &str = "SUBC_FAIL_ON_ERROR_TOKENS";
    pub const WARN_LONG_LEXEMES: &str = "SUBC_WARN_LONG_LEXEMES";
    pub const LOG_ERROR_TOKENS: &str = "SUBC_LOG_ERROR_TOKENS";
    pub const LEXICAL_DETAILED_METRICS: &str = "SUBC_LEXICAL_DETAILED_METRICS";

    pub const BATCH_THREADS: &str = "SUBC_BATCH_THREADS";
    pub const BATCH_WRITE_TOKENS: &str = "SUBC_BATCH_WRITE_TOKENS";

    pub const LOG_STRUCTURED: &str = "SUBC_LOG_STRUCTURED";
    pub const LOG_CONSOLE: &str = "SUBC_LOG_CONSOLE";
    pub const LOG_LEVEL: &str = "SUBC_LOG_LEVEL";
    pub const LOG_CARGO_STYLE: &str = "SUBC_LOG_CARGO_STYLE";
    pub const LOG_INCLUDE_FILE_CONTEXT: &str = "SUBC_LOG_INCLUDE_FILE_CONTEXT";
}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn env_flag(name: &str, default: bool) -> bool {
    env_value(name).unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Reject files without a `.sc/.src/.c/.sy` extension
    pub require_source_extension: bool,
    /// Log read throughput for each file
    pub enable_performance_logging: bool,
    /// Lowers the compile-time `MAX_FILE_SIZE`; never raises it
    pub max_file_size: Option<u64>,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_source_extension: env_flag(env_vars::REQUIRE_SOURCE_EXTENSION, false),
            enable_performance_logging: env_flag(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
            max_file_size: env_value(env_vars::MAX_FILE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Report a stream containing error tokens as `ErrorTokensPresent`
    pub fail_on_error_tokens: bool,
    /// Warn about identifiers, strings and comments above the build limits
    pub warn_long_lexemes: bool,
    pub log_error_tokens: bool,
    /// Per-kind token counts in `LexerMetrics`
    pub collect_detailed_metrics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            fail_on_error_tokens: env_flag(env_vars::FAIL_ON_ERROR_TOKENS, false),
            warn_long_lexemes: env_flag(env_vars::WARN_LONG_LEXEMES, true),
            log_error_tokens: env_flag(env_vars::LOG_ERROR_TOKENS, true),
            collect_detailed_metrics: env_flag(env_vars::LEXICAL_DETAILED_METRICS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPreferences {
    /// Capped by `MAX_WORKER_THREADS`
    pub worker_threads: Option<usize>,
    /// Write `<file>.tokens` next to each source
    pub write_token_files: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            worker_threads: env_value(env_vars::BATCH_THREADS),
            write_token_files: env_flag(env_vars::BATCH_WRITE_TOKENS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// One JSON object per line instead of the human format
    pub use_structured_logging: bool,
    /// Echo events on stderr
    pub enable_console_logging: bool,
    pub min_log_level: LogLevel,
    /// Print the per-file error report at exit
    pub enable_cargo_style_output: bool,
    /// Attach the file being lexed to each event
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOG_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOG_CONSOLE, false),
            min_log_level: env_value(env_vars::LOG_LEVEL).unwrap_or(LogLevel::Info),
            enable_cargo_style_output: env_flag(env_vars::LOG_CARGO_STYLE, true),
            include_file_context: env_flag(env_vars::LOG_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

/// Serializable mirror of `logging::LogLevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogLevel(pub String);

impl fmt::Display for UnknownLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level '{}'", self.0)
    }
}

impl std::error::Error for UnknownLogLevel {}

/// Accepts names (any case) or the digits 0-3.
impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.to_ascii_lowercase().as_str() {
            "error" | "0" => Ok(LogLevel::Error),
            "warning" | "warn" | "1" => Ok(LogLevel::Warning),
            "info" | "2" => Ok(LogLevel::Info),
            "debug" | "3" => Ok(LogLevel::Debug),
            _ => Err(UnknownLogLevel(level.to_string())),
        }
    }
}

impl From<LogLevel> for crate::logging::LogLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::Error,
            LogLevel::Warning => Self::Warning,
            LogLevel::Info => Self::Info,
            LogLevel::Debug => Self::Debug,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub lexical: LexicalPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("error".parse(), Ok(LogLevel::Error));
        assert_eq!("ERROR".parse(), Ok(LogLevel::Error));
        assert_eq!("warn".parse(), Ok(LogLevel::Warning));
        assert_eq!("1".parse(), Ok(LogLevel::Warning));
        assert_eq!("Info".parse(), Ok(LogLevel::Info));
        assert_eq!("3".parse(), Ok(LogLevel::Debug));
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(UnknownLogLevel("verbose".to_string()))
        );
    }

    #[test]
    fn test_log_level_conversion_keeps_order() {
        let levels = [LogLevel::Error, LogLevel::Warning, LogLevel::Info, LogLevel::Debug];
        for pair in levels.windows(2) {
            let (quieter, louder): (crate::logging::LogLevel, crate::logging::LogLevel) =
                (pair[0].into(), pair[1].into());
            assert!(quieter < louder);
        }
    }

    #[test]
    fn test_unset_variables_use_defaults() {
        assert_eq!(env_value::<u64>("SUBC_TEST_UNSET_VARIABLE"), None);
        assert!(env_flag("SUBC_TEST_UNSET_VARIABLE", true));
        assert!(!env_flag("SUBC_TEST_UNSET_VARIABLE", false));
    }

    #[test]
    fn test_runtime_config_serializes() {
        let config = RuntimeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("fail_on_error_tokens"));
        assert!(json.contains("min_log_level"));
    }
}
