//! Logging limits and the active logging preferences
//!
//! Buffer sizes are generated at build time. The preferences are installed
//! once by `init_global_logging`; before that the environment defaults apply.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static ACTIVE_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

pub(crate) fn install_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    ACTIVE_PREFERENCES
        .set(preferences)
        .map_err(|_| "Logging preferences already installed".to_string())
}

fn active_preferences() -> LoggingPreferences {
    ACTIVE_PREFERENCES.get().cloned().unwrap_or_default()
}

/// The preferred level, raised to the build profile's floor if quieter
pub fn effective_level(preferences: &LoggingPreferences) -> LogLevel {
    LogLevel::from(preferences.min_log_level).max(floor_level())
}

/// Least verbose level a user may select (`SECURITY_MIN_LOG_LEVEL`)
pub fn floor_level() -> LogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => LogLevel::Error,
        1 => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}

pub fn use_cargo_style_output() -> bool {
    active_preferences().enable_cargo_style_output
}

pub fn include_file_context() -> bool {
    active_preferences().include_file_context
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!(
            "Log buffer size {} outside 100..=100000",
            LOG_BUFFER_SIZE
        ));
    }
    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }
    if MAX_LOG_MESSAGE_LENGTH == 0 {
        return Err("Max log message length must be positive".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LogLevel as PreferredLevel;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_floor_raises_quiet_preferences() {
        let mut preferences = LoggingPreferences::default();
        preferences.min_log_level = PreferredLevel::Error;
        assert_eq!(effective_level(&preferences), floor_level());

        preferences.min_log_level = PreferredLevel::Debug;
        assert_eq!(effective_level(&preferences), LogLevel::Debug);
    }

    #[test]
    fn test_compile_time_constants() {
        assert!(LOG_BUFFER_SIZE > 0);
        assert!(MAX_LOG_EVENTS_PER_FILE > 0);
        assert!(SECURITY_MIN_LOG_LEVEL <= 2);
    }
}
