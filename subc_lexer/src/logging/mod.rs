//! Global logging for the Sub-C lexer
//!
//! One `LoggingService` and one `ErrorCollector` per process. Batch workers
//! tag their events with the file being lexed through a thread-local
//! context; errors and warnings raised inside that context are kept for
//! the cargo-style report printed at exit.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::runtime::LoggingPreferences;
use crate::utils::Span;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use codes::Code;
pub use collector::{ErrorCollector, FileContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, FileLogger, LogFormat, Logger, LoggingService, MemoryLogger};

static GLOBAL_LOGGER: OnceLock<LoggingService> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileContext>> = const { RefCell::new(None) };
}

/// Install the process-wide service built from `preferences`.
///
/// `log_file`, when given, receives every event that passes the level
/// filter in addition to the console.
pub fn init_global_logging(
    preferences: LoggingPreferences,
    log_file: Option<&Path>,
) -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;
    let service = LoggingService::from_preferences(&preferences, log_file)
        .map_err(|e| format!("Cannot open log file: {}", e))?;
    config::install_preferences(preferences)?;
    init_global_logging_with_service(service)
}

/// Install a caller-built service. Fails if one is already installed.
pub fn init_global_logging_with_service(service: LoggingService) -> Result<(), String> {
    let required = [
        codes::file_processing::FILE_NOT_FOUND,
        codes::lexical::INVALID_CHARACTER,
        codes::lexical::UNTERMINATED_COMMENT,
        codes::batch::NO_SOURCE_FILES,
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
    ];
    if let Some(code) = required.iter().find(|code| code.metadata().is_none()) {
        return Err(format!("Missing metadata for code: {}", code));
    }

    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())?;
    GLOBAL_ERROR_COLLECTOR
        .set(ErrorCollector::new())
        .map_err(|_| "Global error collector already initialized".to_string())?;

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Logging initialized"
    );
    Ok(())
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get()
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get()
}

/// Run `f` with `file_path` as this thread's current file.
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = FILE_CONTEXT.with(|ctx| {
        ctx.borrow_mut()
            .replace(FileContext { file_path, file_id })
    });
    let result = f();
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    result
}

pub fn current_file_context() -> Option<FileContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Cheap check so `log_debug!` can skip formatting its context.
pub fn debug_enabled() -> bool {
    try_get_global_logger().is_some_and(|logger| logger.should_log(LogLevel::Debug))
}

fn decorate(mut event: LogEvent, span: Option<Span>, context: Vec<(&str, String)>) -> LogEvent {
    if let Some(span) = span {
        event = event.with_span(span);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

/// Entry point for the logging macros.
pub fn emit(event: LogEvent, span: Option<Span>, context: Vec<(&str, String)>) {
    let mut event = decorate(event, span, context);
    let file_context = current_file_context();

    if let Some(ctx) = &file_context {
        if config::include_file_context() {
            event = event.with_file(ctx.file_path.clone());
        }
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(&event);
    }

    if event.is_error() || event.is_warning() {
        if let (Some(ctx), Some(collector)) = (file_context, try_get_global_error_collector()) {
            collector.record(&ctx.file_path, event);
        }
    }
}

/// Print the collected report to stderr, unless cargo-style output is off.
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector.render_report();
        if !report.is_empty() {
            eprint!("{}", report);
        }
    }
}
