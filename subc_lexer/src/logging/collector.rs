//! Per-file collection of errors and warnings for the end-of-run report
//!
//! Batch workers record against the file they are lexing. The report is
//! rendered once every worker has joined, grouped by path in sorted order.

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The file a thread is currently lexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub files_reported: usize,
    pub files_with_errors: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

#[derive(Debug, Default)]
struct FileReport {
    events: Vec<LogEvent>,
    dropped: usize,
}

#[derive(Debug, Default)]
pub struct ErrorCollector {
    files: Mutex<BTreeMap<PathBuf, FileReport>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, FileReport>> {
        self.files
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Keeps the first `MAX_LOG_EVENTS_PER_FILE` events per file and counts the rest
    pub fn record(&self, file_path: &Path, event: LogEvent) {
        let mut files = self.files();
        let report = files.entry(file_path.to_path_buf()).or_default();
        if report.events.len() < MAX_LOG_EVENTS_PER_FILE {
            report.events.push(event);
        } else {
            report.dropped += 1;
        }
    }

    pub fn events_for(&self, file_path: &Path) -> Vec<LogEvent> {
        self.files()
            .get(file_path)
            .map(|report| report.events.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }

    pub fn summary(&self) -> ProcessingSummary {
        let files = self.files();
        let mut summary = ProcessingSummary {
            files_reported: files.len(),
            ..Default::default()
        };

        for report in files.values() {
            let errors = report.events.iter().filter(|e| e.is_error()).count();
            if errors > 0 {
                summary.files_with_errors += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += report.events.iter().filter(|e| e.is_warning()).count();
        }

        summary
    }

    /// Cargo-style report: errors then warnings per file, then totals.
    pub fn render_report(&self) -> String {
        let mut out = String::new();

        for (path, report) in self.files().iter() {
            let ordered = report
                .events
                .iter()
                .filter(|e| e.is_error())
                .chain(report.events.iter().filter(|e| e.is_warning()));

            for event in ordered {
                let _ = writeln!(out, "{}[{}]: {}", event.level, event.code, event.message);
                let location = match &event.span {
                    Some(span) => format!("{}:{}", path.display(), span.start()),
                    None => path.display().to_string(),
                };
                let _ = writeln!(out, "  --> {}", location);
                for (key, value) in &event.context {
                    let _ = writeln!(out, "  = {}: {}", key, value);
                }
                if event.is_error() {
                    if let Some(action) = event.recommended_action() {
                        let _ = writeln!(out, "  = help: {}", action);
                    }
                }
                out.push('\n');
            }

            if report.dropped > 0 {
                let _ = writeln!(
                    out,
                    "{}: {} more events not shown\n",
                    path.display(),
                    report.dropped
                );
            }
        }

        let summary = self.summary();
        if summary.total_errors > 0 || summary.total_warnings > 0 {
            let _ = writeln!(
                out,
                "lexing finished: {} error(s), {} warning(s) in {} file(s)",
                summary.total_errors, summary.total_warnings, summary.files_reported
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_summary_counts_per_file() {
        let collector = ErrorCollector::new();
        collector.record(
            Path::new("a.sc"),
            LogEvent::error(codes::lexical::INVALID_CHARACTER, "invalid character '$'"),
        );
        collector.record(
            Path::new("a.sc"),
            LogEvent::warning_with_code(codes::lexical::IDENTIFIER_TOO_LONG, "long"),
        );
        collector.record(
            Path::new("b.sc"),
            LogEvent::warning_with_code(codes::lexical::COMMENT_TOO_LONG, "long comment"),
        );

        assert_eq!(
            collector.summary(),
            ProcessingSummary {
                files_reported: 2,
                files_with_errors: 1,
                total_errors: 1,
                total_warnings: 2,
            }
        );
    }

    #[test]
    fn test_per_file_event_cap() {
        let collector = ErrorCollector::new();
        let path = Path::new("noisy.sc");
        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 10 {
            collector.record(path, LogEvent::error(codes::lexical::INVALID_CHARACTER, "bad"));
        }

        assert_eq!(collector.events_for(path).len(), MAX_LOG_EVENTS_PER_FILE);
        assert!(collector.render_report().contains("noisy.sc: 10 more events not shown"));
    }

    #[test]
    fn test_report_layout() {
        let collector = ErrorCollector::new();
        let span = Span::new(Position::new(9, 2, 5), Position::new(10, 2, 6));
        collector.record(
            Path::new("main.sc"),
            LogEvent::warning_with_code(codes::lexical::IDENTIFIER_TOO_LONG, "identifier too long"),
        );
        collector.record(
            Path::new("main.sc"),
            LogEvent::error(codes::lexical::INVALID_CHARACTER, "invalid character '@'")
                .with_span(span)
                .with_context("char", "@"),
        );

        let report = collector.render_report();
        let error_at = report.find("error[E020]: invalid character '@'").unwrap();
        let warning_at = report.find("warning[W020]").unwrap();
        assert!(error_at < warning_at);
        assert!(report.contains("  --> main.sc:2:5\n  = char: @\n  = help: "));
        assert!(report.ends_with("lexing finished: 1 error(s), 1 warning(s) in 1 file(s)\n"));
    }

    #[test]
    fn test_empty_collector_renders_nothing() {
        let collector = ErrorCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.render_report(), "");
    }
}
