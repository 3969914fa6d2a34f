//! Reads one source into memory, enforcing the build profile's limits
//!
//! Every rejection is logged with its code before it is returned, so the
//! batch report shows why a file was skipped.

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes::{self, file_processing as file_codes, Code};
use crate::{log_debug, log_error, log_success, log_warning};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// Extensions recognized as Sub-C source
pub const SOURCE_EXTENSIONS: [&str; 4] = ["sc", "src", "c", "sy"];

/// Case-insensitive check against `SOURCE_EXTENSIONS`
pub fn has_source_extension(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected one of .sc/.src/.c/.sy, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading source: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("Source exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    /// Classify an I/O failure on `name`
    fn from_io(error: &io::Error, name: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FileProcessorError::FileNotFound {
                path: name.to_string(),
            },
            io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied {
                path: name.to_string(),
            },
            io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding {
                path: name.to_string(),
            },
            _ => FileProcessorError::IoError {
                message: format!("{}: {}", name, error),
            },
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            FileProcessorError::FileNotFound { .. } => file_codes::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => file_codes::INVALID_EXTENSION,
            FileProcessorError::FileTooLarge { .. } => file_codes::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => file_codes::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => file_codes::PERMISSION_DENIED,
            FileProcessorError::InvalidEncoding { .. } => file_codes::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => file_codes::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => file_codes::INVALID_PATH,
            FileProcessorError::TooManyLines { .. } => file_codes::TOO_MANY_LINES,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.error_code().as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical path, or the caller-supplied name (`<stdin>`) for readers
    pub path: PathBuf,
    pub size: u64,
    /// Lower-cased
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_source_file: bool,
    /// Invalid UTF-8 was replaced with U+FFFD while reading
    pub lossy_utf8: bool,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    fn for_path(path: &Path, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            path: path.to_path_buf(),
            size,
            extension: lowercase_extension(path),
            line_count: 0,
            is_source_file: has_source_extension(path),
            lossy_utf8: false,
            modified,
        }
    }

    /// `512 B`, `2.00 KB`, `1.50 MB`
    pub fn human_readable_size(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
        if self.size < 1024 {
            return format!("{} B", self.size);
        }
        let mut size = self.size as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        format!("{:.2} {}", size, UNITS[unit])
    }

    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

/// Loaded source text with its metadata
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    /// Wrap in-memory source, e.g. an editor buffer
    pub fn from_source(name: &str, source: String) -> Self {
        let mut metadata = FileMetadata::for_path(Path::new(name), source.len() as u64, None);
        metadata.line_count = source.lines().count();
        Self {
            source,
            metadata,
            processing_duration: Duration::ZERO,
        }
    }

    pub fn char_count(&self) -> usize {
        self.source.chars().count()
    }

    /// Whether the source holds only whitespace
    pub fn is_effectively_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Characters per millisecond
    pub fn processing_rate(&self) -> f64 {
        let millis = self.processing_duration.as_secs_f64() * 1000.0;
        if millis > 0.0 {
            self.char_count() as f64 / millis
        } else {
            0.0
        }
    }
}

struct Decoded {
    source: String,
    lines: usize,
    lossy: bool,
}

pub struct FileProcessor {
    pub require_source_extension: bool,
    /// Log size, duration and throughput with each loaded source
    pub enable_performance_logging: bool,
    /// Treat empty input as `EmptyFile` instead of an empty source
    pub reject_empty_files: bool,
    /// Effective size limit, never above `MAX_FILE_SIZE`
    pub max_file_size: u64,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_source_extension: false,
            enable_performance_logging: true,
            reject_empty_files: false,
            max_file_size: MAX_FILE_SIZE,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self::new()
            .with_source_extension_required(prefs.require_source_extension)
            .with_performance_logging(prefs.enable_performance_logging)
            .with_max_file_size(prefs.max_file_size.unwrap_or(MAX_FILE_SIZE))
    }

    pub fn with_source_extension_required(mut self, required: bool) -> Self {
        self.require_source_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn with_empty_files_rejected(mut self, rejected: bool) -> Self {
        self.reject_empty_files = rejected;
        self
    }

    /// Values above the compile-time maximum are capped
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size.min(MAX_FILE_SIZE);
        self
    }

    /// Load `file_path`: path, size, extension and line-count checks
    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start = Instant::now();
        log_debug!("Loading source", "file" => file_path);

        let path = self.resolve(file_path)?;
        let stat = fs::metadata(&path)
            .map_err(|e| self.reject(FileProcessorError::from_io(&e, file_path), file_path))?;
        let mut metadata = FileMetadata::for_path(&path, stat.len(), stat.modified().ok());

        self.check_size(metadata.size, file_path)?;
        if self.require_source_extension && !metadata.is_source_file {
            return Err(self.reject(
                FileProcessorError::InvalidExtension {
                    extension: metadata.extension.clone(),
                },
                file_path,
            ));
        }

        let file = File::open(&path)
            .map_err(|e| self.reject(FileProcessorError::from_io(&e, file_path), file_path))?;
        let decoded = self.read_source(file, file_path)?;
        metadata.line_count = decoded.lines;
        metadata.lossy_utf8 = decoded.lossy;

        Ok(self.finish(decoded.source, metadata, start, file_path))
    }

    /// Read a complete source from `reader` (standard input in the CLI)
    pub fn process_reader<R: Read>(
        &self,
        reader: R,
        name: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start = Instant::now();
        let decoded = self.read_source(reader, name)?;

        let metadata = FileMetadata {
            path: PathBuf::from(name),
            size: decoded.source.len() as u64,
            extension: None,
            line_count: decoded.lines,
            is_source_file: false,
            lossy_utf8: decoded.lossy,
            modified: None,
        };
        Ok(self.finish(decoded.source, metadata, start, name))
    }

    /// Log `error` under its code and hand it back
    fn reject(&self, error: FileProcessorError, name: &str) -> FileProcessorError {
        log_error!(error.error_code(), &error.to_string(), "source" => name);
        error
    }

    fn resolve(&self, file_path: &str) -> Result<PathBuf, FileProcessorError> {
        let path = Path::new(file_path);
        if file_path.is_empty() || (path.exists() && !path.is_file()) {
            let error = FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            };
            return Err(self.reject(error, file_path));
        }
        path.canonicalize()
            .map_err(|e| self.reject(FileProcessorError::from_io(&e, file_path), file_path))
    }

    fn check_size(&self, size: u64, name: &str) -> Result<(), FileProcessorError> {
        if size > self.max_file_size {
            let error = FileProcessorError::FileTooLarge {
                size,
                max_size: self.max_file_size,
            };
            return Err(self.reject(error, name));
        }
        if size == 0 && self.reject_empty_files {
            return Err(self.reject(FileProcessorError::EmptyFile, name));
        }
        Ok(())
    }

    /// Read at most one byte past the limit, then check size and line count.
    /// Invalid UTF-8 is replaced with U+FFFD so the scanner still sees every
    /// byte; each replacement lexes as an invalid character.
    fn read_source<R: Read>(&self, reader: R, name: &str) -> Result<Decoded, FileProcessorError> {
        let mut bytes = Vec::new();
        reader
            .take(self.max_file_size.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| self.reject(FileProcessorError::from_io(&e, name), name))?;
        self.check_size(bytes.len() as u64, name)?;

        let (source, lossy) = match String::from_utf8(bytes) {
            Ok(source) => (source, false),
            Err(invalid) => {
                log_warning!(file_codes::INVALID_ENCODING,
                    "Invalid UTF-8 replaced with U+FFFD",
                    "source" => name,
                    "first_invalid_byte" => invalid.utf8_error().valid_up_to()
                );
                (String::from_utf8_lossy(invalid.as_bytes()).into_owned(), true)
            }
        };

        let lines = source.lines().count();
        if lines > MAX_LINE_COUNT_FOR_ANALYSIS {
            let error = FileProcessorError::TooManyLines {
                lines,
                max_lines: MAX_LINE_COUNT_FOR_ANALYSIS,
            };
            return Err(self.reject(error, name));
        }
        Ok(Decoded {
            source,
            lines,
            lossy,
        })
    }

    fn finish(
        &self,
        source: String,
        metadata: FileMetadata,
        start: Instant,
        name: &str,
    ) -> FileProcessingResult {
        let result = FileProcessingResult {
            source,
            metadata,
            processing_duration: start.elapsed(),
        };

        if self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Source loaded",
                "source" => name,
                "size" => result.metadata.human_readable_size(),
                "lines" => result.metadata.line_count,
                "chars" => result.char_count(),
                "duration_ms" => format!("{:.2}", result.processing_duration.as_secs_f64() * 1000.0),
                "chars_per_ms" => format!("{:.2}", result.processing_rate()),
                "large" => result.metadata.is_large_file()
            );
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Source loaded",
                "source" => name,
                "lines" => result.metadata.line_count
            );
        }
        result
    }
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_valid_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.sc");
        let content = "int main() {\n  return 0;\n}\n";
        fs::write(&file_path, content).unwrap();

        let processor = FileProcessor::new();
        let result = processor.process_file(file_path.to_str().unwrap()).unwrap();

        assert_eq!(result.metadata.line_count, 3);
        assert!(result.metadata.is_source_file);
        assert_eq!(result.metadata.extension.as_deref(), Some("sc"));
        assert_eq!(result.char_count(), content.chars().count());
        assert!(!result.is_effectively_empty());
    }

    #[test]
    fn test_file_not_found() {
        let processor = FileProcessor::new();
        let result = processor.process_file("nonexistent.sc");
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempdir().unwrap();
        let processor = FileProcessor::new();
        let result = processor.process_file(dir.path().to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::InvalidPath { .. }));
    }

    #[test]
    fn test_runtime_size_limit() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("big.sc");
        fs::write(&file_path, "x".repeat(64)).unwrap();

        let processor = FileProcessor::new().with_max_file_size(32);
        let result = processor.process_file(file_path.to_str().unwrap());
        assert_matches!(
            result,
            Err(FileProcessorError::FileTooLarge { size: 64, max_size: 32 })
        );
    }

    #[test]
    fn test_size_limit_is_capped_at_compile_time_maximum() {
        let processor = FileProcessor::new().with_max_file_size(u64::MAX);
        assert_eq!(processor.max_file_size, MAX_FILE_SIZE);
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");
        fs::write(&file_path, "int x;").unwrap();

        let processor = FileProcessor::new().with_source_extension_required(true);
        let result = processor.process_file(file_path.to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::InvalidExtension { .. }));
    }

    #[test]
    fn test_all_source_extensions_recognized() {
        for ext in SOURCE_EXTENSIONS {
            let name = format!("prog.{}", ext);
            assert!(has_source_extension(Path::new(&name)), "{}", name);
        }
        assert!(has_source_extension(Path::new("PROG.SY")));
        assert!(!has_source_extension(Path::new("prog.h")));
        assert!(!has_source_extension(Path::new("prog")));
    }

    #[test]
    fn test_empty_file_accepted_by_default() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("empty.sc");
        fs::write(&file_path, "").unwrap();

        let result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();
        assert!(result.source.is_empty());

        let strict = FileProcessor::new().with_empty_files_rejected(true);
        assert_matches!(
            strict.process_file(file_path.to_str().unwrap()),
            Err(FileProcessorError::EmptyFile)
        );
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("latin1.sc");
        fs::write(&file_path, b"int caf\xe9 = 1; /* caf\xe9 */\n").unwrap();

        let result = FileProcessor::new()
            .process_file(file_path.to_str().unwrap())
            .unwrap();
        assert!(result.metadata.lossy_utf8);
        assert_eq!(result.source, "int caf\u{FFFD} = 1; /* caf\u{FFFD} */\n");

        let stream = crate::tokenize(&result.source);
        let kinds: Vec<_> = stream.iter().map(|t| t.symbolic_name()).collect();
        assert_eq!(kinds, vec!["INT", "ID", "ERROR", "ASG", "NUM", "SCO", "EOF"]);
        assert_matches!(
            stream[2].kind(),
            crate::TokenKind::Error(crate::ErrorReason::InvalidCharacter)
        );
        assert_eq!(stream[2].text(), "\u{FFFD}");
    }

    #[test]
    fn test_process_reader() {
        let input = "int a = 1;\n".as_bytes();
        let result = FileProcessor::new().process_reader(input, "<stdin>").unwrap();
        assert_eq!(result.source, "int a = 1;\n");
        assert_eq!(result.metadata.path, PathBuf::from("<stdin>"));
        assert_eq!(result.metadata.line_count, 1);
    }

    #[test]
    fn test_process_reader_limits() {
        let processor = FileProcessor::new().with_max_file_size(4);
        assert_matches!(
            processor.process_reader("0123456789".as_bytes(), "<stdin>"),
            Err(FileProcessorError::FileTooLarge { size: 5, max_size: 4 })
        );

        let lossy = FileProcessor::new()
            .process_reader(&[0x61u8, 0xff, 0x62][..], "<stdin>")
            .unwrap();
        assert_eq!(lossy.source, "a\u{FFFD}b");
        assert!(lossy.metadata.lossy_utf8);
    }

    #[test]
    fn test_from_source() {
        let result = FileProcessingResult::from_source("demo.sy", "a\nb".to_string());
        assert!(result.metadata.is_source_file);
        assert_eq!(result.metadata.line_count, 2);
        assert_eq!(result.metadata.size, 3);
    }

    #[test]
    fn test_error_methods() {
        let error = FileProcessorError::FileNotFound {
            path: "test.sc".to_string(),
        };

        assert_eq!(error.error_code().as_str(), "E005");
        assert_eq!(error.category(), "FileProcessing");
        assert_eq!(error.severity(), "High");
        assert!(!error.is_recoverable());
        assert!(error.requires_halt());

        let lines = FileProcessorError::TooManyLines {
            lines: 10,
            max_lines: 5,
        };
        assert_eq!(lines.error_code().as_str(), "E013");
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_source_extension: true,
            enable_performance_logging: false,
            max_file_size: Some(1024),
        };

        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_source_extension);
        assert!(!processor.enable_performance_logging);
        assert_eq!(processor.max_file_size, 1024);
    }

    #[test]
    fn test_human_readable_size() {
        let mut result = FileProcessingResult::from_source("a.sc", String::new());
        result.metadata.size = 2048;
        assert_eq!(result.metadata.human_readable_size(), "2.00 KB");
        result.metadata.size = 12;
        assert_eq!(result.metadata.human_readable_size(), "12 B");
    }
}
