//! Loading Sub-C sources from disk or standard input

mod processor;

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes::file_processing as file_codes;
pub use processor::{
    has_source_extension, FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError,
    SOURCE_EXTENSIONS,
};

/// Load a file with the default processor
pub fn process_file(file_path: &str) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Read a whole source from standard input under the environment's preferences
pub fn process_stdin() -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::from_preferences(&FileProcessorPreferences::default())
        .process_reader(std::io::stdin().lock(), "<stdin>")
}

/// Compile-time ceiling; runtime preferences may only lower it
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

/// Startup check that every file-processing code is registered
pub fn init_file_processor_logging() -> Result<(), String> {
    let required = [
        file_codes::FILE_NOT_FOUND,
        file_codes::INVALID_EXTENSION,
        file_codes::FILE_TOO_LARGE,
        file_codes::EMPTY_FILE,
        file_codes::PERMISSION_DENIED,
        file_codes::INVALID_ENCODING,
        file_codes::IO_ERROR,
        file_codes::INVALID_PATH,
        file_codes::TOO_MANY_LINES,
    ];
    if let Some(code) = required.iter().find(|code| code.metadata().is_none()) {
        return Err(format!("File processor code {} is not registered", code));
    }

    crate::log_debug!("File processor limits loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT_FOR_ANALYSIS,
        "extensions" => SOURCE_EXTENSIONS.join(","));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_process_file_with_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.sc");
        fs::write(&file_path, "int x;\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.source, "int x;\n");
        assert!(result.metadata.is_source_file);
    }

    #[test]
    fn test_missing_file_halts() {
        let error = process_file("does/not/exist.sc").unwrap_err();
        assert_matches!(error, FileProcessorError::FileNotFound { .. });
        assert!(error.requires_halt());
        assert_eq!(error.error_code(), file_codes::FILE_NOT_FOUND);
    }

    #[test]
    fn test_limits() {
        assert_eq!(get_max_file_size(), MAX_FILE_SIZE);
        assert!(LARGE_FILE_THRESHOLD <= get_max_file_size());
        assert!(MAX_LINE_COUNT_FOR_ANALYSIS > 0);
    }

    #[test]
    fn test_init_logging() {
        assert!(init_file_processor_logging().is_ok());
    }
}
