//! Diagnostic codes and the metadata attached to each one
//!
//! `E0xx` codes are errors, `W0xx` warnings and `I0xx` success events. The
//! decade names the stage: 00 file loading, 20 lexing, 30 batch driving.

use std::fmt;

/// A diagnostic code such as `E020`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Registered metadata, `None` for ad-hoc codes like `W000`
    pub fn metadata(&self) -> Option<&'static ErrorMetadata> {
        get_error_metadata(self.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Stage of the pipeline a code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    System,
    FileProcessing,
    Lexical,
    Batch,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::System => "System",
            Category::FileProcessing => "FileProcessing",
            Category::Lexical => "Lexical",
            Category::Batch => "Batch",
        }
    }
}

/// What a caller should do after seeing the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep going; the condition is local to one token or file
    Recoverable,
    /// Stop processing the current input
    Halt,
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorMetadata {
    pub code: Code,
    pub category: Category,
    pub severity: Severity,
    pub disposition: Disposition,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn recoverable(&self) -> bool {
        self.disposition == Disposition::Recoverable
    }

    pub fn requires_halt(&self) -> bool {
        self.disposition == Disposition::Halt
    }
}

/// Errors raised while reading a source before any lexing happens
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// One code per error-token reason, plus length warnings
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_LITERAL: Code = Code::new("E021");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E022");
    pub const MALFORMED_NUMERIC_LITERAL: Code = Code::new("E023");
    pub const ERROR_TOKENS_PRESENT: Code = Code::new("E024");

    pub const IDENTIFIER_TOO_LONG: Code = Code::new("W020");
    pub const STRING_TOO_LARGE: Code = Code::new("W021");
    pub const COMMENT_TOO_LONG: Code = Code::new("W022");
}

pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E030");
    pub const NO_SOURCE_FILES: Code = Code::new("E031");
    pub const TOO_MANY_FILES: Code = Code::new("E032");
    pub const WORKER_FAILURE: Code = Code::new("E033");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const LEXICAL_VALIDATION_PASSED: Code = Code::new("I021");
    pub const BATCH_PROCESSING_COMPLETE: Code = Code::new("I030");
}

const fn entry(
    code: Code,
    category: Category,
    severity: Severity,
    disposition: Disposition,
    description: &'static str,
    recommended_action: &'static str,
) -> ErrorMetadata {
    ErrorMetadata {
        code,
        category,
        severity,
        disposition,
        description,
        recommended_action,
    }
}

use Category::{Batch, FileProcessing, Lexical, System};
use Disposition::{Halt, Recoverable};
use Severity::{High, Low, Medium};

#[rustfmt::skip]
static REGISTRY: &[ErrorMetadata] = &[
    entry(file_processing::FILE_NOT_FOUND, FileProcessing, High, Halt,
        "Source file not found",
        "Verify the file path exists"),
    entry(file_processing::INVALID_EXTENSION, FileProcessing, Medium, Recoverable,
        "File does not have a recognized Sub-C extension",
        "Rename the file with a .sc, .src, .c or .sy extension"),
    entry(file_processing::FILE_TOO_LARGE, FileProcessing, High, Halt,
        "File exceeds maximum allowed size",
        "Split the source or raise max_file_size in the build profile"),
    entry(file_processing::EMPTY_FILE, FileProcessing, Low, Recoverable,
        "Source file is empty",
        "Add content to the file"),
    entry(file_processing::PERMISSION_DENIED, FileProcessing, High, Halt,
        "Permission denied reading source file",
        "Check file permissions"),
    entry(file_processing::INVALID_ENCODING, FileProcessing, Medium, Recoverable,
        "Source contains invalid UTF-8",
        "Re-encode the file as UTF-8; invalid bytes were lexed as U+FFFD"),
    entry(file_processing::IO_ERROR, FileProcessing, High, Halt,
        "I/O error while reading source",
        "Check disk and file system health"),
    entry(file_processing::INVALID_PATH, FileProcessing, Medium, Halt,
        "Invalid file path",
        "Provide a path to a regular file"),
    entry(file_processing::TOO_MANY_LINES, FileProcessing, Medium, Halt,
        "File exceeds maximum line count for analysis",
        "Split the source into smaller files"),
    entry(lexical::INVALID_CHARACTER, Lexical, Medium, Recoverable,
        "Character is not part of the Sub-C alphabet",
        "Remove the character or place it inside a string literal"),
    entry(lexical::UNTERMINATED_LITERAL, Lexical, Medium, Recoverable,
        "String or character literal is not terminated on its line",
        "Add the closing quote before the end of the line"),
    entry(lexical::UNTERMINATED_COMMENT, Lexical, Medium, Recoverable,
        "Block comment is not terminated before end of input",
        "Close the comment with */"),
    entry(lexical::MALFORMED_NUMERIC_LITERAL, Lexical, Medium, Recoverable,
        "Numeric literal is malformed",
        "Check digits against the literal's base and remove trailing letters"),
    entry(lexical::ERROR_TOKENS_PRESENT, Lexical, High, Halt,
        "Token stream contains error tokens and strict mode is enabled",
        "Fix the reported lexical errors or disable strict mode"),
    entry(lexical::IDENTIFIER_TOO_LONG, Lexical, Low, Recoverable,
        "Identifier exceeds the configured length limit",
        "Use a shorter identifier"),
    entry(lexical::STRING_TOO_LARGE, Lexical, Low, Recoverable,
        "String literal exceeds the configured size limit",
        "Move large data out of the source file"),
    entry(lexical::COMMENT_TOO_LONG, Lexical, Low, Recoverable,
        "Comment exceeds the configured length limit",
        "Shorten or split the comment"),
    entry(batch::DIRECTORY_NOT_FOUND, Batch, High, Halt,
        "Batch input directory not found",
        "Verify the directory path"),
    entry(batch::NO_SOURCE_FILES, Batch, Medium, Recoverable,
        "No Sub-C source files found",
        "Check the directory contents and extensions"),
    entry(batch::TOO_MANY_FILES, Batch, High, Halt,
        "Too many files for a single batch",
        "Reduce the batch size or raise max_files_per_batch"),
    entry(batch::WORKER_FAILURE, Batch, Medium, Recoverable,
        "Worker thread failed",
        "Re-run sequentially to isolate the failing file"),
    entry(success::SYSTEM_INITIALIZATION_COMPLETED, System, Low, Recoverable,
        "System initialization completed",
        "No action required"),
    entry(success::FILE_PROCESSING_SUCCESS, FileProcessing, Low, Recoverable,
        "File processed successfully",
        "No action required"),
    entry(success::TOKENIZATION_COMPLETE, Lexical, Low, Recoverable,
        "Tokenization completed",
        "Token stream ready for parsing"),
    entry(success::LEXICAL_VALIDATION_PASSED, Lexical, Low, Recoverable,
        "Token stream validation passed",
        "No action required"),
    entry(success::BATCH_PROCESSING_COMPLETE, Batch, Low, Recoverable,
        "Batch processing completed",
        "No action required"),
];

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    REGISTRY.iter().find(|metadata| metadata.code.as_str() == code)
}

/// Unregistered codes are treated as Medium
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code).map_or(Severity::Medium, |m| m.severity)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code).map_or(true, ErrorMetadata::recoverable)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code).map_or(false, ErrorMetadata::requires_halt)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code).map_or("Unknown error", |m| m.description)
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code).map_or("No specific action available", |m| m.recommended_action)
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code).map_or("Unknown", |m| m.category.as_str())
}
