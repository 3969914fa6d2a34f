//! Lexical analysis for Sub-C source text
//!
//! Pipeline inside one run:
//! `Cursor` (characters + positions) -> `trivia` (whitespace, comments) ->
//! `Scanner::next_token` (classification via the shared `Lexicon`) ->
//! `produce` (the immutable `TokenStream`).
//!
//! `scan` is the pure entry point. `LexicalAnalyzer` adds metrics, logging
//! and optional strict-mode rejection on top of it.

pub mod analyzer;
pub mod cursor;
pub mod literals;
pub mod scanner;
pub mod trivia;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::grammar::Lexicon;
use crate::tokens::{validation, TokenKind, TokenStream};

pub use analyzer::{collect_diagnostics, LexerError, LexicalAnalyzer, LexicalMetrics};
pub use scanner::Scanner;

/// Drain `scanner` through end-of-input into a stream
pub fn produce(mut scanner: Scanner<'_>) -> TokenStream {
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token();
        let done = token.is_eof();
        tokens.push(token);
        if done {
            break;
        }
    }
    let source_len = scanner.source_len();
    TokenStream::from_parts(tokens, scanner.into_trivia(), source_len)
}

/// Lex `source` with `lexicon`. No logging, never fails.
pub fn scan(source: &str, lexicon: &Lexicon) -> TokenStream {
    produce(Scanner::new(source, lexicon))
}

/// Tokenize file processing result with default preferences
pub fn tokenize_file_result(
    file_result: &FileProcessingResult,
) -> Result<TokenStream, LexerError> {
    let mut analyzer = LexicalAnalyzer::new();
    analyzer.tokenize_file_result(file_result)
}

/// Tokenize with custom runtime preferences
pub fn tokenize_file_result_with_preferences(
    file_result: &FileProcessingResult,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
    analyzer.tokenize_file_result(file_result)
}

pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

const LEXICAL_CODES: [crate::logging::Code; 8] = [
    crate::logging::codes::lexical::INVALID_CHARACTER,
    crate::logging::codes::lexical::UNTERMINATED_LITERAL,
    crate::logging::codes::lexical::UNTERMINATED_COMMENT,
    crate::logging::codes::lexical::MALFORMED_NUMERIC_LITERAL,
    crate::logging::codes::lexical::ERROR_TOKENS_PRESENT,
    crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
    crate::logging::codes::lexical::STRING_TOO_LARGE,
    crate::logging::codes::lexical::COMMENT_TOO_LONG,
];

/// Check that every lexical code is registered (for system startup)
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    for code in &LEXICAL_CODES {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_string_size" => MAX_STRING_SIZE,
        "max_comment_length" => MAX_COMMENT_LENGTH,
        "max_error_tokens_reported" => MAX_ERROR_TOKENS_REPORTED
    );

    Ok(())
}

/// Lex a fixed sample and verify the stream invariants hold
pub fn validate_tokenization() -> Result<(), String> {
    let lexicon = Lexicon::new();
    let sample = "int main() {\n  float x = 3.14e2; /* c */ x += 0x1A;\n  return 007;\n}\n";
    let stream = scan(sample, &lexicon);
    validation::validate_token_stream(&stream).map_err(|e| e.to_string())?;
    if stream.has_errors() {
        return Err("Self-check sample produced error tokens".to_string());
    }
    Ok(())
}

pub fn get_lexical_limits() -> LexicalLimits {
    LexicalLimits {
        max_identifier_length: MAX_IDENTIFIER_LENGTH,
        max_string_size: MAX_STRING_SIZE,
        max_comment_length: MAX_COMMENT_LENGTH,
        max_error_tokens_reported: MAX_ERROR_TOKENS_REPORTED,
    }
}

/// Compile-time lexical limits, for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalLimits {
    pub max_identifier_length: usize,
    pub max_string_size: usize,
    pub max_comment_length: usize,
    pub max_error_tokens_reported: usize,
}

pub fn get_token_counts(token_stream: &TokenStream) -> TokenCounts {
    let mut counts = TokenCounts::default();

    for token in token_stream.iter() {
        counts.total += 1;
        match token.kind() {
            TokenKind::Keyword(_) => counts.keywords += 1,
            TokenKind::Identifier => counts.identifiers += 1,
            TokenKind::IntegerLiteral(_) | TokenKind::FloatLiteral => counts.numbers += 1,
            TokenKind::StringLiteral | TokenKind::CharLiteral => counts.strings += 1,
            TokenKind::Operator(_) => counts.operators += 1,
            TokenKind::Punctuation(_) => counts.punctuation += 1,
            TokenKind::Error(_) => counts.errors += 1,
            TokenKind::EndOfInput => {}
        }
    }
    counts.trivia = token_stream.trivia().len();

    counts
}

/// Token distribution of one stream
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCounts {
    pub total: usize,
    pub keywords: usize,
    pub identifiers: usize,
    pub numbers: usize,
    pub strings: usize,
    pub operators: usize,
    pub punctuation: usize,
    pub errors: usize,
    pub trivia: usize,
}

impl TokenCounts {
    /// Tokens other than end-of-input
    pub fn significant_tokens(&self) -> usize {
        self.total.saturating_sub(1)
    }

    pub fn has_content(&self) -> bool {
        self.significant_tokens() > 0
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}
