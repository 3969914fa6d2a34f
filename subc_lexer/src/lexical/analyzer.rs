//! Lexical analyzer with metrics, logging and optional strictness
//!
//! Scanning itself is total: every input produces a complete stream. The
//! analyzer wraps the scanner with per-run metrics, logs each error token
//! under its code, warns about oversized lexemes, and, when the caller asks
//! for it, turns a stream containing error tokens into `Err`.

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::grammar::Lexicon;
use crate::lexical::produce;
use crate::lexical::scanner::Scanner;
use crate::logging::codes;
use crate::tokens::{ErrorReason, Token, TokenKind, TokenStream, TriviaKind};
use crate::{log_debug, log_error, log_info, log_success, log_warning};
use std::collections::HashMap;
use std::sync::Arc;

/// Lexical diagnostics. The first four mirror error tokens; the last one
/// is the strict-mode failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{text}' at line {line}, column {column}")]
    InvalidCharacter { text: String, line: u32, column: u32 },

    #[error("Unterminated literal {text} at line {line}, column {column}")]
    UnterminatedLiteral { text: String, line: u32, column: u32 },

    #[error("Unterminated block comment starting at line {line}, column {column}")]
    UnterminatedComment { line: u32, column: u32 },

    #[error("Malformed numeric literal '{text}' at line {line}, column {column}")]
    MalformedNumericLiteral { text: String, line: u32, column: u32 },

    #[error("Token stream contains {count} error token(s); first: {first}")]
    ErrorTokensPresent { count: usize, first: Box<LexerError> },
}

impl LexerError {
    /// Diagnostic for an error token; `None` for any other token
    pub fn from_token(token: &Token) -> Option<Self> {
        let line = token.line();
        let column = token.column();
        let text = token.text().to_string();
        let error = match token.kind().error_reason()? {
            ErrorReason::InvalidCharacter => Self::InvalidCharacter { text, line, column },
            ErrorReason::UnterminatedLiteral => Self::UnterminatedLiteral { text, line, column },
            ErrorReason::UnterminatedComment => Self::UnterminatedComment { line, column },
            ErrorReason::MalformedNumericLiteral => {
                Self::MalformedNumericLiteral { text, line, column }
            }
        };
        Some(error)
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedLiteral { .. } => codes::lexical::UNTERMINATED_LITERAL,
            LexerError::UnterminatedComment { .. } => codes::lexical::UNTERMINATED_COMMENT,
            LexerError::MalformedNumericLiteral { .. } => {
                codes::lexical::MALFORMED_NUMERIC_LITERAL
            }
            LexerError::ErrorTokensPresent { .. } => codes::lexical::ERROR_TOKENS_PRESENT,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// Diagnostics for every error token in `stream`, in stream order
pub fn collect_diagnostics(stream: &TokenStream) -> Vec<LexerError> {
    stream.iter().filter_map(LexerError::from_token).collect()
}

/// Per-run lexical metrics
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub error_tokens: usize,
    pub comment_count: usize,
    pub max_identifier_length: usize,
    pub max_string_length: usize,
    pub max_comment_length: usize,

    // Only filled when detailed metrics are enabled
    pub kind_usage: HashMap<&'static str, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        if token.is_eof() {
            return;
        }
        self.total_tokens += 1;
        let length = token.text().chars().count();

        match token.kind() {
            TokenKind::Keyword(_) => self.keyword_tokens += 1,
            TokenKind::Identifier => {
                self.identifier_tokens += 1;
                self.max_identifier_length = self.max_identifier_length.max(length);
            }
            TokenKind::StringLiteral => {
                self.literal_tokens += 1;
                self.max_string_length = self.max_string_length.max(length);
            }
            TokenKind::IntegerLiteral(_) | TokenKind::FloatLiteral | TokenKind::CharLiteral => {
                self.literal_tokens += 1
            }
            TokenKind::Operator(_) => self.operator_tokens += 1,
            TokenKind::Punctuation(_) => self.punctuation_tokens += 1,
            TokenKind::Error(reason) => {
                self.error_tokens += 1;
                if reason == ErrorReason::UnterminatedComment {
                    self.comment_count += 1;
                    self.max_comment_length = self.max_comment_length.max(length);
                }
            }
            TokenKind::EndOfInput => {}
        }

        if preferences.collect_detailed_metrics {
            *self.kind_usage.entry(token.symbolic_name()).or_insert(0) += 1;
        }
    }

    pub(crate) fn record_comment_length(&mut self, length: usize) {
        self.comment_count += 1;
        self.max_comment_length = self.max_comment_length.max(length);
    }
}

/// Lexical analyzer sharing one read-only `Lexicon`
pub struct LexicalAnalyzer {
    lexicon: Arc<Lexicon>,
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_lexicon(Lexicon::shared())
    }

    /// Analyzer over an existing lexicon, e.g. one shared across threads
    pub fn with_lexicon(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            metrics: LexicalMetrics::default(),
            preferences: LexicalPreferences::default(),
        }
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            lexicon: Lexicon::shared(),
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    /// Tokenize a complete source buffer
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        log_debug!("Starting lexical analysis",
            "char_count" => source.chars().count(),
            "max_identifier_length" => MAX_IDENTIFIER_LENGTH
        );

        let stream = produce(Scanner::new(source, &self.lexicon));

        for token in stream.iter() {
            self.metrics.record_token(token, &self.preferences);
        }
        for trivia in stream.trivia() {
            if matches!(trivia.kind, TriviaKind::LineComment | TriviaKind::BlockComment) {
                self.metrics.record_comment_length(trivia.len());
                if self.preferences.warn_long_lexemes && trivia.len() > MAX_COMMENT_LENGTH {
                    log_warning!(codes::lexical::COMMENT_TOO_LONG,
                        "Comment exceeds configured length",
                        span = trivia.span,
                        "length" => trivia.len(),
                        "limit" => MAX_COMMENT_LENGTH
                    );
                }
            }
        }

        if self.preferences.warn_long_lexemes {
            self.warn_long_lexemes(&stream);
        }
        if self.preferences.log_error_tokens {
            self.log_error_tokens(&stream);
        }

        if stream.has_errors() && self.preferences.fail_on_error_tokens {
            let count = stream.error_count();
            let first = stream
                .error_tokens()
                .find_map(LexerError::from_token)
                .map(Box::new);
            if let Some(first) = first {
                let error = LexerError::ErrorTokensPresent { count, first };
                log_error!(error.error_code(), "Token stream rejected in strict mode",
                    "error_tokens" => count
                );
                return Err(error);
            }
        }

        log_success!(codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed",
            "token_count" => stream.len(),
            "keywords" => self.metrics.keyword_tokens,
            "identifiers" => self.metrics.identifier_tokens,
            "literals" => self.metrics.literal_tokens,
            "operators" => self.metrics.operator_tokens,
            "comments" => self.metrics.comment_count,
            "error_tokens" => self.metrics.error_tokens
        );

        Ok(stream)
    }

    /// Tokenize a loaded file, tagging log output with its path
    pub fn tokenize_file_result(
        &mut self,
        file_result: &FileProcessingResult,
    ) -> Result<TokenStream, LexerError> {
        let file_path = file_result.metadata.path.display().to_string();
        log_debug!("Tokenizing file",
            "file" => file_path.as_str(),
            "line_count" => file_result.metadata.line_count,
            "file_size_bytes" => file_result.metadata.size
        );

        let stream = self.tokenize(&file_result.source)?;

        if !stream.has_errors() {
            log_success!(codes::success::LEXICAL_VALIDATION_PASSED,
                "No error tokens in file",
                "file" => file_path.as_str(),
                "token_count" => stream.len()
            );
        }
        Ok(stream)
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    fn warn_long_lexemes(&self, stream: &TokenStream) {
        for token in stream.iter() {
            let length = token.text().chars().count();
            match token.kind() {
                TokenKind::Identifier if length > MAX_IDENTIFIER_LENGTH => {
                    log_warning!(codes::lexical::IDENTIFIER_TOO_LONG,
                        "Identifier exceeds configured length",
                        span = token.span(),
                        "length" => length,
                        "limit" => MAX_IDENTIFIER_LENGTH
                    );
                }
                TokenKind::StringLiteral if length > MAX_STRING_SIZE => {
                    log_warning!(codes::lexical::STRING_TOO_LARGE,
                        "String literal exceeds configured size",
                        span = token.span(),
                        "length" => length,
                        "limit" => MAX_STRING_SIZE
                    );
                }
                _ => {}
            }
        }
    }

    fn log_error_tokens(&self, stream: &TokenStream) {
        let mut reported = 0;
        for token in stream.error_tokens() {
            if reported >= MAX_ERROR_TOKENS_REPORTED {
                log_info!("Further error tokens not logged",
                    "remaining" => stream.error_count() - reported
                );
                break;
            }
            if let Some(error) = LexerError::from_token(token) {
                log_error!(error.error_code(), &error.to_string(),
                    span = token.span(),
                    "text" => token.text().escape_debug(),
                    "index" => token.index()
                );
                reported += 1;
            }
        }
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn quiet_preferences() -> LexicalPreferences {
        LexicalPreferences {
            fail_on_error_tokens: false,
            warn_long_lexemes: true,
            log_error_tokens: true,
            collect_detailed_metrics: true,
        }
    }

    #[test]
    fn test_tokenize_collects_metrics() {
        let mut analyzer = LexicalAnalyzer::with_preferences(quiet_preferences());
        let stream = analyzer
            .tokenize("int main() { return 0; } // done")
            .unwrap();
        assert_eq!(stream.len(), 10);
        let metrics = analyzer.metrics();
        assert_eq!(metrics.keyword_tokens, 2);
        assert_eq!(metrics.identifier_tokens, 1);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.punctuation_tokens, 5);
        assert_eq!(metrics.comment_count, 1);
        assert_eq!(metrics.kind_usage.get("LPA"), Some(&1));
    }

    #[test]
    fn test_error_tokens_are_tolerated_by_default() {
        let mut analyzer = LexicalAnalyzer::with_preferences(quiet_preferences());
        let stream = analyzer.tokenize("a @ b").unwrap();
        assert!(stream.has_errors());
        assert_eq!(analyzer.metrics().error_tokens, 1);
    }

    #[test]
    fn test_strict_mode_rejects_error_tokens() {
        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences {
            fail_on_error_tokens: true,
            ..quiet_preferences()
        });
        let error = analyzer.tokenize("x = \"open").unwrap_err();
        assert_eq!(error.error_code().as_str(), "E024");
        assert!(error.requires_halt());
        match error {
            LexerError::ErrorTokensPresent { count, first } => {
                assert_eq!(count, 1);
                assert_matches!(*first, LexerError::UnterminatedLiteral { .. });
            }
            other => panic!("Expected ErrorTokensPresent, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_accepts_clean_input() {
        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences {
            fail_on_error_tokens: true,
            ..quiet_preferences()
        });
        assert!(analyzer.tokenize("while (i < 10) i++;").is_ok());
    }

    #[test]
    fn test_diagnostics_follow_stream_order() {
        let mut analyzer = LexicalAnalyzer::with_preferences(quiet_preferences());
        let stream = analyzer.tokenize("08 $\n/* open").unwrap();
        let diagnostics = collect_diagnostics(&stream);
        assert_eq!(diagnostics.len(), 3);
        assert_matches!(diagnostics[0], LexerError::MalformedNumericLiteral { column: 1, .. });
        assert_matches!(diagnostics[1], LexerError::InvalidCharacter { column: 4, .. });
        assert_matches!(diagnostics[2], LexerError::UnterminatedComment { line: 2, column: 1 });
        assert_eq!(diagnostics[1].error_code().as_str(), "E020");
        assert!(!diagnostics[1].requires_halt());
    }

    #[test]
    fn test_shared_lexicon_is_reused() {
        let lexicon = Lexicon::shared();
        let analyzer = LexicalAnalyzer::with_lexicon(Arc::clone(&lexicon));
        assert!(Arc::ptr_eq(analyzer.lexicon(), &lexicon));
    }
}
