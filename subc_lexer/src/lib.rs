//! Error-tolerant lexical analyzer for the Sub-C teaching language.
//!
//! ```no_run
//! let stream = subc_lexer::tokenize("int a = 1;\n");
//! print!("{}", stream.render());
//! ```

// Internal modules
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use file_processor::{FileProcessingResult, FileProcessorError};
pub use grammar::Lexicon;
pub use lexical::{LexerError, LexicalAnalyzer};
pub use tokens::{ErrorReason, Token, TokenKind, TokenStream};

/// Lex `source` with the shared lexicon, without logging.
///
/// Total over every input: the result always ends in exactly one
/// end-of-input token, with malformed regions as error tokens.
pub fn tokenize(source: &str) -> TokenStream {
    lexical::scan(source, &Lexicon::shared())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_entry_point() {
        let stream = tokenize("if ifx");
        assert_eq!(stream.len(), 3);
        assert_eq!(stream[0].symbolic_name(), "IF");
        assert_eq!(stream[1].kind(), TokenKind::Identifier);
        assert!(stream[2].is_eof());
    }

    #[test]
    fn test_tokenize_unterminated_string() {
        let stream = tokenize("\"abc");
        assert_eq!(stream.len(), 2);
        assert_eq!(
            stream[0].kind(),
            TokenKind::Error(ErrorReason::UnterminatedLiteral)
        );
        assert!(stream[1].is_eof());
    }
}
