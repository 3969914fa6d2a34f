//! Immutable, indexable token sequence with parser-style navigation
//!
//! A `TokenStream` is produced once per analyzer run and never changes
//! afterwards. Parsers walk it through a `TokenCursor`, which borrows the
//! stream and supports lookahead and backtracking by index.

use crate::tokens::token::{Token, TokenKind, TokenRecord};
use crate::utils::{SourceMap, Span};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Kind of skipped, non-significant input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriviaKind {
    Whitespace,
    LineComment,
    BlockComment,
}

/// A run of input consumed without producing a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriviaSpan {
    pub kind: TriviaKind,
    pub span: Span,
}

impl TriviaSpan {
    pub fn new(kind: TriviaKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}

/// The complete result of lexing one input buffer
#[derive(Debug, Clone, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
    trivia: Vec<TriviaSpan>,
    source_len: usize,
}

impl TokenStream {
    /// Assemble a stream from scanner output. `tokens` must already carry
    /// contiguous indices and end with the end-of-input token.
    pub(crate) fn from_parts(
        tokens: Vec<Token>,
        trivia: Vec<TriviaSpan>,
        source_len: usize,
    ) -> Self {
        Self {
            tokens,
            trivia,
            source_len,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Skipped whitespace and comment spans in source order
    pub fn trivia(&self) -> &[TriviaSpan] {
        &self.trivia
    }

    /// Length of the lexed input in characters
    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// The terminal end-of-input token, if the stream is well formed
    pub fn eof(&self) -> Option<&Token> {
        self.tokens.last().filter(|token| token.is_eof())
    }

    pub fn error_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|token| token.is_error())
    }

    pub fn has_errors(&self) -> bool {
        self.tokens.iter().any(Token::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.error_tokens().count()
    }

    /// Tokens other than end-of-input
    pub fn significant_len(&self) -> usize {
        self.tokens.iter().filter(|token| !token.is_eof()).count()
    }

    /// One `[@index,start:stop='text',<KIND>,line:column]` line per token
    pub fn render(&self) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&token.render());
            out.push('\n');
        }
        out
    }

    pub fn records(&self) -> Vec<TokenRecord> {
        self.tokens.iter().map(TokenRecord::from).collect()
    }

    /// Diagnostics for every error token, formatted against `source_map`
    pub fn format_errors(&self, source_map: &SourceMap) -> String {
        self.error_tokens()
            .map(|token| {
                let reason = token
                    .kind()
                    .error_reason()
                    .map(|r| r.description())
                    .unwrap_or("error");
                source_map.format_error(&token.span(), &format!("{} '{}'", reason, token.text()))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn cursor(&self) -> TokenCursor<'_> {
        TokenCursor::new(self)
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Read-only navigation over a `TokenStream`
///
/// The cursor never moves past the end-of-input token, so `current` always
/// returns a token on a well-formed stream.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    stream: &'a TokenStream,
    position: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(stream: &'a TokenStream) -> Self {
        Self {
            stream,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> Option<&'a Token> {
        self.stream.get(self.position)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(Token::kind)
    }

    /// Token `offset` positions ahead of the current one
    pub fn peek_ahead(&self, offset: usize) -> Option<&'a Token> {
        self.stream.get(self.position + offset)
    }

    /// Move to the next token and return the one just left behind
    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.current()?;
        if !token.is_eof() && self.position + 1 < self.stream.len() {
            self.position += 1;
        }
        Some(token)
    }

    pub fn is_at_end(&self) -> bool {
        self.current().map_or(true, Token::is_eof)
    }

    /// Save current position as checkpoint for backtracking
    pub fn save_position(&self) -> usize {
        self.position
    }

    /// Restore position from checkpoint
    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.stream.len().saturating_sub(1));
    }

    pub fn lookahead_tokens(&self, count: usize) -> Vec<&'a Token> {
        (0..count)
            .filter_map(|offset| self.peek_ahead(offset))
            .collect()
    }

    pub fn check_kind(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Consume the current token if it matches predicate
    pub fn consume_if<F>(&mut self, predicate: F) -> Option<&'a Token>
    where
        F: FnOnce(&Token) -> bool,
    {
        match self.current() {
            Some(token) if !token.is_eof() && predicate(token) => self.advance(),
            _ => None,
        }
    }

    /// Consume a token of exactly `kind`, or report what was found instead
    pub fn expect_kind(&mut self, kind: TokenKind) -> Result<&'a Token, TokenStreamError> {
        match self.current() {
            Some(token) if token.kind() == kind => {
                self.advance();
                Ok(token)
            }
            Some(token) if token.is_eof() => Err(TokenStreamError::UnexpectedEndOfStream {
                expected: kind.symbolic_name().to_string(),
            }),
            Some(token) => Err(TokenStreamError::UnexpectedToken {
                expected: kind.symbolic_name().to_string(),
                found: token.symbolic_name().to_string(),
                span: token.span(),
            }),
            None => Err(TokenStreamError::UnexpectedEndOfStream {
                expected: kind.symbolic_name().to_string(),
            }),
        }
    }

    /// Skip forward until the current token satisfies `predicate` or the
    /// end of input is reached. Returns the number of tokens skipped.
    pub fn skip_until<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Token) -> bool,
    {
        let mut skipped = 0;
        while let Some(token) = self.current() {
            if token.is_eof() || predicate(token) {
                break;
            }
            self.position += 1;
            skipped += 1;
        }
        skipped
    }
}

/// Token stream navigation and integrity errors
#[derive(Debug, Clone, PartialEq)]
pub enum TokenStreamError {
    /// Unexpected token found at span
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    /// Unexpected end of stream
    UnexpectedEndOfStream { expected: String },
    /// A structural invariant of the stream does not hold
    InvariantViolation { message: String, index: usize },
}

impl std::fmt::Display for TokenStreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken {
                expected,
                found,
                span,
            } => {
                write!(f, "Expected '{}', found '{}' at {}", expected, found, span)
            }
            Self::UnexpectedEndOfStream { expected } => {
                write!(f, "Expected '{}', but reached end of input", expected)
            }
            Self::InvariantViolation { message, index } => {
                write!(f, "Token stream invariant violated at token {}: {}", index, message)
            }
        }
    }
}

impl std::error::Error for TokenStreamError {}

/// Structural checks over a produced stream
pub mod validation {
    use super::*;

    fn violation(index: usize, message: String) -> TokenStreamError {
        TokenStreamError::InvariantViolation { message, index }
    }

    /// `tokens[i].index() == i` for every token
    pub fn validate_index_contiguity(tokens: &[Token]) -> Result<(), TokenStreamError> {
        for (position, token) in tokens.iter().enumerate() {
            if token.index() != position {
                return Err(violation(
                    position,
                    format!("token carries index {}", token.index()),
                ));
            }
        }
        Ok(())
    }

    /// Tokens are strictly ordered by start offset and never overlap
    pub fn validate_span_order(tokens: &[Token]) -> Result<(), TokenStreamError> {
        for window in tokens.windows(2) {
            let current = window[0].span();
            let next = window[1].span();

            if current.end.offset > next.start.offset {
                return Err(violation(
                    window[1].index(),
                    format!(
                        "token ending at {} overlaps next token starting at {}",
                        current.end.offset, next.start.offset
                    ),
                ));
            }
            if !window[1].is_eof() && current.start.offset >= next.start.offset {
                return Err(violation(
                    window[1].index(),
                    format!(
                        "start offset {} does not follow {}",
                        next.start.offset, current.start.offset
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Exactly one end-of-input token, last, at `source_len`
    pub fn validate_end_of_input(stream: &TokenStream) -> Result<(), TokenStreamError> {
        let eof_count = stream.iter().filter(|token| token.is_eof()).count();
        if eof_count != 1 {
            return Err(violation(
                stream.len(),
                format!("expected one end-of-input token, found {}", eof_count),
            ));
        }
        match stream.last() {
            Some(last) if last.is_eof() => {
                if last.start_offset() != stream.source_len()
                    || last.end_offset() != stream.source_len()
                {
                    return Err(violation(
                        last.index(),
                        format!(
                            "end-of-input at {}:{} but input length is {}",
                            last.start_offset(),
                            last.end_offset(),
                            stream.source_len()
                        ),
                    ));
                }
                Ok(())
            }
            Some(last) => Err(violation(
                last.index(),
                "last token is not end-of-input".to_string(),
            )),
            None => Err(violation(0, "stream is empty".to_string())),
        }
    }

    /// Token spans plus trivia spans cover `[0, source_len)` with no gap
    /// or overlap
    pub fn validate_coverage(stream: &TokenStream) -> Result<(), TokenStreamError> {
        let mut pieces: Vec<(usize, usize, usize)> = stream
            .iter()
            .filter(|token| !token.span().is_empty())
            .map(|token| (token.start_offset(), token.span().end.offset, token.index()))
            .chain(
                stream
                    .trivia()
                    .iter()
                    .filter(|trivia| !trivia.is_empty())
                    .map(|trivia| (trivia.span.start.offset, trivia.span.end.offset, usize::MAX)),
            )
            .collect();
        pieces.sort_by_key(|&(start, _, _)| start);

        let mut covered = 0;
        for (start, end, index) in pieces {
            let index = if index == usize::MAX { stream.len() } else { index };
            if start != covered {
                let what = if start > covered { "gap" } else { "overlap" };
                return Err(violation(
                    index,
                    format!("{} between offsets {} and {}", what, covered, start),
                ));
            }
            covered = end;
        }

        if covered != stream.source_len() {
            return Err(violation(
                stream.len(),
                format!(
                    "coverage ends at {} but input length is {}",
                    covered,
                    stream.source_len()
                ),
            ));
        }
        Ok(())
    }

    /// Run every structural check
    pub fn validate_token_stream(stream: &TokenStream) -> Result<(), TokenStreamError> {
        validate_index_contiguity(stream.tokens())?;
        validate_span_order(stream.tokens())?;
        validate_end_of_input(stream)?;
        validate_coverage(stream)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::validation::*;
    use super::*;
    use crate::grammar::keywords::Keyword;
    use crate::grammar::operators::{OperatorKind, PunctuationKind};
    use crate::utils::Position;
    use assert_matches::assert_matches;

    fn span(start: usize, end: usize) -> Span {
        Span::new(
            Position::new(start, 1, start as u32 + 1),
            Position::new(end, 1, end as u32 + 1),
        )
    }

    // "int a;" lexed by hand
    fn sample_stream() -> TokenStream {
        let tokens = vec![
            Token::new(TokenKind::Keyword(Keyword::Int), "int".into(), span(0, 3), 0),
            Token::new(TokenKind::Identifier, "a".into(), span(4, 5), 1),
            Token::new(
                TokenKind::Punctuation(PunctuationKind::Semicolon),
                ";".into(),
                span(5, 6),
                2,
            ),
            Token::end_of_input(Position::new(6, 1, 7), 3),
        ];
        let trivia = vec![TriviaSpan::new(TriviaKind::Whitespace, span(3, 4))];
        TokenStream::from_parts(tokens, trivia, 6)
    }

    #[test]
    fn test_indexing_and_eof() {
        let stream = sample_stream();
        assert_eq!(stream.len(), 4);
        assert_eq!(stream[1].text(), "a");
        assert!(stream.eof().is_some());
        assert_eq!(stream.significant_len(), 3);
        assert!(!stream.has_errors());
        assert!(validate_token_stream(&stream).is_ok());
    }

    #[test]
    fn test_render_lines() {
        let rendered = sample_stream().render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "[@0,0:2='int',<INT>,1:1]");
        assert_eq!(lines[1], "[@1,4:4='a',<ID>,1:5]");
        assert_eq!(lines[2], "[@2,5:5=';',<SCO>,1:6]");
        assert_eq!(lines[3], "[@3,6:6='<EOF>',<EOF>,1:7]");
    }

    #[test]
    fn test_cursor_navigation_and_backtracking() {
        let stream = sample_stream();
        let mut cursor = stream.cursor();
        assert!(cursor.check_kind(TokenKind::Keyword(Keyword::Int)));
        let checkpoint = cursor.save_position();
        cursor.advance();
        assert_eq!(cursor.current().map(Token::text), Some("a"));
        assert_eq!(cursor.peek_ahead(1).map(Token::symbolic_name), Some("SCO"));
        cursor.restore_position(checkpoint);
        assert_eq!(cursor.position(), 0);
        assert_eq!(cursor.lookahead_tokens(10).len(), 4);
    }

    #[test]
    fn test_cursor_stops_at_eof() {
        let stream = sample_stream();
        let mut cursor = stream.cursor();
        for _ in 0..10 {
            cursor.advance();
        }
        assert!(cursor.is_at_end());
        assert_eq!(cursor.position(), 3);
        assert!(cursor.consume_if(|_| true).is_none());
    }

    #[test]
    fn test_expect_kind_errors() {
        let stream = sample_stream();
        let mut cursor = stream.cursor();
        assert_matches!(
            cursor.expect_kind(TokenKind::Operator(OperatorKind::Assign)),
            Err(TokenStreamError::UnexpectedToken { ref found, .. }) if found == "INT"
        );
        assert!(cursor.expect_kind(TokenKind::Keyword(Keyword::Int)).is_ok());
        cursor.skip_until(|t| t.is_eof());
        assert_matches!(
            cursor.expect_kind(TokenKind::Identifier),
            Err(TokenStreamError::UnexpectedEndOfStream { .. })
        );
    }

    #[test]
    fn test_validation_detects_gap() {
        let stream = sample_stream();
        let without_trivia = TokenStream::from_parts(stream.tokens().to_vec(), vec![], 6);
        assert_matches!(
            validate_coverage(&without_trivia),
            Err(TokenStreamError::InvariantViolation { index: 1, .. })
        );
    }

    #[test]
    fn test_validation_detects_bad_index() {
        let mut tokens = sample_stream().tokens().to_vec();
        tokens.swap(0, 1);
        assert!(validate_index_contiguity(&tokens).is_err());
        assert!(validate_span_order(&tokens).is_err());
    }

    #[test]
    fn test_validation_requires_single_trailing_eof() {
        let tokens = sample_stream().tokens()[..3].to_vec();
        let stream = TokenStream::from_parts(tokens, vec![], 6);
        assert!(validate_end_of_input(&stream).is_err());
    }
}
