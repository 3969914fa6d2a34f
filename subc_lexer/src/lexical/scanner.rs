//! Core scanning engine
//!
//! `Scanner::next_token` skips trivia, then classifies the next lexeme by its
//! first character: identifier/keyword, number, quoted literal, symbol, or
//! invalid character. Each call is a pure function of the remaining input,
//! so the same buffer always yields the same token sequence.

use crate::grammar::Lexicon;
use crate::lexical::cursor::Cursor;
use crate::lexical::literals;
use crate::lexical::trivia::{skip_trivia, TriviaOutcome};
use crate::tokens::{ErrorReason, Token, TokenKind, TriviaSpan};
use crate::utils::{Position, Span};

pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

pub fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Single-pass scanner over one input buffer
///
/// Borrows the lexicon read-only; the cursor and trivia log are owned, so a
/// scanner must not be shared between threads while scanning.
#[derive(Debug)]
pub struct Scanner<'a> {
    cursor: Cursor,
    lexicon: &'a Lexicon,
    next_index: usize,
    trivia: Vec<TriviaSpan>,
    finished: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &str, lexicon: &'a Lexicon) -> Self {
        Self {
            cursor: Cursor::new(source),
            lexicon,
            next_index: 0,
            trivia: Vec::new(),
            finished: false,
        }
    }

    /// Produce the next token. After end-of-input has been returned, further
    /// calls keep returning the same end-of-input token.
    pub fn next_token(&mut self) -> Token {
        if self.finished {
            return Token::end_of_input(
                self.cursor.position(),
                self.next_index.saturating_sub(1),
            );
        }

        if let TriviaOutcome::UnterminatedComment { start } =
            skip_trivia(&mut self.cursor, &mut self.trivia)
        {
            return self.finish(TokenKind::Error(ErrorReason::UnterminatedComment), start);
        }

        let start = self.cursor.position();
        let first = match self.cursor.first() {
            Some(ch) => ch,
            None => {
                self.finished = true;
                let token = Token::end_of_input(start, self.next_index);
                self.next_index += 1;
                return token;
            }
        };

        let kind = if is_identifier_start(first) {
            self.scan_word(start)
        } else if first.is_ascii_digit() {
            literals::scan_number(&mut self.cursor)
        } else if first == '"' || first == '\'' {
            literals::scan_quoted(&mut self.cursor)
        } else if let Some(symbol) = self.lexicon.operators().longest_match(self.cursor.remaining())
        {
            for _ in 0..symbol.len() {
                self.cursor.advance();
            }
            TokenKind::from_symbol(symbol)
        } else {
            self.cursor.advance();
            TokenKind::Error(ErrorReason::InvalidCharacter)
        };

        self.finish(kind, start)
    }

    /// Whether end-of-input has been produced
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Trivia skipped so far
    pub fn trivia(&self) -> &[TriviaSpan] {
        &self.trivia
    }

    pub fn source_len(&self) -> usize {
        self.cursor.len()
    }

    pub(crate) fn into_trivia(self) -> Vec<TriviaSpan> {
        self.trivia
    }

    fn scan_word(&mut self, start: Position) -> TokenKind {
        self.cursor.eat_while(is_identifier_continue);
        let word = self.cursor.slice(start.offset, self.cursor.offset());
        match self.lexicon.reserved_words().lookup(&word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        }
    }

    fn finish(&mut self, kind: TokenKind, start: Position) -> Token {
        let end = self.cursor.position();
        let text = self.cursor.slice(start.offset, end.offset);
        let token = Token::new(kind, text, Span::new(start, end), self.next_index);
        self.next_index += 1;
        token
    }
}
