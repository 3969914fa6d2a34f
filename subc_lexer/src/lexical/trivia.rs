//! Whitespace and comment skipping
//!
//! Trivia never becomes a token. Each skipped run is recorded as a
//! `TriviaSpan` so the input can be reconstructed from tokens plus trivia.

use crate::lexical::cursor::Cursor;
use crate::tokens::{TriviaKind, TriviaSpan};
use crate::utils::{Position, Span};

/// Result of one skip pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaOutcome {
    /// The cursor now sits on a significant character or at end of input
    Clean,
    /// A `/*` with no closing `*/`; the rest of the input was consumed
    UnterminatedComment { start: Position },
}

pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}')
}

/// Consume any run of whitespace, line comments and block comments,
/// appending one `TriviaSpan` per run to `sink`.
pub fn skip_trivia(cursor: &mut Cursor, sink: &mut Vec<TriviaSpan>) -> TriviaOutcome {
    loop {
        let start = cursor.position();
        let first = match cursor.first() {
            Some(ch) => ch,
            None => return TriviaOutcome::Clean,
        };

        if is_whitespace(first) {
            cursor.eat_while(is_whitespace);
            sink.push(TriviaSpan::new(
                TriviaKind::Whitespace,
                Span::new(start, cursor.position()),
            ));
            continue;
        }

        if first == '/' && cursor.peek(1) == '/' {
            cursor.eat_while(|ch| ch != '\n' && ch != '\r');
            sink.push(TriviaSpan::new(
                TriviaKind::LineComment,
                Span::new(start, cursor.position()),
            ));
            continue;
        }

        if first == '/' && cursor.peek(1) == '*' {
            cursor.advance();
            cursor.advance();
            if !skip_block_comment_body(cursor) {
                return TriviaOutcome::UnterminatedComment { start };
            }
            sink.push(TriviaSpan::new(
                TriviaKind::BlockComment,
                Span::new(start, cursor.position()),
            ));
            continue;
        }

        return TriviaOutcome::Clean;
    }
}

// Consumes through the first `*/`. Block comments do not nest.
fn skip_block_comment_body(cursor: &mut Cursor) -> bool {
    while let Some(ch) = cursor.advance() {
        if ch == '*' && cursor.first() == Some('/') {
            cursor.advance();
            return true;
        }
    }
    false
}
