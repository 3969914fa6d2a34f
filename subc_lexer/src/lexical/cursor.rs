//! Character cursor with lookahead and position tracking

use crate::utils::{Position, PositionTracker};

/// Returned by `peek` past the end of input
pub const EOF_CHAR: char = '\0';

/// Lookahead-capable view over the input characters.
///
/// Every consumed character goes through the `PositionTracker`, so
/// `position()` is always the location of the next unconsumed character.
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    offset: usize,
    tracker: PositionTracker,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            offset: 0,
            tracker: PositionTracker::new(),
        }
    }

    /// Character `k` positions ahead, or `EOF_CHAR` past the end
    pub fn peek(&self, k: usize) -> char {
        self.chars.get(self.offset + k).copied().unwrap_or(EOF_CHAR)
    }

    /// `peek(0)` that distinguishes end of input from a literal NUL
    pub fn first(&self) -> Option<char> {
        self.chars.get(self.offset).copied()
    }

    pub fn advance(&mut self) -> Option<char> {
        let ch = self.first()?;
        self.offset += 1;
        self.tracker.record(ch);
        Some(ch)
    }

    /// Consume characters while `predicate` holds; returns how many
    pub fn eat_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(char) -> bool,
    {
        let mut count = 0;
        while let Some(ch) = self.first() {
            if !predicate(ch) {
                break;
            }
            self.advance();
            count += 1;
        }
        count
    }

    pub fn at_end(&self) -> bool {
        self.offset >= self.chars.len()
    }

    pub fn position(&self) -> Position {
        self.tracker.position()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Unconsumed input
    pub fn remaining(&self) -> &[char] {
        &self.chars[self.offset..]
    }

    /// Source text between two character offsets
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Total input length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}
