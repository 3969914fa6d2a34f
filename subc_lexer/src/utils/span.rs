//! Source location tracking for the Sub-C lexer
//!
//! Offsets count characters (Unicode scalar values), not bytes, so token
//! offsets line up with what an editor shows for the same buffer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and character offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Character offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Position after consuming `ch`, treating `\n` and `\r` as line breaks.
    /// Tabs advance a single column.
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' | '\r' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + 1,
                line: self.line,
                column: self.column + 1,
            },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Tracks the current position as characters are consumed.
///
/// A `\r\n` pair is a single line break: the `\n` only advances the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionTracker {
    position: Position,
    after_carriage_return: bool,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            position: Position::start(),
            after_carriage_return: false,
        }
    }

    /// Record one consumed character
    pub fn record(&mut self, ch: char) {
        if ch == '\n' && self.after_carriage_return {
            self.position.offset += 1;
        } else {
            self.position = self.position.advance(ch);
        }
        self.after_carriage_return = ch == '\r';
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn column(&self) -> u32 {
        self.position.column
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Create an empty span at a position (used for end of input)
    pub fn empty_at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Create a span from character offsets (useful for testing)
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self {
            start: Position::new(start, 0, 0),
            end: Position::new(end, 0, 0),
        }
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };

        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };

        Self { start, end }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Check if this span contains a character offset
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start.offset && offset < self.end.offset
    }

    /// Check if two spans share at least one character
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start.offset < other.end.offset && other.start.offset < self.end.offset
    }

    /// Create an unknown/dummy span
    pub fn dummy() -> Self {
        Self::empty_at(Position::start())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Source text indexed by character offset and line, for diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap {
    chars: Vec<char>,
    /// Character offsets of line starts
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut line_starts = vec![0];
        let mut tracker = PositionTracker::new();

        for (offset, &ch) in chars.iter().enumerate() {
            let line = tracker.line();
            tracker.record(ch);
            if tracker.line() != line {
                line_starts.push(offset + 1);
            }
        }

        Self { chars, line_starts }
    }

    /// Number of characters in the source
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get the line and column for a character offset
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.chars.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let mut column = offset - self.line_starts[line];

        // The '\n' of a "\r\n" pair belongs to the line the '\r' ended
        if column == 0 && line > 0 && self.is_crlf_tail(offset) {
            return Position::new(offset, line as u32 + 1, 1);
        }
        if line > 0 && self.is_crlf_tail(self.line_starts[line]) {
            column -= 1;
        }

        Position::new(offset, line as u32 + 1, column as u32 + 1)
    }

    fn is_crlf_tail(&self, offset: usize) -> bool {
        offset > 0
            && self.chars.get(offset) == Some(&'\n')
            && self.chars.get(offset - 1) == Some(&'\r')
    }

    /// Get a line of text by line number (1-based), without its terminator
    pub fn get_line(&self, line_num: u32) -> Option<String> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        let mut start = *self.line_starts.get(line_idx)?;
        let end = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(self.chars.len());

        if line_idx > 0 && self.is_crlf_tail(start) {
            start += 1;
        }

        let line: String = self.chars[start..end.max(start)].iter().collect();
        Some(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Get the text covered by a span
    pub fn span_text(&self, span: &Span) -> String {
        let end = span.end.offset.min(self.chars.len());
        let start = span.start.offset.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Format an error message with source context and a caret underline
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();

        result.push_str(&format!("error: {}\n", message));
        result.push_str(&format!(
            "  --> {}:{}\n",
            span.start.line, span.start.column
        ));

        if let Some(line) = self.get_line(span.start.line) {
            let line_num_str = format!("{}", span.start.line);
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("{} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));

            let mut underline = format!("{} | ", padding);
            for _ in 1..span.start.column {
                underline.push(' ');
            }

            let line_len = line.chars().count() as u32;
            let span_len = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column)
            } else {
                (line_len + 1).saturating_sub(span.start.column)
            };

            for _ in 0..span_len.max(1) {
                underline.push('^');
            }

            result.push_str(&underline);
            result.push('\n');
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(input: &str) -> Position {
        let mut tracker = PositionTracker::new();
        for ch in input.chars() {
            tracker.record(ch);
        }
        tracker.position()
    }

    #[test]
    fn test_tracker_counts_columns_and_lines() {
        assert_eq!(track(""), Position::new(0, 1, 1));
        assert_eq!(track("abc"), Position::new(3, 1, 4));
        assert_eq!(track("ab\ncd"), Position::new(5, 2, 3));
    }

    #[test]
    fn test_tab_is_one_column() {
        assert_eq!(track("\t\tx"), Position::new(3, 1, 4));
    }

    #[test]
    fn test_crlf_is_a_single_line_break() {
        assert_eq!(track("a\r\nb"), Position::new(4, 2, 2));
        assert_eq!(track("a\r\rb"), Position::new(4, 3, 2));
        assert_eq!(track("\n\r\n"), Position::new(3, 3, 1));
    }

    #[test]
    fn test_span_basics() {
        let span = Span::from_offsets(2, 5);
        assert_eq!(span.len(), 3);
        assert!(span.contains(2));
        assert!(!span.contains(5));
        assert!(span.overlaps(&Span::from_offsets(4, 6)));
        assert!(!span.overlaps(&Span::from_offsets(5, 6)));
        assert!(Span::empty_at(Position::new(5, 1, 6)).is_empty());
        assert_eq!(span.merge(Span::from_offsets(0, 3)), Span::from_offsets(0, 5));
    }

    #[test]
    fn test_source_map_positions_agree_with_tracker() {
        let source = "int a;\r\nfloat b;\nx\ry";
        let map = SourceMap::new(source);
        let mut tracker = PositionTracker::new();

        for (offset, ch) in source.chars().enumerate() {
            assert_eq!(map.position_at(offset), tracker.position(), "offset {}", offset);
            tracker.record(ch);
        }
        assert_eq!(map.position_at(map.len()), tracker.position());
    }

    #[test]
    fn test_source_map_lines() {
        let map = SourceMap::new("first\r\nsecond\nthird");
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.get_line(1).as_deref(), Some("first"));
        assert_eq!(map.get_line(2).as_deref(), Some("second"));
        assert_eq!(map.get_line(3).as_deref(), Some("third"));
        assert_eq!(map.get_line(4), None);
        assert_eq!(map.get_line(0), None);
    }

    #[test]
    fn test_span_text_uses_character_offsets() {
        let map = SourceMap::new("é = \"ü\";");
        let span = Span::new(map.position_at(4), map.position_at(7));
        assert_eq!(map.span_text(&span), "\"ü\"");
    }

    #[test]
    fn test_format_error_underlines_span() {
        let map = SourceMap::new("int a = 1;\nint $b;\n");
        let span = Span::new(map.position_at(15), map.position_at(16));
        let report = map.format_error(&span, "invalid character '$'");

        assert!(report.starts_with("error: invalid character '$'"));
        assert!(report.contains("  --> 2:5"));
        assert!(report.contains("2 | int $b;"));
        assert!(report.contains("  |     ^\n"));
    }
}
