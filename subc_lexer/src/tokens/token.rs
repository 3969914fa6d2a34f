//! Token model for Sub-C lexical analysis
//!
//! A `Token` keeps the raw lexeme exactly as it appeared in the source
//! together with its classification and location. Escapes stay undecoded in
//! `text`; `decoded_literal` produces the runtime value on demand.

use crate::grammar::keywords::Keyword;
use crate::grammar::operators::{OperatorKind, PunctuationKind, Symbol};
use crate::utils::{Position, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Radix of an integer literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegerBase {
    Decimal,
    Octal,
    Hexadecimal,
}

impl IntegerBase {
    pub fn radix(&self) -> u32 {
        match self {
            Self::Decimal => 10,
            Self::Octal => 8,
            Self::Hexadecimal => 16,
        }
    }

    /// Number of prefix characters preceding the digits (`0x`, `0`)
    pub fn prefix_len(&self) -> usize {
        match self {
            Self::Decimal => 0,
            Self::Octal => 1,
            Self::Hexadecimal => 2,
        }
    }
}

/// Why a span of input could not be classified as a regular token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorReason {
    InvalidCharacter,
    UnterminatedLiteral,
    UnterminatedComment,
    MalformedNumericLiteral,
}

impl ErrorReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCharacter => "InvalidCharacter",
            Self::UnterminatedLiteral => "UnterminatedLiteral",
            Self::UnterminatedComment => "UnterminatedComment",
            Self::MalformedNumericLiteral => "MalformedNumericLiteral",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidCharacter => "invalid character",
            Self::UnterminatedLiteral => "unterminated literal",
            Self::UnterminatedComment => "unterminated block comment",
            Self::MalformedNumericLiteral => "malformed numeric literal",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier,
    IntegerLiteral(IntegerBase),
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    Operator(OperatorKind),
    Punctuation(PunctuationKind),
    Error(ErrorReason),
    EndOfInput,
}

impl TokenKind {
    /// Symbolic kind name used in renderings (`INT`, `ID`, `LE`, `EOF`, ...)
    pub fn symbolic_name(&self) -> &'static str {
        match self {
            Self::Keyword(keyword) => keyword.symbolic_name(),
            Self::Identifier => "ID",
            Self::IntegerLiteral(_) => "NUM",
            Self::FloatLiteral => "FLO",
            Self::StringLiteral => "STR",
            Self::CharLiteral => "CHR",
            Self::Operator(op) => op.symbolic_name(),
            Self::Punctuation(punct) => punct.symbolic_name(),
            Self::Error(_) => "ERROR",
            Self::EndOfInput => "EOF",
        }
    }

    pub fn from_symbol(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Operator(op) => Self::Operator(op),
            Symbol::Punctuation(punct) => Self::Punctuation(punct),
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, Self::Keyword(_))
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::IntegerLiteral(_) | Self::FloatLiteral | Self::StringLiteral | Self::CharLiteral
        )
    }

    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator(_))
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(self, Self::Punctuation(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    pub fn error_reason(&self) -> Option<ErrorReason> {
        match self {
            Self::Error(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn token_class(&self) -> TokenClass {
        match self {
            Self::Keyword(_) => TokenClass::Keyword,
            Self::Identifier => TokenClass::Identifier,
            Self::IntegerLiteral(_)
            | Self::FloatLiteral
            | Self::StringLiteral
            | Self::CharLiteral => TokenClass::Literal,
            Self::Operator(_) | Self::Punctuation(_) => TokenClass::Symbol,
            Self::Error(_) => TokenClass::Error,
            Self::EndOfInput => TokenClass::Special,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbolic_name())
    }
}

/// Coarse token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// Reserved words
    Keyword,
    /// User-defined names
    Identifier,
    /// Numeric, string and character constants
    Literal,
    /// Operators and punctuation
    Symbol,
    /// Unrecognized input kept in place
    Error,
    /// End-of-input marker
    Special,
}

/// An immutable, classified lexeme with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    kind: TokenKind,
    text: String,
    span: Span,
    index: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: String, span: Span, index: usize) -> Self {
        Self {
            kind,
            text,
            span,
            index,
        }
    }

    /// The terminal token at `position`, with empty text
    pub fn end_of_input(position: Position, index: usize) -> Self {
        Self::new(
            TokenKind::EndOfInput,
            String::new(),
            Span::empty_at(position),
            index,
        )
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Exact source lexeme
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Half-open source span
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start_offset(&self) -> usize {
        self.span.start.offset
    }

    /// Offset of the last consumed character. Equal to the start offset
    /// for the empty end-of-input token.
    pub fn end_offset(&self) -> usize {
        if self.span.is_empty() {
            self.span.start.offset
        } else {
            self.span.end.offset - 1
        }
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn column(&self) -> u32 {
        self.span.start.column
    }

    pub fn symbolic_name(&self) -> &'static str {
        self.kind.symbolic_name()
    }

    pub fn is_eof(&self) -> bool {
        self.kind.is_eof()
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_operator(&self, op: OperatorKind) -> bool {
        self.kind == TokenKind::Operator(op)
    }

    pub fn is_punctuation(&self, punct: PunctuationKind) -> bool {
        self.kind == TokenKind::Punctuation(punct)
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Identifier => Some(&self.text),
            _ => None,
        }
    }

    /// Value of an integer literal. `None` for other kinds or on u64 overflow.
    pub fn integer_value(&self) -> Option<u64> {
        match self.kind {
            TokenKind::IntegerLiteral(base) => {
                let digits = &self.text[base.prefix_len()..];
                if digits.is_empty() {
                    return Some(0);
                }
                u64::from_str_radix(digits, base.radix()).ok()
            }
            _ => None,
        }
    }

    pub fn float_value(&self) -> Option<f64> {
        match self.kind {
            TokenKind::FloatLiteral => self.text.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Contents of a string or char literal with escapes decoded
    pub fn decoded_literal(&self) -> Option<String> {
        match self.kind {
            TokenKind::StringLiteral | TokenKind::CharLiteral => {
                let chars: Vec<char> = self.text.chars().collect();
                if chars.len() < 2 {
                    return None;
                }
                Some(decode_escapes(&chars[1..chars.len() - 1]))
            }
            _ => None,
        }
    }

    /// Render as `[@index,start:stop='text',<KIND>,line:column]`
    pub fn render(&self) -> String {
        let text = if self.is_eof() {
            "<EOF>".to_string()
        } else {
            self.text.replace('\n', "\\n")
        };
        format!(
            "[@{},{}:{}='{}',<{}>,{}:{}]",
            self.index,
            self.start_offset(),
            self.end_offset(),
            text,
            self.symbolic_name(),
            self.line(),
            self.column()
        )
    }

    pub fn token_class(&self) -> TokenClass {
        self.kind.token_class()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Flat, serializable view of a token for JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub index: usize,
    pub start: usize,
    pub stop: usize,
    pub text: String,
    pub kind: String,
    pub line: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Token> for TokenRecord {
    fn from(token: &Token) -> Self {
        Self {
            index: token.index(),
            start: token.start_offset(),
            stop: token.end_offset(),
            text: token.text().to_string(),
            kind: token.symbolic_name().to_string(),
            line: token.line(),
            column: token.column(),
            error: token.kind().error_reason().map(|r| r.as_str().to_string()),
        }
    }
}

fn decode_escapes(body: &[char]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let ch = body[i];
        i += 1;
        if ch != '\\' || i >= body.len() {
            out.push(ch);
            continue;
        }
        let escaped = body[i];
        i += 1;
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0C}'),
            'v' => out.push('\u{0B}'),
            'x' => {
                let start = i;
                while i < body.len() && body[i].is_ascii_hexdigit() {
                    i += 1;
                }
                let digits: String = body[start..i].iter().collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => out.push('x'),
                }
            }
            '0'..='7' => {
                let start = i - 1;
                while i < body.len() && i - start < 3 && ('0'..='7').contains(&body[i]) {
                    i += 1;
                }
                let digits: String = body[start..i].iter().collect();
                if let Some(decoded) = u32::from_str_radix(&digits, 8)
                    .ok()
                    .and_then(char::from_u32)
                {
                    out.push(decoded);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str, start: usize) -> Token {
        let len = text.chars().count();
        let span = Span::new(
            Position::new(start, 1, start as u32 + 1),
            Position::new(start + len, 1, (start + len) as u32 + 1),
        );
        Token::new(kind, text.to_string(), span, 0)
    }

    #[test]
    fn test_end_offset_is_inclusive() {
        let t = token(TokenKind::Identifier, "abc", 4);
        assert_eq!(t.start_offset(), 4);
        assert_eq!(t.end_offset(), 6);
        assert_eq!(t.column(), 5);
    }

    #[test]
    fn test_end_of_input_offsets() {
        let t = Token::end_of_input(Position::new(10, 2, 1), 5);
        assert_eq!(t.start_offset(), 10);
        assert_eq!(t.end_offset(), 10);
        assert!(t.text().is_empty());
        assert_eq!(t.render(), "[@5,10:10='<EOF>',<EOF>,2:1]");
    }

    #[test]
    fn test_render_escapes_newline() {
        let t = token(TokenKind::Error(ErrorReason::InvalidCharacter), "a\nb", 0);
        assert_eq!(t.render(), "[@0,0:2='a\\nb',<ERROR>,1:1]");
        assert_eq!(t.text(), "a\nb");
    }

    #[test]
    fn test_render_keeps_tabs_and_carriage_returns() {
        let t = token(TokenKind::StringLiteral, "\"x\ty\r\"", 0);
        assert_eq!(t.render(), "[@0,0:5='\"x\ty\r\"',<STR>,1:1]");
    }

    #[test]
    fn test_symbolic_names() {
        assert_eq!(TokenKind::Keyword(Keyword::Int).symbolic_name(), "INT");
        assert_eq!(TokenKind::Identifier.symbolic_name(), "ID");
        assert_eq!(
            TokenKind::IntegerLiteral(IntegerBase::Octal).symbolic_name(),
            "NUM"
        );
        assert_eq!(TokenKind::Operator(OperatorKind::Le).symbolic_name(), "LE");
        assert_eq!(
            TokenKind::Punctuation(PunctuationKind::Semicolon).symbolic_name(),
            "SCO"
        );
        assert_eq!(TokenKind::EndOfInput.symbolic_name(), "EOF");
    }

    #[test]
    fn test_integer_values() {
        let hex = token(TokenKind::IntegerLiteral(IntegerBase::Hexadecimal), "0x1A", 0);
        assert_eq!(hex.integer_value(), Some(26));
        let oct = token(TokenKind::IntegerLiteral(IntegerBase::Octal), "007", 0);
        assert_eq!(oct.integer_value(), Some(7));
        let dec = token(TokenKind::IntegerLiteral(IntegerBase::Decimal), "0", 0);
        assert_eq!(dec.integer_value(), Some(0));
        let huge = token(
            TokenKind::IntegerLiteral(IntegerBase::Decimal),
            "99999999999999999999999",
            0,
        );
        assert_eq!(huge.integer_value(), None);
        assert_eq!(token(TokenKind::Identifier, "x", 0).integer_value(), None);
    }

    #[test]
    fn test_float_value() {
        let f = token(TokenKind::FloatLiteral, "3.14e2", 0);
        assert_eq!(f.float_value(), Some(314.0));
        assert_eq!(token(TokenKind::FloatLiteral, "1.", 0).float_value(), Some(1.0));
    }

    #[test]
    fn test_decoded_literal() {
        let s = token(TokenKind::StringLiteral, r#""a\tb\n\"q\"\x41\101\0""#, 0);
        assert_eq!(s.decoded_literal().as_deref(), Some("a\tb\n\"q\"AA\0"));
        let c = token(TokenKind::CharLiteral, r"'\''", 0);
        assert_eq!(c.decoded_literal().as_deref(), Some("'"));
        assert_eq!(token(TokenKind::Identifier, "x", 0).decoded_literal(), None);

        let bare_hex = token(TokenKind::StringLiteral, r#""\xg""#, 0);
        assert_eq!(bare_hex.decoded_literal().as_deref(), Some("xg"));
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(
            TokenKind::Keyword(Keyword::While).token_class(),
            TokenClass::Keyword
        );
        assert_eq!(TokenKind::CharLiteral.token_class(), TokenClass::Literal);
        assert_eq!(
            TokenKind::Operator(OperatorKind::Add).token_class(),
            TokenClass::Symbol
        );
        assert_eq!(TokenKind::EndOfInput.token_class(), TokenClass::Special);
    }

    #[test]
    fn test_token_record_serializes() {
        let t = token(TokenKind::Error(ErrorReason::UnterminatedLiteral), "\"abc", 0);
        let record = TokenRecord::from(&t);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"ERROR\""));
        assert!(json.contains("\"error\":\"UnterminatedLiteral\""));
        assert_eq!(record.stop, 3);
    }
}
