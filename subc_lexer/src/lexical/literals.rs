//! Numeric, string and character literal sub-scanners
//!
//! Both entry points expect the cursor on the literal's first character and
//! return the kind of what they consumed. Failures come back as
//! `TokenKind::Error` so the caller can keep scanning.

use crate::lexical::cursor::Cursor;
use crate::tokens::{ErrorReason, IntegerBase, TokenKind};

/// Characters that glue onto a numeric literal and make it malformed
fn is_number_continuation(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}

fn is_octal_digit(ch: char) -> bool {
    ('0'..='7').contains(&ch)
}

/// Scan an integer or float literal starting at a decimal digit.
///
/// Hex needs at least one digit after `0x`. A leading `0` followed by more
/// digits is octal and must not contain `8` or `9`. Anything that keeps
/// going with letters, digits, `_` or `.` after a complete literal is
/// swallowed into one malformed-literal error.
pub fn scan_number(cursor: &mut Cursor) -> TokenKind {
    let start = cursor.offset();
    let first = match cursor.advance() {
        Some(ch) => ch,
        None => return TokenKind::Error(ErrorReason::MalformedNumericLiteral),
    };

    let kind = if first == '0' && matches!(cursor.first(), Some('x' | 'X')) {
        cursor.advance();
        if cursor.eat_while(|ch| ch.is_ascii_hexdigit()) == 0 {
            TokenKind::Error(ErrorReason::MalformedNumericLiteral)
        } else {
            TokenKind::IntegerLiteral(IntegerBase::Hexadecimal)
        }
    } else {
        cursor.eat_while(|ch| ch.is_ascii_digit());
        let integer_end = cursor.offset();
        let mut is_float = false;

        if cursor.first() == Some('.') {
            cursor.advance();
            cursor.eat_while(|ch| ch.is_ascii_digit());
            is_float = true;
        }
        if has_exponent(cursor) {
            cursor.advance();
            if matches!(cursor.first(), Some('+' | '-')) {
                cursor.advance();
            }
            cursor.eat_while(|ch| ch.is_ascii_digit());
            is_float = true;
        }

        if is_float {
            TokenKind::FloatLiteral
        } else if first == '0' && integer_end - start > 1 {
            let digits = cursor.slice(start + 1, integer_end);
            if digits.chars().all(is_octal_digit) {
                TokenKind::IntegerLiteral(IntegerBase::Octal)
            } else {
                TokenKind::Error(ErrorReason::MalformedNumericLiteral)
            }
        } else {
            TokenKind::IntegerLiteral(IntegerBase::Decimal)
        }
    };

    match cursor.first() {
        Some(ch) if is_number_continuation(ch) => {
            cursor.eat_while(is_number_continuation);
            TokenKind::Error(ErrorReason::MalformedNumericLiteral)
        }
        _ => kind,
    }
}

// `e`/`E`, optional sign, then at least one digit
fn has_exponent(cursor: &Cursor) -> bool {
    if !matches!(cursor.peek(0), 'e' | 'E') {
        return false;
    }
    match cursor.peek(1) {
        '+' | '-' => cursor.peek(2).is_ascii_digit(),
        ch => ch.is_ascii_digit(),
    }
}

/// Scan a `"` string or `'` char literal starting at the opening quote.
///
/// Escapes are consumed as units so an escaped quote never terminates the
/// literal. A newline or end of input before the closing quote leaves the
/// newline unconsumed and yields an unterminated-literal error.
pub fn scan_quoted(cursor: &mut Cursor) -> TokenKind {
    let quote = match cursor.advance() {
        Some(ch) => ch,
        None => return TokenKind::Error(ErrorReason::UnterminatedLiteral),
    };
    let complete = if quote == '\'' {
        TokenKind::CharLiteral
    } else {
        TokenKind::StringLiteral
    };

    loop {
        match cursor.first() {
            None | Some('\n') | Some('\r') => {
                return TokenKind::Error(ErrorReason::UnterminatedLiteral)
            }
            Some(ch) if ch == quote => {
                cursor.advance();
                return complete;
            }
            Some('\\') => {
                cursor.advance();
                consume_escape(cursor);
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }
}

// Body of an escape after the backslash. A newline is left for the caller.
fn consume_escape(cursor: &mut Cursor) {
    match cursor.first() {
        None | Some('\n') | Some('\r') => {}
        // `\x` with no hex digits is kept as a two-character escape
        Some('x') => {
            cursor.advance();
            cursor.eat_while(|ch| ch.is_ascii_hexdigit());
        }
        Some(ch) if is_octal_digit(ch) => {
            let mut taken = 0;
            cursor.eat_while(|ch| {
                taken += 1;
                taken <= 3 && is_octal_digit(ch)
            });
        }
        Some(_) => {
            cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(source: &str) -> (TokenKind, usize) {
        let mut cursor = Cursor::new(source);
        let kind = scan_number(&mut cursor);
        (kind, cursor.offset())
    }

    fn quoted(source: &str) -> (TokenKind, usize) {
        let mut cursor = Cursor::new(source);
        let kind = scan_quoted(&mut cursor);
        (kind, cursor.offset())
    }

    const MALFORMED: TokenKind = TokenKind::Error(ErrorReason::MalformedNumericLiteral);

    #[test]
    fn test_integer_bases() {
        assert_eq!(
            number("0x1A;"),
            (TokenKind::IntegerLiteral(IntegerBase::Hexadecimal), 4)
        );
        assert_eq!(number("007"), (TokenKind::IntegerLiteral(IntegerBase::Octal), 3));
        assert_eq!(number("0"), (TokenKind::IntegerLiteral(IntegerBase::Decimal), 1));
        assert_eq!(
            number("1234+"),
            (TokenKind::IntegerLiteral(IntegerBase::Decimal), 4)
        );
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(number("3.14e2"), (TokenKind::FloatLiteral, 6));
        assert_eq!(number("1."), (TokenKind::FloatLiteral, 2));
        assert_eq!(number("2e-3)"), (TokenKind::FloatLiteral, 4));
        assert_eq!(number("0.5"), (TokenKind::FloatLiteral, 3));
        assert_eq!(number("09.5"), (TokenKind::FloatLiteral, 4));
    }

    #[test]
    fn test_malformed_numbers_consume_whole_run() {
        assert_eq!(number("123abc "), (MALFORMED, 6));
        assert_eq!(number("0x;"), (MALFORMED, 2));
        assert_eq!(number("0xZZ"), (MALFORMED, 4));
        assert_eq!(number("089"), (MALFORMED, 3));
        assert_eq!(number("1.2.3"), (MALFORMED, 5));
        assert_eq!(number("1e"), (MALFORMED, 2));
    }

    #[test]
    fn test_exponent_sign_without_digits_stops() {
        // "1e+" is malformed "1e" followed by an operator
        assert_eq!(number("1e+"), (MALFORMED, 2));
    }

    #[test]
    fn test_string_and_char_literals() {
        assert_eq!(quoted("\"abc\" x"), (TokenKind::StringLiteral, 5));
        assert_eq!(quoted("'a'"), (TokenKind::CharLiteral, 3));
        assert_eq!(quoted(r#""a\"b""#), (TokenKind::StringLiteral, 6));
        assert_eq!(quoted(r"'\''"), (TokenKind::CharLiteral, 4));
        assert_eq!(quoted(r#""\x41\101\\""#), (TokenKind::StringLiteral, 12));
    }

    #[test]
    fn test_hex_escape_without_digits() {
        assert_eq!(quoted(r#""\xg""#), (TokenKind::StringLiteral, 5));
        assert_eq!(quoted(r"'\x'"), (TokenKind::CharLiteral, 4));
    }

    #[test]
    fn test_unterminated_literals() {
        let unterminated = TokenKind::Error(ErrorReason::UnterminatedLiteral);
        assert_eq!(quoted("\"abc"), (unterminated, 4));
        assert_eq!(quoted("\"ab\ncd\""), (unterminated, 3));
        assert_eq!(quoted("'\\"), (unterminated, 2));
        assert_eq!(quoted("\"a\\\nb\""), (unterminated, 3));
    }
}
