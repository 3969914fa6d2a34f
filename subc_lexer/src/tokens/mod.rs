//! Token system for Sub-C lexical analysis
//!
//! This module defines what the scanner produces and what a parser consumes.
//!
//! ## Key Components
//!
//! - **[`Token`]** - an immutable lexeme with kind, raw text, character
//!   offsets, 1-based line/column and its index in the stream
//! - **[`TokenKind`]** - keyword, identifier, literal, operator, punctuation,
//!   error and end-of-input classifications
//! - **[`TokenStream`]** - the ordered, indexable result of one analyzer run,
//!   together with the skipped [`TriviaSpan`]s
//! - **[`TokenCursor`]** - lookahead and backtracking over a stream
//!
//! Malformed input never aborts scanning. It shows up in the stream as
//! `TokenKind::Error` tokens at the position where it occurred, and every
//! stream ends with exactly one `TokenKind::EndOfInput`.

pub mod token;
pub mod token_stream;

pub use token::{ErrorReason, IntegerBase, Token, TokenClass, TokenKind, TokenRecord};
pub use token_stream::{
    validation, TokenCursor, TokenStream, TokenStreamError, TriviaKind, TriviaSpan,
};

pub use crate::utils::{Position, SourceMap, Span};
