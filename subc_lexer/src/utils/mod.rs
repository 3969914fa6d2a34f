//! Shared position and span types used by the scanner, token stream and diagnostics

pub mod span;

pub use span::{Position, PositionTracker, SourceMap, Span};
