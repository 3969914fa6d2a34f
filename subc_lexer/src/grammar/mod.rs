//! Sub-C vocabulary: reserved words, operators and punctuation
//!
//! Both tables are bundled into a `Lexicon` that analyzers own or share
//! through an `Arc`. Nothing here is global.

pub mod keywords;
pub mod operators;

use std::sync::Arc;

pub use keywords::{Keyword, ReservedWords};
pub use operators::{OperatorKind, OperatorTable, PunctuationKind, Symbol};

/// Immutable vocabulary tables consulted by the scanner
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    reserved: ReservedWords,
    operators: OperatorTable,
}

impl Lexicon {
    /// The full Sub-C vocabulary
    pub fn new() -> Self {
        Self::with_tables(ReservedWords::new(), OperatorTable::new())
    }

    pub fn with_tables(reserved: ReservedWords, operators: OperatorTable) -> Self {
        Self {
            reserved,
            operators,
        }
    }

    /// Convenience for sharing one lexicon between analyzers
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn reserved_words(&self) -> &ReservedWords {
        &self.reserved
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }
}
