//! Operator and punctuation symbols with a longest-match lookup table

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Operator symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Inc,
    Dec,

    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    Not,
    And,
    Or,

    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Shl,
    Shr,

    Arrow,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 34] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Inc,
        Self::Dec,
        Self::Assign,
        Self::AddAssign,
        Self::SubAssign,
        Self::MulAssign,
        Self::DivAssign,
        Self::ModAssign,
        Self::AndAssign,
        Self::OrAssign,
        Self::XorAssign,
        Self::ShlAssign,
        Self::ShrAssign,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
        Self::Not,
        Self::And,
        Self::Or,
        Self::BitAnd,
        Self::BitOr,
        Self::BitXor,
        Self::BitNot,
        Self::Shl,
        Self::Shr,
        Self::Arrow,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Inc => "++",
            Self::Dec => "--",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::XorAssign => "^=",
            Self::ShlAssign => "<<=",
            Self::ShrAssign => ">>=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Not => "!",
            Self::And => "&&",
            Self::Or => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitNot => "~",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Arrow => "->",
        }
    }

    /// Symbolic kind name used when rendering tokens
    pub const fn symbolic_name(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Inc => "INC",
            Self::Dec => "DEC",
            Self::Assign => "ASG",
            Self::AddAssign => "ADDASG",
            Self::SubAssign => "SUBASG",
            Self::MulAssign => "MULASG",
            Self::DivAssign => "DIVASG",
            Self::ModAssign => "MODASG",
            Self::AndAssign => "ANDASG",
            Self::OrAssign => "ORASG",
            Self::XorAssign => "XORASG",
            Self::ShlAssign => "SHLASG",
            Self::ShrAssign => "SHRASG",
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Not => "NOT",
            Self::And => "ANDAND",
            Self::Or => "OROR",
            Self::BitAnd => "AND",
            Self::BitOr => "OR",
            Self::BitXor => "XOR",
            Self::BitNot => "TILDE",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
            Self::Arrow => "ARROW",
        }
    }

    pub const fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::DivAssign
                | Self::ModAssign
                | Self::AndAssign
                | Self::OrAssign
                | Self::XorAssign
                | Self::ShlAssign
                | Self::ShrAssign
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }
}

/// Punctuation marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PunctuationKind {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Colon,
    Question,
    Dot,
}

impl PunctuationKind {
    pub const ALL: [PunctuationKind; 11] = [
        Self::LeftParen,
        Self::RightParen,
        Self::LeftBracket,
        Self::RightBracket,
        Self::LeftBrace,
        Self::RightBrace,
        Self::Comma,
        Self::Semicolon,
        Self::Colon,
        Self::Question,
        Self::Dot,
    ];

    pub const fn as_char(self) -> char {
        match self {
            Self::LeftParen => '(',
            Self::RightParen => ')',
            Self::LeftBracket => '[',
            Self::RightBracket => ']',
            Self::LeftBrace => '{',
            Self::RightBrace => '}',
            Self::Comma => ',',
            Self::Semicolon => ';',
            Self::Colon => ':',
            Self::Question => '?',
            Self::Dot => '.',
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Question => "?",
            Self::Dot => ".",
        }
    }

    /// Symbolic kind name used when rendering tokens
    pub const fn symbolic_name(self) -> &'static str {
        match self {
            Self::LeftParen => "LPA",
            Self::RightParen => "RPA",
            Self::LeftBracket => "LBK",
            Self::RightBracket => "RBK",
            Self::LeftBrace => "LBR",
            Self::RightBrace => "RBR",
            Self::Comma => "CMA",
            Self::Semicolon => "SCO",
            Self::Colon => "COL",
            Self::Question => "QUE",
            Self::Dot => "DOT",
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_char() == ch)
    }
}

/// Either kind of table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Operator(OperatorKind),
    Punctuation(PunctuationKind),
}

impl Symbol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Symbol::Operator(op) => op.as_str(),
            Symbol::Punctuation(p) => p.as_str(),
        }
    }

    /// Length of the spelling in characters (all spellings are ASCII)
    pub const fn len(self) -> usize {
        self.as_str().len()
    }

    pub const fn symbolic_name(self) -> &'static str {
        match self {
            Symbol::Operator(op) => op.symbolic_name(),
            Symbol::Punctuation(p) => p.symbolic_name(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Longest-match table keyed by first character.
///
/// Candidates for each first character are ordered longest first. Equal
/// lengths keep registration order, which is the tie-break priority.
#[derive(Debug, Clone)]
pub struct OperatorTable {
    candidates: HashMap<char, Vec<Symbol>>,
    max_len: usize,
}

impl OperatorTable {
    /// Build the table for every Sub-C operator and punctuation mark
    pub fn new() -> Self {
        let symbols = OperatorKind::ALL
            .iter()
            .map(|&op| Symbol::Operator(op))
            .chain(PunctuationKind::ALL.iter().map(|&p| Symbol::Punctuation(p)));
        Self::from_symbols(symbols)
    }

    /// Build a table from symbols in priority order
    pub fn from_symbols<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut candidates: HashMap<char, Vec<Symbol>> = HashMap::new();
        let mut max_len = 0;

        for symbol in symbols {
            let spelling = symbol.as_str();
            let Some(first) = spelling.chars().next() else {
                continue;
            };
            let entry = candidates.entry(first).or_default();
            if !entry.contains(&symbol) {
                entry.push(symbol);
            }
            max_len = max_len.max(symbol.len());
        }

        // Stable sort keeps registration order among equal lengths
        for entry in candidates.values_mut() {
            entry.sort_by(|a, b| b.len().cmp(&a.len()));
        }

        Self {
            candidates,
            max_len,
        }
    }

    /// Whether `ch` can start a symbol
    pub fn starts_symbol(&self, ch: char) -> bool {
        self.candidates.contains_key(&ch)
    }

    /// Longest registered symbol at the start of `input`
    pub fn longest_match(&self, input: &[char]) -> Option<Symbol> {
        let first = input.first()?;
        self.candidates.get(first)?.iter().copied().find(|symbol| {
            let spelling = symbol.as_str();
            spelling.len() <= input.len()
                && spelling.chars().zip(input.iter()).all(|(a, &b)| a == b)
        })
    }

    /// Longest spelling in the table; the scanner's fixed lookahead bound
    pub fn max_symbol_len(&self) -> usize {
        self.max_len
    }

    pub fn symbol_count(&self) -> usize {
        self.candidates.values().map(Vec::len).sum()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_longest_match_wins() {
        let table = OperatorTable::new();
        assert_eq!(
            table.longest_match(&chars("<=")),
            Some(Symbol::Operator(OperatorKind::Le))
        );
        assert_eq!(
            table.longest_match(&chars("<<=1")),
            Some(Symbol::Operator(OperatorKind::ShlAssign))
        );
        assert_eq!(
            table.longest_match(&chars("<<1")),
            Some(Symbol::Operator(OperatorKind::Shl))
        );
        assert_eq!(
            table.longest_match(&chars("< =")),
            Some(Symbol::Operator(OperatorKind::Lt))
        );
        assert_eq!(
            table.longest_match(&chars("&&&")),
            Some(Symbol::Operator(OperatorKind::And))
        );
    }

    #[test]
    fn test_punctuation_and_unknown() {
        let table = OperatorTable::new();
        assert_matches!(
            table.longest_match(&chars(";x")),
            Some(Symbol::Punctuation(PunctuationKind::Semicolon))
        );
        assert_eq!(table.longest_match(&chars("@")), None);
        assert_eq!(table.longest_match(&[]), None);
        assert!(table.starts_symbol('{'));
        assert!(!table.starts_symbol('$'));
    }

    #[test]
    fn test_table_shape() {
        let table = OperatorTable::new();
        assert_eq!(table.max_symbol_len(), 3);
        assert_eq!(
            table.symbol_count(),
            OperatorKind::ALL.len() + PunctuationKind::ALL.len()
        );
    }

    #[test]
    fn test_truncated_input_falls_back() {
        let table = OperatorTable::new();
        // Only one character left: the two-character candidates cannot match
        assert_eq!(
            table.longest_match(&chars("-")),
            Some(Symbol::Operator(OperatorKind::Sub))
        );
    }

    #[test]
    fn test_restricted_table_falls_back_to_shorter() {
        let table = OperatorTable::from_symbols([
            Symbol::Operator(OperatorKind::Lt),
            Symbol::Operator(OperatorKind::Assign),
        ]);
        assert_eq!(
            table.longest_match(&chars("<=")),
            Some(Symbol::Operator(OperatorKind::Lt))
        );
    }

    #[test]
    fn test_symbolic_names_are_unique() {
        let mut names: Vec<_> = OperatorKind::ALL
            .iter()
            .map(|op| op.symbolic_name())
            .chain(PunctuationKind::ALL.iter().map(|p| p.symbolic_name()))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_punctuation_from_char() {
        assert_eq!(PunctuationKind::from_char(','), Some(PunctuationKind::Comma));
        assert_eq!(PunctuationKind::from_char('+'), None);
    }
}
