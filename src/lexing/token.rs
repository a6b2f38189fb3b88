//! Token records handed from the lexer to the parser.

use serde::Serialize;
use std::fmt;

/// Name used for keyword tokens in reports and grammars.
pub const KEYWORD: &str = "KEYWORD";
/// Name used for special-literal tokens in reports and grammars.
pub const SPECIAL_LITERAL: &str = "SPECIAL_LITERAL";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TokenKind {
    Keyword,
    SpecialLiteral,
    /// Terminal type declared by the automaton node the token ended in.
    Terminal(String),
}

impl TokenKind {
    pub fn name(&self) -> &str {
        match self {
            TokenKind::Keyword => KEYWORD,
            TokenKind::SpecialLiteral => SPECIAL_LITERAL,
            TokenKind::Terminal(name) => name,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognized token.
///
/// `start` and `end` are the columns of the first and last character on `line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub spelling: String,
    pub kind: TokenKind,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(
        spelling: impl Into<String>,
        kind: TokenKind,
        line: usize,
        start: usize,
        end: usize,
    ) -> Self {
        Token {
            spelling: spelling.into(),
            kind,
            line,
            start,
            end,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:?} @ {}({})..{}({})",
            self.kind, self.spelling, self.line, self.start, self.line, self.end
        )
    }
}
