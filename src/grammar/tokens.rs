//! Token definitions for grammar descriptions
//!
//! Grammar files are line oriented, so newlines are tokens while other blanks are skipped.
//! A symbol is any run of characters that is neither blank nor the alternative separator `|`.
use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, PartialEq, Eq, Hash, Clone)]
#[logos(skip r"[ \t\f]+")]
pub enum GrammarToken {
    #[token("->")]
    Arrow,

    #[token("|")]
    Bar,

    #[regex(r"\r\n|\n|\r")]
    Newline,

    #[regex(r"[^ \t\f\r\n|]+", |lex| lex.slice().to_owned())]
    Symbol(String),
}

impl fmt::Display for GrammarToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarToken::Arrow => f.write_str("'->'"),
            GrammarToken::Bar => f.write_str("'|'"),
            GrammarToken::Newline => f.write_str("end of line"),
            GrammarToken::Symbol(name) => write!(f, "symbol '{name}'"),
        }
    }
}

/// Tokenize a grammar description, returning tokens with their byte spans.
///
/// Every character is covered by one of the patterns above, so the only failure is a stray
/// character the regex engine rejects; its span is returned.
pub fn tokenize(source: &str) -> Result<Vec<(GrammarToken, Range<usize>)>, Range<usize>> {
    let mut lexer = GrammarToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => return Err(lexer.span()),
        }
    }

    Ok(tokens)
}
