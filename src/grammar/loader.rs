//! Grammar description loader
//!
//!     The text format is line oriented:
//!
//!         INT_LITERAL | FLOAT_LITERAL | ID
//!         program -> func-decl program | epsilon
//!         expr -> term expr'
//!
//!     The first line lists the dynamic-token type names separated by `|` (it may be empty).
//!     Every following non-blank line is `LHS -> alternative | alternative ...`, each
//!     alternative a blank-separated symbol sequence. A literal `|` terminal is written as
//!     `VERTICAL_BAR`. Several lines may share a left-hand side; their alternatives are appended.
//!
//!     Lines are tokenized with logos ([tokens](super::tokens)) and assembled with chumsky
//!     combinators over the token stream, so errors carry byte spans that are turned into
//!     line/column positions.

use super::tokens::{self, GrammarToken};
use super::{Grammar, RuleDecl};
use chumsky::error::Error as _;
use chumsky::prelude::*;
use chumsky::Stream;
use thiserror::Error;

/// Placeholder for a literal `|` terminal.
pub const VERTICAL_BAR: &str = "VERTICAL_BAR";

type ParserError = Simple<GrammarToken>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarLoadError {
    #[error("grammar declares no rules")]
    Empty,

    #[error("unexpected character at line {line}({column}) in grammar description")]
    UnexpectedCharacter { line: usize, column: usize },

    #[error("malformed grammar at line {line}({column}): {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

/// Parsed file contents before symbol classification.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GrammarFile {
    dynamic_tokens: Vec<String>,
    rules: Vec<RuleDecl>,
}

impl Grammar {
    /// Load a grammar from its text description.
    pub fn parse(source: &str) -> Result<Grammar, GrammarLoadError> {
        let tokens = tokens::tokenize(source).map_err(|span| {
            let (line, column) = line_column(source, span.start);
            GrammarLoadError::UnexpectedCharacter { line, column }
        })?;

        let eoi = source.len()..source.len();
        let file = grammar_file()
            .parse(Stream::from_iter(eoi, tokens.into_iter()))
            .map_err(|errors| syntax_error(source, errors))?;

        Grammar::new(file.dynamic_tokens, file.rules)
    }
}

fn symbol() -> impl Parser<GrammarToken, String, Error = ParserError> + Clone {
    filter_map(|span, token| match token {
        GrammarToken::Symbol(name) => Ok(name),
        other => Err(Simple::expected_input_found(span, None, Some(other))),
    })
}

fn grammar_file() -> impl Parser<GrammarToken, GrammarFile, Error = ParserError> {
    let newline = just(GrammarToken::Newline);
    let bar = just(GrammarToken::Bar);

    let header = symbol()
        .separated_by(bar.clone())
        .then_ignore(newline.clone().ignored().or(end()));

    let alternative = symbol()
        .map(|name| name.replace(VERTICAL_BAR, "|"))
        .repeated()
        .at_least(1);

    let rule = symbol()
        .then_ignore(just(GrammarToken::Arrow))
        .then(alternative.separated_by(bar).at_least(1))
        .map(|(lhs, alternatives)| RuleDecl { lhs, alternatives });

    let rules = newline
        .clone()
        .repeated()
        .ignore_then(
            rule.separated_by(newline.repeated().at_least(1))
                .allow_trailing(),
        );

    header
        .then(rules)
        .then_ignore(end())
        .map(|(dynamic_tokens, rules)| GrammarFile {
            dynamic_tokens,
            rules,
        })
}

fn syntax_error(source: &str, errors: Vec<ParserError>) -> GrammarLoadError {
    let Some(error) = errors.into_iter().min_by_key(|e| e.span().start) else {
        return GrammarLoadError::Empty;
    };
    let (line, column) = line_column(source, error.span().start);

    let found = match error.found() {
        Some(token) => token.to_string(),
        None => "end of input".to_string(),
    };
    let mut expected: Vec<String> = error
        .expected()
        .map(|token| match token {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    let message = if expected.is_empty() {
        format!("unexpected {found}")
    } else {
        format!("unexpected {found}, expected {}", expected.join(" or "))
    };
    GrammarLoadError::Syntax {
        line,
        column,
        message,
    }
}

/// 1-based line and column of a byte offset.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Symbol;

    const EXPRESSIONS: &str = "\
INT_LITERAL | ID
E -> T E'
E' -> + T E' | epsilon
T -> INT_LITERAL | ID | ( E )
";

    #[test]
    fn test_loads_rules_in_order() {
        let grammar = Grammar::parse(EXPRESSIONS).unwrap();
        assert_eq!(grammar.start(), "E");
        let rendered: Vec<String> = grammar.productions().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "E -> T E'",
                "E' -> + T E'",
                "E' -> epsilon",
                "T -> INT_LITERAL",
                "T -> ID",
                "T -> ( E )",
            ]
        );
        assert!(grammar.is_dynamic("INT_LITERAL"));
        assert!(grammar.is_dynamic("ID"));
    }

    #[test]
    fn test_blank_lines_and_missing_final_newline() {
        let grammar = Grammar::parse("\n\nS -> a\n\n\nS -> b").unwrap();
        assert!(grammar.dynamic_tokens().is_empty());
        assert_eq!(grammar.productions().len(), 2);
    }

    #[test]
    fn test_vertical_bar_placeholder() {
        let grammar = Grammar::parse("\nS -> a VERTICAL_BAR b | VERTICAL_BARVERTICAL_BAR\n").unwrap();
        assert_eq!(
            grammar.productions()[0].symbols,
            vec![
                Symbol::Terminal("a".into()),
                Symbol::Terminal("|".into()),
                Symbol::Terminal("b".into()),
            ]
        );
        assert_eq!(
            grammar.productions()[1].symbols,
            vec![Symbol::Terminal("||".into())]
        );
    }

    #[test]
    fn test_missing_arrow_is_reported_with_position() {
        let err = Grammar::parse("ID\nS -> a\nT b c\n").unwrap_err();
        match err {
            GrammarLoadError::Syntax { line, .. } => assert_eq!(line, 3),
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_alternative_is_rejected() {
        assert!(matches!(
            Grammar::parse("\nS -> a | | b\n"),
            Err(GrammarLoadError::Syntax { .. })
        ));
    }

    #[test]
    fn test_header_only_is_empty() {
        assert_eq!(Grammar::parse("ID | NUM\n"), Err(GrammarLoadError::Empty));
    }

    #[test]
    fn test_line_column() {
        assert_eq!(line_column("ab\ncd", 0), (1, 1));
        assert_eq!(line_column("ab\ncd", 4), (2, 2));
        assert_eq!(line_column("ab\ncd", 5), (2, 3));
    }
}
