//! Table-driven predictive parsing
//!
//!     The parser keeps a stack of pending grammar symbols, seeded with the end-of-input marker
//!     and the start symbol, and one token of lookahead. A token is looked up by its type when
//!     the grammar declares that type dynamic and by its spelling otherwise.
//!
//!     Expanding a non-terminal pops it and pushes the chosen production right to left. When
//!     the production has more than one symbol, a close marker goes underneath the symbols and
//!     an open event is emitted, which is how the group structure of the tree is recorded. The
//!     first mismatch ends the parse with a [SyntaxError]; no partial tree is returned.

use crate::grammar::{Grammar, Symbol};
use crate::lexing::diagnostics::escape;
use crate::lexing::Token;
use crate::table::{Lookahead, ParseTable};
use crate::tree::{ParseTree, TreeEvent};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} but got {}", describe_expected(.expected), describe_found(.found, .position))]
pub struct SyntaxError {
    /// What the parser could have accepted, sorted.
    pub expected: Vec<String>,
    /// Spelling of the offending token, `None` at end of input.
    pub found: Option<String>,
    /// Line and start column of the offending token.
    pub position: Option<(usize, usize)>,
}

fn describe_expected(expected: &[String]) -> String {
    match expected {
        [] => "unexpected input".to_string(),
        [only] => format!("expected '{only}'"),
        many => format!("expected one of '{}'", many.join("', '")),
    }
}

fn describe_found(found: &Option<String>, position: &Option<(usize, usize)>) -> String {
    match (found, position) {
        (Some(found), Some((line, column))) => {
            format!("'{}' at line {line}({column})", escape(found))
        }
        (Some(found), None) => format!("'{}'", escape(found)),
        (None, _) => "end of input".to_string(),
    }
}

impl SyntaxError {
    fn new(expected: Vec<String>, token: Option<&Token>) -> Self {
        SyntaxError {
            expected,
            found: token.map(|t| t.spelling.clone()),
            position: token.map(|t| (t.line, t.start)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackEntry<'g> {
    End,
    Symbol(&'g Symbol),
    Close,
}

pub struct PredictiveParser<'g> {
    grammar: &'g Grammar,
    table: &'g ParseTable,
}

impl<'g> PredictiveParser<'g> {
    pub fn new(grammar: &'g Grammar, table: &'g ParseTable) -> Self {
        PredictiveParser { grammar, table }
    }

    pub fn parse(&self, tokens: Vec<Token>) -> Result<ParseTree, SyntaxError> {
        let events = self.derive(tokens)?;
        Ok(ParseTree::assemble(events))
    }

    /// Run the stack machine, returning the tree events of a successful derivation.
    pub fn derive(&self, tokens: Vec<Token>) -> Result<Vec<TreeEvent>, SyntaxError> {
        let mut input = tokens.into_iter();
        let mut current = input.next();
        let mut stack = vec![StackEntry::End, StackEntry::Symbol(self.grammar.start_symbol())];
        let mut events = Vec::new();

        while let Some(top) = stack.pop() {
            let key = self.lookahead_of(current.as_ref());
            match top {
                StackEntry::Close => events.push(TreeEvent::Close),
                StackEntry::End => {
                    if key != Lookahead::End {
                        return Err(SyntaxError::new(
                            vec![Lookahead::End.to_string()],
                            current.as_ref(),
                        ));
                    }
                }
                StackEntry::Symbol(Symbol::Epsilon) => {}
                StackEntry::Symbol(Symbol::Terminal(name)) => {
                    match current.take() {
                        Some(token) if key == Lookahead::terminal(name.as_str()) => {
                            events.push(TreeEvent::Leaf(token));
                            current = input.next();
                        }
                        other => {
                            return Err(SyntaxError::new(vec![name.clone()], other.as_ref()));
                        }
                    }
                }
                StackEntry::Symbol(Symbol::NonTerminal(name)) => {
                    let Some(id) = self.table.get(name, &key) else {
                        let expected = self
                            .table
                            .expected(name)
                            .into_iter()
                            .map(ToString::to_string)
                            .collect();
                        return Err(SyntaxError::new(expected, current.as_ref()));
                    };
                    let production = self.grammar.production(id);
                    debug!(%production, lookahead = %key, "expanding");
                    match production.symbols.as_slice() {
                        [only] => stack.push(StackEntry::Symbol(only)),
                        symbols => {
                            stack.push(StackEntry::Close);
                            events.push(TreeEvent::Open);
                            stack.extend(symbols.iter().rev().map(StackEntry::Symbol));
                        }
                    }
                }
            }
        }

        Ok(events)
    }

    fn lookahead_of(&self, token: Option<&Token>) -> Lookahead {
        match token {
            None => Lookahead::End,
            Some(token) => {
                let kind = token.kind.name();
                if self.grammar.is_dynamic(kind) {
                    Lookahead::terminal(kind)
                } else {
                    Lookahead::terminal(token.spelling.as_str())
                }
            }
        }
    }
}
