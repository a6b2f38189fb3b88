//! LL(1) parse table
//!
//!     Every production `A -> α` is registered under (A, t) for each terminal t in FIRST(α).
//!     When α is nullable it is also registered under every lookahead in FOLLOW(A), end of input
//!     included. A cell that ends up with more than one production means the grammar is not
//!     LL(1); building fails and reports every such cell, so no input is ever parsed with an
//!     ambiguous table.

use crate::analysis::{GrammarAnalysis, END_MARKER};
use crate::grammar::{Grammar, ProductionId};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Column key of the table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lookahead {
    Terminal(String),
    End,
}

impl Lookahead {
    pub fn terminal(name: impl Into<String>) -> Self {
        Lookahead::Terminal(name.into())
    }
}

impl fmt::Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookahead::Terminal(name) => f.write_str(name),
            Lookahead::End => f.write_str(END_MARKER),
        }
    }
}

/// One ambiguous cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConflict {
    pub non_terminal: String,
    pub lookahead: Lookahead,
    /// Colliding productions, rendered `A -> α`, in declaration order.
    pub productions: Vec<String>,
}

impl fmt::Display for TableConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "conflict at ({}, {}): {}",
            self.non_terminal,
            self.lookahead,
            self.productions.join(" / ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarConfigError {
    #[error("grammar is not LL(1): {}", render_conflicts(.0))]
    Conflicts(Vec<TableConflict>),
}

impl GrammarConfigError {
    pub fn conflicts(&self) -> &[TableConflict] {
        match self {
            GrammarConfigError::Conflicts(conflicts) => conflicts,
        }
    }
}

fn render_conflicts(conflicts: &[TableConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    cells: BTreeMap<String, BTreeMap<Lookahead, ProductionId>>,
}

impl ParseTable {
    pub fn build(grammar: &Grammar, analysis: &GrammarAnalysis) -> Result<Self, GrammarConfigError> {
        let mut candidates: BTreeMap<String, BTreeMap<Lookahead, Vec<ProductionId>>> =
            BTreeMap::new();

        for (id, production) in grammar.enumerate() {
            let row = candidates.entry(production.lhs.clone()).or_default();
            let first = analysis.first_of(&production.symbols);

            let mut register = |lookahead: Lookahead| {
                let cell = row.entry(lookahead).or_default();
                if !cell.contains(&id) {
                    cell.push(id);
                }
            };

            for terminal in &first.terminals {
                register(Lookahead::terminal(terminal.as_str()));
            }
            if first.nullable {
                if let Some(follow) = analysis.follow(&production.lhs) {
                    for terminal in &follow.terminals {
                        register(Lookahead::terminal(terminal.as_str()));
                    }
                    if follow.end {
                        register(Lookahead::End);
                    }
                }
            }
        }

        let mut conflicts = Vec::new();
        let mut cells: BTreeMap<String, BTreeMap<Lookahead, ProductionId>> = BTreeMap::new();
        for (non_terminal, row) in candidates {
            for (lookahead, ids) in row {
                match ids.as_slice() {
                    [only] => {
                        cells
                            .entry(non_terminal.clone())
                            .or_default()
                            .insert(lookahead, *only);
                    }
                    _ => conflicts.push(TableConflict {
                        non_terminal: non_terminal.clone(),
                        lookahead,
                        productions: ids
                            .iter()
                            .map(|id| grammar.production(*id).to_string())
                            .collect(),
                    }),
                }
            }
        }

        if !conflicts.is_empty() {
            return Err(GrammarConfigError::Conflicts(conflicts));
        }

        let table = ParseTable { cells };
        info!(
            non_terminals = table.cells.len(),
            cells = table.len(),
            "parse table built"
        );
        Ok(table)
    }

    /// Production to expand `non_terminal` with when `lookahead` is next.
    pub fn get(&self, non_terminal: &str, lookahead: &Lookahead) -> Option<ProductionId> {
        self.cells.get(non_terminal)?.get(lookahead).copied()
    }

    /// Lookaheads with an entry for `non_terminal`, sorted.
    pub fn expected(&self, non_terminal: &str) -> Vec<&Lookahead> {
        self.cells
            .get(non_terminal)
            .map(|row| row.keys().collect())
            .unwrap_or_default()
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.cells.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All populated cells, sorted by non-terminal then lookahead.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Lookahead, ProductionId)> {
        self.cells.iter().flat_map(|(non_terminal, row)| {
            row.iter()
                .map(move |(lookahead, id)| (non_terminal.as_str(), lookahead, *id))
        })
    }
}
