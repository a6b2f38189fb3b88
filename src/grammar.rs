//! Context-free grammar model
//!
//!     A grammar is a list of productions in declaration order. The left-hand side of the first
//!     production is the start symbol. Symbols are partitioned at construction time: anything
//!     that appears on a left-hand side is a non-terminal, the literal `epsilon` is the empty
//!     string, and every other right-hand-side symbol is a terminal.
//!
//!     Terminals listed as dynamic tokens are matched against a token's lexical type
//!     (`INT_LITERAL`) instead of its spelling (`+`). See [loader] for the text format.

pub mod loader;
pub mod tokens;

pub use loader::GrammarLoadError;

use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// Spelling of the empty-string symbol in grammar descriptions.
pub const EPSILON: &str = "epsilon";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
    Epsilon,
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name,
            Symbol::Epsilon => EPSILON,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a production inside its [Grammar].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductionId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub lhs: String,
    pub symbols: Vec<Symbol>,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for symbol in &self.symbols {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

/// A rule as written: left-hand side and its alternatives, symbols still unclassified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
    pub lhs: String,
    pub alternatives: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    start: Symbol,
    productions: Vec<Production>,
    /// Non-terminals in order of first declaration.
    non_terminals: Vec<String>,
    terminals: BTreeSet<String>,
    dynamic_tokens: BTreeSet<String>,
}

impl Grammar {
    /// Build a grammar from declared rules. Rules sharing a left-hand side are merged in order;
    /// an alternative repeated under the same left-hand side is kept once.
    pub fn new(
        dynamic_tokens: impl IntoIterator<Item = String>,
        rules: Vec<RuleDecl>,
    ) -> Result<Self, GrammarLoadError> {
        let Some(first) = rules.first() else {
            return Err(GrammarLoadError::Empty);
        };
        let start = Symbol::NonTerminal(first.lhs.clone());

        let mut non_terminals: Vec<String> = Vec::new();
        for rule in &rules {
            if !non_terminals.contains(&rule.lhs) {
                non_terminals.push(rule.lhs.clone());
            }
        }
        let declared: BTreeSet<&str> = non_terminals.iter().map(String::as_str).collect();

        let mut productions: Vec<Production> = Vec::new();
        let mut terminals = BTreeSet::new();
        for rule in rules.iter() {
            for alternative in &rule.alternatives {
                let symbols: Vec<Symbol> = alternative
                    .iter()
                    .map(|name| match name.as_str() {
                        EPSILON => Symbol::Epsilon,
                        nt if declared.contains(nt) => Symbol::NonTerminal(name.clone()),
                        _ => {
                            terminals.insert(name.clone());
                            Symbol::Terminal(name.clone())
                        }
                    })
                    .collect();
                let production = Production {
                    lhs: rule.lhs.clone(),
                    symbols,
                };
                if productions.contains(&production) {
                    warn!(%production, "duplicate alternative ignored");
                    continue;
                }
                productions.push(production);
            }
        }

        Ok(Grammar {
            start,
            productions,
            non_terminals,
            terminals,
            dynamic_tokens: dynamic_tokens.into_iter().collect(),
        })
    }

    /// The start symbol's name.
    pub fn start(&self) -> &str {
        self.start.name()
    }

    pub fn start_symbol(&self) -> &Symbol {
        &self.start
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.0]
    }

    /// Productions with their ids, in declaration order.
    pub fn enumerate(&self) -> impl Iterator<Item = (ProductionId, &Production)> {
        self.productions
            .iter()
            .enumerate()
            .map(|(index, production)| (ProductionId(index), production))
    }

    /// Alternatives of one non-terminal, in declaration order.
    pub fn alternatives<'g>(
        &'g self,
        non_terminal: &'g str,
    ) -> impl Iterator<Item = (ProductionId, &'g Production)> + 'g {
        self.enumerate()
            .filter(move |(_, production)| production.lhs == non_terminal)
    }

    pub fn non_terminals(&self) -> &[String] {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &BTreeSet<String> {
        &self.terminals
    }

    pub fn dynamic_tokens(&self) -> &BTreeSet<String> {
        &self.dynamic_tokens
    }

    pub fn is_dynamic(&self, token_type: &str) -> bool {
        self.dynamic_tokens.contains(token_type)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for production in &self.productions {
            writeln!(f, "{production}")?;
        }
        Ok(())
    }
}
