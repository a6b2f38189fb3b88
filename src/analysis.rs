//! FIRST and FOLLOW sets
//!
//!     Both tables are computed once per grammar and owned by a [GrammarAnalysis]; nothing is
//!     cached globally, and a changed grammar means a new analysis.
//!
//!     FIRST:
//!         Iterated to a fixed point over all productions. A production contributes the FIRST set
//!         of its leading symbol; while that symbol is nullable the cascade moves on to the next
//!         one, and a production whose symbols are all nullable makes its left-hand side nullable.
//!
//!     FOLLOW:
//!         Resolved by recursive descent over every occurrence of a non-terminal. A symbol is
//!         marked in progress before its dependencies are visited; a re-entrant request for it
//!         gets the value from the previous round (empty in the first round) instead of recursing.
//!         Rounds are repeated until no set changes, which both terminates on mutually recursive
//!         FOLLOW dependencies and fills in what a single round had to cut short.

use crate::grammar::{Grammar, Symbol, EPSILON};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Marker for end of input in FOLLOW sets and parse-table lookaheads.
pub const END_MARKER: &str = "$";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstSet {
    pub terminals: BTreeSet<String>,
    /// The sequence can derive the empty string.
    pub nullable: bool,
}

impl FirstSet {
    /// Union `other` into `self`, reporting whether anything was added.
    fn absorb(&mut self, other: &FirstSet) -> bool {
        let before = self.terminals.len();
        self.terminals.extend(other.terminals.iter().cloned());
        let grew = self.terminals.len() != before || (other.nullable && !self.nullable);
        self.nullable |= other.nullable;
        grew
    }
}

impl fmt::Display for FirstSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items: Vec<&str> = self.terminals.iter().map(String::as_str).collect();
        if self.nullable {
            items.push(EPSILON);
        }
        write!(f, "{{{}}}", items.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowSet {
    pub terminals: BTreeSet<String>,
    /// End of input may follow.
    pub end: bool,
}

impl FollowSet {
    fn merge(&mut self, other: &FollowSet) {
        self.terminals.extend(other.terminals.iter().cloned());
        self.end |= other.end;
    }
}

impl fmt::Display for FollowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items: Vec<&str> = self.terminals.iter().map(String::as_str).collect();
        if self.end {
            items.push(END_MARKER);
        }
        write!(f, "{{{}}}", items.join(", "))
    }
}

/// Memoized FIRST and FOLLOW tables of one grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarAnalysis {
    first: BTreeMap<String, FirstSet>,
    follow: BTreeMap<String, FollowSet>,
}

impl GrammarAnalysis {
    pub fn new(grammar: &Grammar) -> Self {
        let first = compute_first_sets(grammar);
        let follow = compute_follow_sets(grammar, &first);
        GrammarAnalysis { first, follow }
    }

    /// FIRST set of a non-terminal.
    pub fn first(&self, non_terminal: &str) -> Option<&FirstSet> {
        self.first.get(non_terminal)
    }

    /// FIRST set of a symbol sequence.
    pub fn first_of(&self, symbols: &[Symbol]) -> FirstSet {
        first_of_sequence(&self.first, symbols)
    }

    /// FOLLOW set of a non-terminal.
    pub fn follow(&self, non_terminal: &str) -> Option<&FollowSet> {
        self.follow.get(non_terminal)
    }

    /// FIRST sets keyed by non-terminal, sorted by name.
    pub fn first_sets(&self) -> &BTreeMap<String, FirstSet> {
        &self.first
    }

    /// FOLLOW sets keyed by non-terminal, sorted by name.
    pub fn follow_sets(&self) -> &BTreeMap<String, FollowSet> {
        &self.follow
    }
}

fn first_of_sequence(first: &BTreeMap<String, FirstSet>, symbols: &[Symbol]) -> FirstSet {
    let mut result = FirstSet::default();
    for symbol in symbols {
        match symbol {
            Symbol::Epsilon => continue,
            Symbol::Terminal(name) => {
                result.terminals.insert(name.clone());
                return result;
            }
            Symbol::NonTerminal(name) => {
                let Some(set) = first.get(name) else {
                    return result;
                };
                result.terminals.extend(set.terminals.iter().cloned());
                if !set.nullable {
                    return result;
                }
            }
        }
    }
    result.nullable = true;
    result
}

fn compute_first_sets(grammar: &Grammar) -> BTreeMap<String, FirstSet> {
    let mut first: BTreeMap<String, FirstSet> = grammar
        .non_terminals()
        .iter()
        .map(|nt| (nt.clone(), FirstSet::default()))
        .collect();

    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut changed = false;
        for production in grammar.productions() {
            let contribution = first_of_sequence(&first, &production.symbols);
            if let Some(entry) = first.get_mut(&production.lhs) {
                changed |= entry.absorb(&contribution);
            }
        }
        if !changed {
            break;
        }
    }
    debug!(rounds, "FIRST sets settled");
    first
}

fn compute_follow_sets(
    grammar: &Grammar,
    first: &BTreeMap<String, FirstSet>,
) -> BTreeMap<String, FollowSet> {
    let mut settled: BTreeMap<String, FollowSet> = BTreeMap::new();
    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut round = FollowRound {
            grammar,
            first,
            previous: &settled,
            resolved: BTreeMap::new(),
            in_progress: BTreeSet::new(),
        };
        for non_terminal in grammar.non_terminals() {
            round.resolve(non_terminal);
        }
        let next = round.resolved;
        if next == settled {
            break;
        }
        settled = next;
    }
    debug!(rounds, "FOLLOW sets settled");
    settled
}

/// One pass of guarded FOLLOW resolution.
struct FollowRound<'g> {
    grammar: &'g Grammar,
    first: &'g BTreeMap<String, FirstSet>,
    previous: &'g BTreeMap<String, FollowSet>,
    resolved: BTreeMap<String, FollowSet>,
    in_progress: BTreeSet<String>,
}

impl<'g> FollowRound<'g> {
    fn resolve(&mut self, target: &str) -> FollowSet {
        if let Some(done) = self.resolved.get(target) {
            return done.clone();
        }
        if !self.in_progress.insert(target.to_string()) {
            return self.previous.get(target).cloned().unwrap_or_default();
        }

        let grammar = self.grammar;
        let mut set = FollowSet {
            end: target == grammar.start(),
            ..FollowSet::default()
        };

        for production in grammar.productions() {
            for (index, symbol) in production.symbols.iter().enumerate() {
                if !matches!(symbol, Symbol::NonTerminal(name) if name == target) {
                    continue;
                }
                let rest = &production.symbols[index + 1..];
                match rest.first() {
                    None => {
                        if production.lhs != target {
                            let inherited = self.resolve(&production.lhs);
                            set.merge(&inherited);
                        }
                    }
                    Some(Symbol::Terminal(name)) => {
                        set.terminals.insert(name.clone());
                    }
                    Some(_) => {
                        let suffix = first_of_sequence(self.first, rest);
                        set.terminals.extend(suffix.terminals);
                        if suffix.nullable && production.lhs != target {
                            let inherited = self.resolve(&production.lhs);
                            set.merge(&inherited);
                        }
                    }
                }
            }
        }

        self.in_progress.remove(target);
        self.resolved.insert(target.to_string(), set.clone());
        set
    }
}
