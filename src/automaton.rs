//! Deterministic finite automaton driving the lexer
//!
//!     The automaton is data, not code: it is loaded from a description file (see
//!     [description]) and only ever read afterwards. Every node owns an ordered list of edges;
//!     each edge carries a [MatchSpec] deciding which characters it accepts. Edges are tried in
//!     insertion order and the first match wins, so an automaton can put a narrow inclusion set
//!     ahead of a catch-all exclusion.
//!
//!     Besides the graph, an automaton carries its lexicon: keyword and special-literal spellings
//!     that override the node's terminal type, the separator characters that license a token
//!     boundary, and the ordered catalog of terminal-type names used for report ordinals.

pub mod description;

use std::collections::BTreeSet;
use thiserror::Error;

/// Prefix marking an exclusion set in the textual match-spec encoding.
pub const EXCLUSION_PREFIX: &str = "EXCLUDE";

/// Per-edge character acceptance rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchSpec {
    /// Accepts any of the listed characters.
    Include(Vec<char>),
    /// Accepts any character except the listed ones.
    Exclude(Vec<char>),
}

impl MatchSpec {
    /// Decode the textual encoding used by automaton descriptions.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(EXCLUSION_PREFIX) {
            Some(excluded) => MatchSpec::Exclude(excluded.chars().collect()),
            None => MatchSpec::Include(raw.chars().collect()),
        }
    }

    pub fn matches(&self, c: char) -> bool {
        match self {
            MatchSpec::Include(chars) => chars.contains(&c),
            MatchSpec::Exclude(chars) => !chars.contains(&c),
        }
    }

    pub fn is_exclusion(&self) -> bool {
        matches!(self, MatchSpec::Exclude(_))
    }
}

/// Index of a node inside its [Automaton].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub spec: MatchSpec,
    pub target: StateId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomatonNode {
    pub id: String,
    pub starting: bool,
    pub terminal: bool,
    pub terminal_type: Option<String>,
    pub edges: Vec<Edge>,
}

impl AutomatonNode {
    /// Follow the first edge accepting `c`.
    pub fn step(&self, c: char) -> Option<StateId> {
        self.edges
            .iter()
            .find(|edge| edge.spec.matches(c))
            .map(|edge| edge.target)
    }

    /// The acceptance rules of every outgoing edge, in edge order.
    pub fn expectations(&self) -> Vec<MatchSpec> {
        self.edges.iter().map(|edge| edge.spec.clone()).collect()
    }
}

/// Spelling-level information attached to an automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    pub keywords: BTreeSet<String>,
    pub special_literals: BTreeSet<String>,
    pub separators: BTreeSet<char>,
    pub terminal_types: Vec<String>,
}

/// A node as declared, before edge targets are resolved to [StateId]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDecl {
    pub id: String,
    pub starting: bool,
    pub terminal: bool,
    pub terminal_type: Option<String>,
    pub children: Vec<(MatchSpec, String)>,
}

#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("automaton has no starting node")]
    NoStartingNode,

    #[error("automaton has several starting nodes: {}", .0.join(", "))]
    MultipleStartingNodes(Vec<String>),

    #[error("node '{node}' has an edge to unknown node '{target}'")]
    UnknownTarget { node: String, target: String },

    #[error("terminal node '{0}' does not declare a terminal type")]
    MissingTerminalType(String),

    #[error("malformed automaton description: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    nodes: Vec<AutomatonNode>,
    start: StateId,
    lexicon: Lexicon,
}

impl Automaton {
    /// Resolve declared nodes into an automaton.
    ///
    /// Exactly one node must be starting, every edge must point at a declared node and every
    /// terminal node must name its terminal type.
    pub fn new(decls: Vec<NodeDecl>, lexicon: Lexicon) -> Result<Self, AutomatonError> {
        let index_of = |id: &str| decls.iter().position(|decl| decl.id == id).map(StateId);

        let starting: Vec<&NodeDecl> = decls.iter().filter(|decl| decl.starting).collect();
        let start = match starting.as_slice() {
            [] => return Err(AutomatonError::NoStartingNode),
            [only] => index_of(&only.id).ok_or(AutomatonError::NoStartingNode)?,
            many => {
                let mut ids: Vec<String> = many.iter().map(|decl| decl.id.clone()).collect();
                ids.sort();
                return Err(AutomatonError::MultipleStartingNodes(ids));
            }
        };

        let mut nodes = Vec::with_capacity(decls.len());
        for decl in &decls {
            if decl.terminal && decl.terminal_type.is_none() {
                return Err(AutomatonError::MissingTerminalType(decl.id.clone()));
            }
            let mut edges = Vec::with_capacity(decl.children.len());
            for (spec, target) in &decl.children {
                let target = index_of(target).ok_or_else(|| AutomatonError::UnknownTarget {
                    node: decl.id.clone(),
                    target: target.clone(),
                })?;
                edges.push(Edge {
                    spec: spec.clone(),
                    target,
                });
            }
            nodes.push(AutomatonNode {
                id: decl.id.clone(),
                starting: decl.starting,
                terminal: decl.terminal,
                terminal_type: decl.terminal_type.clone(),
                edges,
            });
        }

        Ok(Automaton {
            nodes,
            start,
            lexicon,
        })
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn node(&self, state: StateId) -> &AutomatonNode {
        &self.nodes[state.0]
    }

    pub fn nodes(&self) -> &[AutomatonNode] {
        &self.nodes
    }

    pub fn is_separator(&self, c: char) -> bool {
        self.lexicon.separators.contains(&c)
    }

    pub fn is_keyword(&self, spelling: &str) -> bool {
        self.lexicon.keywords.contains(spelling)
    }

    pub fn is_special_literal(&self, spelling: &str) -> bool {
        self.lexicon.special_literals.contains(spelling)
    }

    /// Position of a terminal-type name in the catalog.
    pub fn terminal_ordinal(&self, name: &str) -> Option<usize> {
        self.lexicon.terminal_types.iter().position(|t| t == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(id: &str, starting: bool, terminal: Option<&str>) -> NodeDecl {
        NodeDecl {
            id: id.to_string(),
            starting,
            terminal: terminal.is_some(),
            terminal_type: terminal.map(str::to_string),
            children: Vec::new(),
        }
    }

    #[test]
    fn test_match_spec_parsing() {
        assert_eq!(MatchSpec::parse("ab"), MatchSpec::Include(vec!['a', 'b']));
        assert_eq!(MatchSpec::parse("EXCLUDE\n"), MatchSpec::Exclude(vec!['\n']));
        assert_eq!(MatchSpec::parse("EXCLUDE"), MatchSpec::Exclude(vec![]));
    }

    #[test]
    fn test_match_spec_matching() {
        let include = MatchSpec::parse("+-");
        assert!(include.matches('+'));
        assert!(!include.matches('*'));

        let exclude = MatchSpec::parse("EXCLUDE\"\\");
        assert!(exclude.matches('a'));
        assert!(exclude.matches(' '));
        assert!(!exclude.matches('"'));
        assert!(!exclude.matches('\\'));
    }

    #[test]
    fn test_first_matching_edge_wins() {
        let mut start = decl("0", true, None);
        start.children = vec![
            (MatchSpec::parse("a"), "1".to_string()),
            (MatchSpec::parse("EXCLUDE"), "2".to_string()),
        ];
        let automaton = Automaton::new(
            vec![start, decl("1", false, Some("A")), decl("2", false, Some("ANY"))],
            Lexicon::default(),
        )
        .unwrap();

        let start = automaton.node(automaton.start());
        assert_eq!(automaton.node(start.step('a').unwrap()).id, "1");
        assert_eq!(automaton.node(start.step('b').unwrap()).id, "2");
    }

    #[test]
    fn test_requires_exactly_one_starting_node() {
        let none = Automaton::new(vec![decl("0", false, None)], Lexicon::default());
        assert!(matches!(none, Err(AutomatonError::NoStartingNode)));

        let many = Automaton::new(
            vec![decl("b", true, None), decl("a", true, None)],
            Lexicon::default(),
        );
        match many {
            Err(AutomatonError::MultipleStartingNodes(ids)) => assert_eq!(ids, vec!["a", "b"]),
            other => panic!("expected MultipleStartingNodes, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_targets() {
        let mut start = decl("0", true, None);
        start.children = vec![(MatchSpec::parse("x"), "7".to_string())];
        let err = Automaton::new(vec![start], Lexicon::default()).unwrap_err();
        assert_eq!(err.to_string(), "node '0' has an edge to unknown node '7'");
    }

    #[test]
    fn test_terminal_nodes_need_a_type() {
        let mut node = decl("1", false, None);
        node.terminal = true;
        let err = Automaton::new(vec![decl("0", true, None), node], Lexicon::default());
        assert!(matches!(err, Err(AutomatonError::MissingTerminalType(id)) if id == "1"));
    }
}
