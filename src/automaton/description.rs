//! JSON automaton description
//!
//! The on-disk shape is kept as the VC tool chain has always written it:
//!
//! ```json
//! {
//!   "keywords": ["int", "return"],
//!   "special_literals": ["true", "false"],
//!   "separators": " \t\n+()",
//!   "terminal_types": ["ID", "KEYWORD", "INT_LITERAL"],
//!   "nodes": {
//!     "0": { "starting": true, "terminal": false, "children": { "0123456789": "1" } },
//!     "1": { "starting": false, "terminal": true, "terminal_type": "INT_LITERAL",
//!            "children": { "0123456789": "1" } }
//!   }
//! }
//! ```
//!
//! The order of `children` is significant (first matching edge wins), so the map is read with a
//! dedicated visitor instead of going through an unordered map type.

use super::{Automaton, AutomatonError, Lexicon, MatchSpec, NodeDecl};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct AutomatonDescription {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub special_literals: Vec<String>,
    #[serde(default)]
    pub separators: String,
    #[serde(default)]
    pub terminal_types: Vec<String>,
    pub nodes: BTreeMap<String, NodeDescription>,
}

#[derive(Debug, Deserialize)]
pub struct NodeDescription {
    #[serde(default)]
    pub starting: bool,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub terminal_type: Option<String>,
    #[serde(default, deserialize_with = "ordered_children")]
    pub children: Vec<(String, String)>,
}

fn ordered_children<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ChildrenVisitor;

    impl<'de> Visitor<'de> for ChildrenVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map from match spec to node id")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut children = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((spec, target)) = map.next_entry::<String, String>()? {
                children.push((spec, target));
            }
            Ok(children)
        }
    }

    deserializer.deserialize_map(ChildrenVisitor)
}

impl AutomatonDescription {
    pub fn from_json_str(text: &str) -> Result<Self, AutomatonError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_automaton(self) -> Result<Automaton, AutomatonError> {
        let lexicon = Lexicon {
            keywords: self.keywords.into_iter().collect(),
            special_literals: self.special_literals.into_iter().collect(),
            separators: self.separators.chars().collect(),
            terminal_types: self.terminal_types,
        };
        let decls = self
            .nodes
            .into_iter()
            .map(|(id, node)| NodeDecl {
                id,
                starting: node.starting,
                terminal: node.terminal,
                terminal_type: node.terminal_type,
                children: node
                    .children
                    .into_iter()
                    .map(|(spec, target)| (MatchSpec::parse(&spec), target))
                    .collect(),
            })
            .collect();
        Automaton::new(decls, lexicon)
    }
}

impl Automaton {
    /// Load an automaton from its JSON description.
    pub fn from_json_str(text: &str) -> Result<Self, AutomatonError> {
        AutomatonDescription::from_json_str(text)?.into_automaton()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRINGS: &str = r#"{
        "separators": " ",
        "terminal_types": ["STRING"],
        "nodes": {
            "0": { "starting": true, "terminal": false, "children": { "\"": "1" } },
            "1": { "starting": false, "terminal": false,
                   "children": { "\"": "2", "\\": "3", "EXCLUDE\"\\\n": "1" } },
            "2": { "starting": false, "terminal": true, "terminal_type": "STRING" },
            "3": { "starting": false, "terminal": false, "children": { "EXCLUDE\n": "1" } }
        }
    }"#;

    #[test]
    fn test_children_keep_declaration_order() {
        let description = AutomatonDescription::from_json_str(STRINGS).unwrap();
        let body = &description.nodes["1"].children;
        let specs: Vec<&str> = body.iter().map(|(spec, _)| spec.as_str()).collect();
        assert_eq!(specs, vec!["\"", "\\", "EXCLUDE\"\\\n"]);
    }

    #[test]
    fn test_loads_into_automaton() {
        let automaton = Automaton::from_json_str(STRINGS).unwrap();
        assert_eq!(automaton.nodes().len(), 4);
        assert_eq!(automaton.node(automaton.start()).id, "0");
        assert!(automaton.is_separator(' '));
        assert_eq!(automaton.terminal_ordinal("STRING"), Some(0));

        let body = automaton
            .nodes()
            .iter()
            .find(|node| node.id == "1")
            .unwrap();
        assert_eq!(
            body.expectations(),
            vec![
                MatchSpec::Include(vec!['"']),
                MatchSpec::Include(vec!['\\']),
                MatchSpec::Exclude(vec!['"', '\\', '\n']),
            ]
        );
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = Automaton::from_json_str("{ \"nodes\": [] }").unwrap_err();
        assert!(matches!(err, AutomatonError::Json(_)));
    }
}
