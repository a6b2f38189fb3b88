//! Derivation trees
//!
//!     The parser does not build nodes directly. It emits a flat stream of [TreeEvent]s (a
//!     group opens, a token is matched, a group closes) and [ParseTree::assemble] folds that
//!     stream into nested groups. Single-child groups collapse into their child and empty
//!     groups vanish, so the tree only keeps the structure that carries information.
//!
//!     Two renderings are provided: the bracketed artifact form written to `.vcps` files and
//!     an indented form for terminals.

use crate::lexing::Token;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParseTree {
    Leaf(Token),
    Group(Vec<ParseTree>),
}

/// Parser output, in derivation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    Open,
    Leaf(Token),
    Close,
}

impl ParseTree {
    /// Fold an event stream into a tree.
    ///
    /// Unbalanced streams are tolerated: a stray close is ignored and groups still open at the
    /// end are closed. A derivation of a single token is that leaf; an empty derivation is the
    /// empty group.
    pub fn assemble(events: impl IntoIterator<Item = TreeEvent>) -> ParseTree {
        let mut stack: Vec<Vec<ParseTree>> = vec![Vec::new()];
        for event in events {
            match event {
                TreeEvent::Open => stack.push(Vec::new()),
                TreeEvent::Leaf(token) => {
                    if let Some(children) = stack.last_mut() {
                        children.push(ParseTree::Leaf(token));
                    }
                }
                TreeEvent::Close => {
                    if stack.len() > 1 {
                        if let Some(children) = stack.pop() {
                            attach(&mut stack, children);
                        }
                    }
                }
            }
        }
        while stack.len() > 1 {
            if let Some(children) = stack.pop() {
                attach(&mut stack, children);
            }
        }

        let mut root = stack.pop().unwrap_or_default();
        match root.len() {
            1 => root.remove(0),
            _ => ParseTree::Group(root),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ParseTree::Leaf(_))
    }

    pub fn children(&self) -> &[ParseTree] {
        match self {
            ParseTree::Leaf(_) => &[],
            ParseTree::Group(children) => children,
        }
    }

    /// Leaf tokens in source order.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'t>(&'t self, out: &mut Vec<&'t Token>) {
        match self {
            ParseTree::Leaf(token) => out.push(token),
            ParseTree::Group(children) => {
                for child in children {
                    child.collect_tokens(out);
                }
            }
        }
    }

    /// Bracketed artifact form: `( 1 ( + 2 ) )`.
    pub fn to_bracketed(&self) -> String {
        let mut out = String::new();
        self.write_bracketed(&mut out);
        out
    }

    fn write_bracketed(&self, out: &mut String) {
        match self {
            ParseTree::Leaf(token) => out.push_str(&token.spelling),
            ParseTree::Group(children) => {
                out.push('(');
                for child in children {
                    out.push(' ');
                    child.write_bracketed(out);
                }
                out.push_str(" )");
            }
        }
    }

    /// One node per line, each nesting level prefixed with `|   `.
    pub fn render_indented(&self) -> String {
        let mut out = String::new();
        self.write_indented(&mut out, 0);
        out
    }

    fn write_indented(&self, out: &mut String, depth: usize) {
        let indent = "|   ".repeat(depth);
        match self {
            ParseTree::Leaf(token) => {
                out.push_str(&indent);
                out.push_str(&token.spelling);
                out.push('\n');
            }
            ParseTree::Group(children) => {
                out.push_str(&indent);
                out.push_str("(\n");
                for child in children {
                    child.write_indented(out, depth + 1);
                }
                out.push_str(&indent);
                out.push_str(")\n");
            }
        }
    }
}

/// Close a group into its parent, dropping it when empty and collapsing it when it has a
/// single child.
fn attach(stack: &mut [Vec<ParseTree>], mut children: Vec<ParseTree>) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    match children.len() {
        0 => {}
        1 => parent.extend(children.pop()),
        _ => parent.push(ParseTree::Group(children)),
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bracketed())
    }
}
