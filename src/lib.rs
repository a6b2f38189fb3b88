//! # vcfront
//!
//! Compiler front end for the VC language. Two data-driven halves meet in the middle:
//!
//!     Lexing:
//!         An externally supplied deterministic automaton ([automaton]) is simulated over the
//!         source text by the [lexing] engine, producing [Token](lexing::Token) records and
//!         recoverable diagnostics.
//!
//!     Parsing:
//!         An externally supplied context-free [grammar] is analyzed ([analysis]: FIRST and
//!         FOLLOW sets), turned into an LL(1) [table], and the [parsing] stack machine derives a
//!         [ParseTree](tree::ParseTree) from the token stream.
//!
//! The [pipeline] module wires both halves into a single [Frontend](pipeline::Frontend) run.
//! File-level concerns live at the edges: [config] for the YAML run configuration and
//! [formats] for the token artifacts written by the `vcfront` binary.

pub mod analysis;
pub mod automaton;
pub mod config;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod lexing;
pub mod parsing;
pub mod pipeline;
pub mod table;
pub mod tree;

pub use error::{Error, Result};
pub use pipeline::Frontend;
