//! Lexical analysis by automaton simulation
//!
//!     The engine walks the source one character at a time, following the edges of the loaded
//!     [Automaton](crate::automaton::Automaton). Tokens end where the automaton has no edge for
//!     the next character, the current node is terminal, and either side of the boundary is a
//!     separator. Anything else is a lexical error: it is recorded as a [LexError], the partial
//!     token is dropped and lexing resumes from the starting node.
//!
//!     Whitespace is skipped only while the automaton sits in its starting node. Inside a token
//!     it is an ordinary character, which is what lets comments and string literals contain
//!     blanks.
//!
//!     Classification happens when a token closes: keyword spellings win, special literals come
//!     next, and only then the terminal type of the node the token ended in.

pub mod diagnostics;
pub mod engine;
pub mod token;

pub use diagnostics::LexError;
pub use engine::{tokenize, Lexed, Lexer, Recovery};
pub use token::{Token, TokenKind};
