//! Crate-level error type
//!
//! Each stage owns its own error type next to the code that produces it. This enum only
//! aggregates them for callers that drive a whole run (the [pipeline](crate::pipeline) and the
//! binary).

use crate::automaton::AutomatonError;
use crate::config::ConfigError;
use crate::grammar::GrammarLoadError;
use crate::lexing::LexError;
use crate::parsing::SyntaxError;
use crate::table::GrammarConfigError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Automaton(#[from] AutomatonError),

    #[error(transparent)]
    GrammarLoad(#[from] GrammarLoadError),

    #[error(transparent)]
    GrammarConfig(#[from] GrammarConfigError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Lexing was run under the halting recovery policy and reported diagnostics.
    #[error("{}", summarize_lexical(.0))]
    Lexical(Vec<LexError>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to serialize tokens: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn summarize_lexical(diagnostics: &[LexError]) -> String {
    match diagnostics {
        [] => "lexing failed".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more lexical errors)", rest.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::MatchSpec;

    fn diagnostic(found: char) -> LexError {
        LexError {
            line: 1,
            column: 2,
            found: Some(found),
            pending: String::new(),
            expected: vec![MatchSpec::Include(vec!['a'])],
        }
    }

    #[test]
    fn test_lexical_summary_mentions_remaining_count() {
        let err = Error::Lexical(vec![diagnostic('#'), diagnostic('@'), diagnostic('!')]);
        let message = err.to_string();
        assert!(message.contains("'#'"));
        assert!(message.ends_with("(and 2 more lexical errors)"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io(
            "missing.dat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.to_string(), "missing.dat: no such file");
    }
}
