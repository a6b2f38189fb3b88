//! Run configuration
//!
//! An optional YAML file names the automaton and grammar descriptions and sets the lexer
//! policy. Every field has a default, so an empty file (or no file at all) is a valid
//! configuration:
//!
//!     automaton: dfa.dat
//!     grammar: grammar.dat
//!     lexer:
//!       recovery: continue      # continue | halt
//!       drop_kinds: [COMMENT]
//!
//! Command-line flags are applied on top of the loaded values by the binary.

use crate::lexing::Recovery;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_AUTOMATON: &str = "dfa.dat";
pub const DEFAULT_GRAMMAR: &str = "grammar.dat";
/// Terminal type of comment tokens.
pub const COMMENT_KIND: &str = "COMMENT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendConfig {
    pub automaton: PathBuf,
    pub grammar: PathBuf,
    pub lexer: LexerConfig,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        FrontendConfig {
            automaton: PathBuf::from(DEFAULT_AUTOMATON),
            grammar: PathBuf::from(DEFAULT_GRAMMAR),
            lexer: LexerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexerConfig {
    pub recovery: Recovery,
    /// Token kinds removed from the stream before it is written or parsed.
    pub drop_kinds: Vec<String>,
}

impl LexerConfig {
    /// Add `kind` to the dropped kinds unless it is already there.
    pub fn drop_kind(&mut self, kind: impl Into<String>) {
        let kind = kind.into();
        if !self.drop_kinds.contains(&kind) {
            self.drop_kinds.push(kind);
        }
    }
}

impl FrontendConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(FrontendConfig::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// The configuration a parse runs under: comments never reach the parser.
    pub fn for_parsing(&self) -> FrontendConfig {
        let mut config = self.clone();
        config.lexer.drop_kind(COMMENT_KIND);
        config
    }

    /// Load a configuration file. Relative description paths are resolved against the
    /// directory holding the file.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| crate::Error::io(path, e))?;
        let mut config = FrontendConfig::from_yaml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.automaton = dir.join(&config.automaton);
            config.grammar = dir.join(&config.grammar);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = FrontendConfig::from_yaml_str("").unwrap();
        assert_eq!(config, FrontendConfig::default());
        assert_eq!(config.automaton, PathBuf::from("dfa.dat"));
        assert_eq!(config.lexer.recovery, Recovery::Continue);
    }

    #[test]
    fn test_partial_document() {
        let config = FrontendConfig::from_yaml_str(
            "grammar: vc.grammar\nlexer:\n  recovery: halt\n  drop_kinds: [COMMENT]\n",
        )
        .unwrap();
        assert_eq!(config.automaton, PathBuf::from(DEFAULT_AUTOMATON));
        assert_eq!(config.grammar, PathBuf::from("vc.grammar"));
        assert_eq!(config.lexer.recovery, Recovery::Halt);
        assert_eq!(config.lexer.drop_kinds, vec!["COMMENT".to_string()]);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(FrontendConfig::from_yaml_str("automata: x.dat\n").is_err());
        assert!(FrontendConfig::from_yaml_str("lexer:\n  recovery: retry\n").is_err());
    }

    #[test]
    fn test_parsing_drops_comments_by_default() {
        let config = FrontendConfig::default().for_parsing();
        assert_eq!(config.lexer.drop_kinds, vec![COMMENT_KIND.to_string()]);

        let mut lexer = LexerConfig::default();
        lexer.drop_kind("WHITESPACE");
        lexer.drop_kind(COMMENT_KIND);
        let config = FrontendConfig {
            lexer,
            ..FrontendConfig::default()
        };
        assert_eq!(config.for_parsing(), config);
    }

    #[test]
    fn test_drop_kind_is_idempotent() {
        let mut lexer = LexerConfig::default();
        lexer.drop_kind("COMMENT");
        lexer.drop_kind("COMMENT");
        assert_eq!(lexer.drop_kinds, vec!["COMMENT".to_string()]);
    }
}
