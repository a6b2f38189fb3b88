//! One front-end run
//!
//!     A [Frontend] owns everything a run needs: the automaton, the grammar, the FIRST/FOLLOW
//!     analysis and the parse table built from it. Construction fails when the grammar is not
//!     LL(1), so a `Frontend` that exists can always parse.
//!
//!     source ──tokenize──▶ tokens ──drop kinds──▶ tokens ──parse──▶ ParseTree

use crate::analysis::GrammarAnalysis;
use crate::automaton::Automaton;
use crate::config::{FrontendConfig, LexerConfig};
use crate::error::{Error, Result};
use crate::formats;
use crate::grammar::Grammar;
use crate::lexing::{LexError, Lexed, Lexer, Recovery, Token};
use crate::parsing::{PredictiveParser, SyntaxError};
use crate::table::ParseTable;
use crate::tree::ParseTree;
use std::path::Path;
use tracing::info;

/// Everything produced by [Frontend::run].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
    /// Tokens after kind filtering.
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LexError>,
    pub tree: ParseTree,
}

#[derive(Debug, Clone)]
pub struct Frontend {
    automaton: Automaton,
    grammar: Grammar,
    analysis: GrammarAnalysis,
    table: ParseTable,
    lexer: LexerConfig,
}

impl Frontend {
    /// Analyze `grammar` and build its parse table.
    pub fn new(automaton: Automaton, grammar: Grammar) -> Result<Self> {
        let analysis = GrammarAnalysis::new(&grammar);
        let table = ParseTable::build(&grammar, &analysis)?;
        info!(
            productions = grammar.productions().len(),
            cells = table.len(),
            "front end ready"
        );
        Ok(Frontend {
            automaton,
            grammar,
            analysis,
            table,
            lexer: LexerConfig::default(),
        })
    }

    /// Load both descriptions named by `config` and apply its lexer settings.
    pub fn from_config(config: &FrontendConfig) -> Result<Self> {
        let automaton = Automaton::from_json_str(&read(&config.automaton)?)?;
        let grammar = Grammar::parse(&read(&config.grammar)?)?;
        Ok(Frontend::new(automaton, grammar)?.with_lexer_config(config.lexer.clone()))
    }

    pub fn with_lexer_config(mut self, lexer: LexerConfig) -> Self {
        self.lexer = lexer;
        self
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn analysis(&self) -> &GrammarAnalysis {
        &self.analysis
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn lexer_config(&self) -> &LexerConfig {
        &self.lexer
    }

    /// Lex `source` under the configured recovery policy, then drop the configured kinds.
    pub fn tokenize(&self, source: &str) -> Lexed {
        let lexed = Lexer::new(&self.automaton)
            .with_recovery(self.lexer.recovery)
            .tokenize(source);
        Lexed {
            tokens: formats::drop_kinds(lexed.tokens, &self.lexer.drop_kinds),
            diagnostics: lexed.diagnostics,
        }
    }

    pub fn parse_tokens(&self, tokens: Vec<Token>) -> std::result::Result<ParseTree, SyntaxError> {
        PredictiveParser::new(&self.grammar, &self.table).parse(tokens)
    }

    /// Tokenize and parse `source`.
    ///
    /// Under [Recovery::Halt] any lexical diagnostic fails the run. Under
    /// [Recovery::Continue] the recognized tokens are parsed and the diagnostics are returned
    /// alongside the tree.
    pub fn run(&self, source: &str) -> Result<RunOutput> {
        let lexed = self.tokenize(source);
        if self.lexer.recovery == Recovery::Halt && !lexed.is_clean() {
            return Err(Error::Lexical(lexed.diagnostics));
        }
        let tree = self.parse_tokens(lexed.tokens.clone())?;
        Ok(RunOutput {
            tokens: lexed.tokens,
            diagnostics: lexed.diagnostics,
            tree,
        })
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automaton() -> Automaton {
        Automaton::from_json_str(
            r##"{
                "keywords": [],
                "special_literals": [],
                "separators": " \n+#",
                "terminal_types": ["INT", "PLUS", "COMMENT"],
                "nodes": {
                    "start": { "starting": true, "children": {
                        "0123456789": "int", "+": "plus", "#": "comment" } },
                    "int": { "terminal": true, "terminal_type": "INT",
                             "children": { "0123456789": "int" } },
                    "plus": { "terminal": true, "terminal_type": "PLUS" },
                    "comment": { "terminal": true, "terminal_type": "COMMENT",
                                 "children": { "EXCLUDE\n": "comment" } }
                }
            }"##,
        )
        .unwrap()
    }

    fn frontend() -> Frontend {
        let grammar = Grammar::parse("INT\nS -> INT R\nR -> + INT R | epsilon\n").unwrap();
        Frontend::new(automaton(), grammar).unwrap()
    }

    #[test]
    fn test_run() {
        let output = frontend().run("1 + 2").unwrap();
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.tokens.len(), 3);
        assert_eq!(output.tree.to_string(), "( 1 ( + 2 ) )");
    }

    #[test]
    fn test_dropped_kinds_never_reach_the_parser() {
        let mut lexer = LexerConfig::default();
        lexer.drop_kind("COMMENT");
        let frontend = frontend().with_lexer_config(lexer);
        let output = frontend.run("1 #note\n+ 2").unwrap();
        assert_eq!(output.tree.to_string(), "( 1 ( + 2 ) )");
        assert!(output.tokens.iter().all(|t| t.kind.name() != "COMMENT"));
    }

    #[test]
    fn test_comment_tokens_fail_the_parse_when_kept() {
        assert!(matches!(
            frontend().run("1 #note\n+ 2"),
            Err(Error::Syntax(_))
        ));
    }

    #[test]
    fn test_halt_turns_diagnostics_into_an_error() {
        let lexer = LexerConfig {
            recovery: Recovery::Halt,
            ..LexerConfig::default()
        };
        let err = frontend().with_lexer_config(lexer).run("1 + x").unwrap_err();
        assert!(matches!(err, Error::Lexical(ref diagnostics) if diagnostics.len() == 1));
    }

    #[test]
    fn test_continue_parses_what_was_recognized() {
        let output = frontend().run("1 + x 2").unwrap();
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.tree.to_string(), "( 1 ( + 2 ) )");
    }

    #[test]
    fn test_non_ll1_grammar_is_rejected_up_front() {
        let grammar = Grammar::parse("\nS -> INT | INT +\n").unwrap();
        assert!(matches!(
            Frontend::new(automaton(), grammar),
            Err(Error::GrammarConfig(_))
        ));
    }

    #[test]
    fn test_missing_description_names_the_path() {
        let config = FrontendConfig {
            automaton: "does/not/exist.dat".into(),
            ..FrontendConfig::default()
        };
        let err = Frontend::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.dat"));
    }
}
