//! The automaton simulation loop.

use super::diagnostics::LexError;
use super::token::{Token, TokenKind};
use crate::automaton::{Automaton, StateId};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Characters skipped between tokens.
pub const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', '\u{0c}'];

/// What the engine does after reporting a lexical error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recovery {
    /// Drop the partial token, restart from the starting node and keep going.
    #[default]
    Continue,
    /// Stop lexing at the first error.
    Halt,
}

/// Result of a lexing run: every token recognized plus every diagnostic raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<LexError>,
}

impl Lexed {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_result(self) -> Result<Vec<Token>, Vec<LexError>> {
        if self.diagnostics.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.diagnostics)
        }
    }
}

/// Tokenize `source` with the default (continuing) recovery policy.
pub fn tokenize(source: &str, automaton: &Automaton) -> Lexed {
    Lexer::new(automaton).tokenize(source)
}

pub struct Lexer<'a> {
    automaton: &'a Automaton,
    recovery: Recovery,
}

impl<'a> Lexer<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        Lexer {
            automaton,
            recovery: Recovery::default(),
        }
    }

    pub fn with_recovery(mut self, recovery: Recovery) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn tokenize(&self, source: &str) -> Lexed {
        let chars: Vec<char> = source.chars().collect();
        let mut scan = Scan::new(self.automaton);
        let mut index = 0;

        while index < chars.len() {
            let c = chars[index];
            index += 1;
            scan.column += 1;

            if scan.state == scan.start && WHITESPACE.contains(&c) {
                scan.skip_whitespace(c);
                continue;
            }
            scan.pending_cr = false;

            if let Some(next) = self.automaton.node(scan.state).step(c) {
                scan.advance(c, next);
                continue;
            }

            // Boundary: `c` is left for the next round.
            index -= 1;
            scan.column -= 1;

            if scan.boundary_is_licensed(c) {
                scan.close();
                continue;
            }

            let stuck_at_start = scan.buffer.is_empty() && scan.state == scan.start;
            scan.fail(Some(c));
            if stuck_at_start {
                // Nothing would ever accept `c` from here; step over it.
                index += 1;
                scan.column += 1;
            }
            if self.recovery == Recovery::Halt {
                break;
            }
        }

        if !scan.buffer.is_empty() {
            if self.automaton.node(scan.state).terminal {
                scan.close();
            } else {
                scan.fail(None);
            }
        }

        info!(
            tokens = scan.tokens.len(),
            diagnostics = scan.diagnostics.len(),
            "tokenized source"
        );
        Lexed {
            tokens: scan.tokens,
            diagnostics: scan.diagnostics,
        }
    }
}

/// Mutable state of one tokenize call.
struct Scan<'a> {
    automaton: &'a Automaton,
    start: StateId,
    state: StateId,
    buffer: String,
    token_start: usize,
    line: usize,
    column: usize,
    /// A carriage return was just counted; a following line feed completes the pair.
    pending_cr: bool,
    tokens: Vec<Token>,
    diagnostics: Vec<LexError>,
}

impl<'a> Scan<'a> {
    fn new(automaton: &'a Automaton) -> Self {
        Scan {
            automaton,
            start: automaton.start(),
            state: automaton.start(),
            buffer: String::new(),
            token_start: 0,
            line: 1,
            column: 0,
            pending_cr: false,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn skip_whitespace(&mut self, c: char) {
        match c {
            '\r' => {
                self.line += 1;
                self.column = 0;
                self.pending_cr = true;
            }
            '\n' => {
                if !self.pending_cr {
                    self.line += 1;
                }
                self.column = 0;
                self.pending_cr = false;
            }
            _ => self.pending_cr = false,
        }
    }

    fn advance(&mut self, c: char, next: StateId) {
        if self.buffer.is_empty() {
            self.token_start = self.column;
        }
        self.buffer.push(c);
        self.state = next;
    }

    /// A stuck terminal node may close its token when the lookahead or the last buffered
    /// character is a separator.
    fn boundary_is_licensed(&self, lookahead: char) -> bool {
        let Some(last) = self.buffer.chars().last() else {
            return false;
        };
        self.automaton.node(self.state).terminal
            && (self.automaton.is_separator(lookahead) || self.automaton.is_separator(last))
    }

    fn classify(&self) -> TokenKind {
        if self.automaton.is_keyword(&self.buffer) {
            TokenKind::Keyword
        } else if self.automaton.is_special_literal(&self.buffer) {
            TokenKind::SpecialLiteral
        } else {
            let node = self.automaton.node(self.state);
            TokenKind::Terminal(node.terminal_type.clone().unwrap_or_default())
        }
    }

    fn close(&mut self) {
        let kind = self.classify();
        let spelling = std::mem::take(&mut self.buffer);
        let ends_line = spelling.ends_with('\n');
        let token = Token::new(spelling, kind, self.line, self.token_start, self.column);
        debug!(token = %token, "closed token");
        self.tokens.push(token);
        if ends_line {
            self.line += 1;
            self.column = 0;
        }
        self.state = self.start;
    }

    fn fail(&mut self, found: Option<char>) {
        let error = LexError {
            line: self.line,
            column: self.column + usize::from(found.is_some()),
            found,
            pending: std::mem::take(&mut self.buffer),
            expected: self.automaton.node(self.state).expectations(),
        };
        warn!(%error, "lexical error");
        self.diagnostics.push(error);
        self.state = self.start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Digits, lower-case identifiers and `+`, separated by blanks or `+`.
    fn automaton() -> Automaton {
        Automaton::from_json_str(
            r#"{
                "keywords": ["if"],
                "special_literals": ["nil"],
                "separators": " \r\n+",
                "terminal_types": ["ID", "INT", "PLUS"],
                "nodes": {
                    "start": { "starting": true, "children": {
                        "0123456789": "int", "abcdefghijklmnopqrstuvwxyz": "id", "+": "plus" } },
                    "int": { "terminal": true, "terminal_type": "INT",
                             "children": { "0123456789": "int" } },
                    "id": { "terminal": true, "terminal_type": "ID",
                            "children": { "abcdefghijklmnopqrstuvwxyz0123456789": "id" } },
                    "plus": { "terminal": true, "terminal_type": "PLUS" }
                }
            }"#,
        )
        .unwrap()
    }

    fn spellings(lexed: &Lexed) -> Vec<&str> {
        lexed.tokens.iter().map(|t| t.spelling.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let lexed = tokenize("", &automaton());
        assert_eq!(lexed, Lexed::default());
    }

    #[test]
    fn test_positions() {
        let lexed = tokenize("12 + ab", &automaton());
        assert!(lexed.is_clean());
        assert_eq!(
            lexed.tokens,
            vec![
                Token::new("12", TokenKind::Terminal("INT".into()), 1, 1, 2),
                Token::new("+", TokenKind::Terminal("PLUS".into()), 1, 4, 4),
                Token::new("ab", TokenKind::Terminal("ID".into()), 1, 6, 7),
            ]
        );
    }

    #[test]
    fn test_separator_boundary_without_whitespace() {
        let lexed = tokenize("1+2", &automaton());
        assert_eq!(spellings(&lexed), vec!["1", "+", "2"]);
        assert_eq!(lexed.tokens[1].start, 2);
    }

    #[test]
    fn test_keyword_and_special_literal_override() {
        let lexed = tokenize("if nil iffy", &automaton());
        let kinds: Vec<&TokenKind> = lexed.tokens.iter().map(|t| &t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &TokenKind::Keyword,
                &TokenKind::SpecialLiteral,
                &TokenKind::Terminal("ID".into())
            ]
        );
    }

    #[test]
    fn test_line_counting() {
        let lexed = tokenize("a\nb\r\nc\n\rd\r\r\ne", &automaton());
        let lines: Vec<usize> = lexed.tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 5, 7]);
        assert!(lexed.tokens.iter().all(|t| t.start == 1));
    }

    #[test]
    fn test_unlicensed_boundary_recovers() {
        // `a` cannot follow a digit without a separator in between.
        let lexed = tokenize("12ab 3", &automaton());
        assert_eq!(spellings(&lexed), vec!["ab", "3"]);
        assert_eq!(lexed.diagnostics.len(), 1);

        let error = &lexed.diagnostics[0];
        assert_eq!(error.found, Some('a'));
        assert_eq!(error.pending, "12");
        assert_eq!((error.line, error.column), (1, 3));
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let lexed = tokenize("1 # 2", &automaton());
        assert_eq!(spellings(&lexed), vec!["1", "2"]);
        assert_eq!(lexed.diagnostics.len(), 1);
        assert_eq!(lexed.diagnostics[0].column, 3);
        assert_eq!(lexed.diagnostics[0].pending, "");
    }

    #[test]
    fn test_halt_stops_at_first_error() {
        let automaton = automaton();
        let lexed = Lexer::new(&automaton)
            .with_recovery(Recovery::Halt)
            .tokenize("1 # 2 $ 3");
        assert_eq!(spellings(&lexed), vec!["1"]);
        assert_eq!(lexed.diagnostics.len(), 1);
        assert!(lexed.into_result().is_err());
    }

    #[test]
    fn test_final_token_closes_at_end_of_input() {
        let lexed = tokenize("abc", &automaton());
        assert_eq!(
            lexed.tokens,
            vec![Token::new("abc", TokenKind::Terminal("ID".into()), 1, 1, 3)]
        );
    }
}
