//! Lexical diagnostics
//!
//! A [LexError] records where the automaton got stuck and what the stuck node would have
//! accepted. Inclusion sets are listed first and exclusion sets last, since "everything except"
//! alternatives read better at the end of the list.

use crate::automaton::MatchSpec;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Error while parsing '{}': {} at line {line}({column}), expected: {}",
    escape(.pending),
    describe_found(.found),
    render_expectations(.expected)
)]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    /// The offending character; `None` when the input ended inside a token.
    pub found: Option<char>,
    /// Characters buffered for the token that was being read.
    pub pending: String,
    pub expected: Vec<MatchSpec>,
}

fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("invalid character '{}'", escape_char(*c)),
        None => "unexpected end of input".to_string(),
    }
}

/// Render the alternatives of a stuck node, exclusions last.
pub fn render_expectations(expected: &[MatchSpec]) -> String {
    if expected.is_empty() {
        return "no further characters".to_string();
    }
    let mut ordered: Vec<&MatchSpec> = expected.iter().collect();
    ordered.sort_by_key(|spec| spec.is_exclusion());
    ordered
        .into_iter()
        .map(render_expectation)
        .collect::<Vec<_>>()
        .join(" or ")
}

fn render_expectation(spec: &MatchSpec) -> String {
    match spec {
        MatchSpec::Exclude(chars) => {
            let listed: String = chars.iter().map(|c| escape_char(*c)).collect();
            format!("everything except '{listed}'")
        }
        MatchSpec::Include(chars) if chars.len() == 1 => format!("'{}'", escape_char(chars[0])),
        MatchSpec::Include(chars) => {
            let listed: Vec<String> = chars
                .iter()
                .map(|c| format!("'{}'", escape_char(*c)))
                .collect();
            format!("one of {{{}}}", listed.join(", "))
        }
    }
}

/// Spell control characters as escapes so a message stays on one line.
pub(crate) fn escape(text: &str) -> String {
    text.chars().map(escape_char).collect()
}

fn escape_char(c: char) -> String {
    match c {
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\u{0c}' => "\\f".to_string(),
        c if c.is_control() => c.escape_unicode().to_string(),
        c => c.to_string(),
    }
}
