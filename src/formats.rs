//! Token artifact formats
//!
//!     - plain: one spelling per line, the form the `.vctok` file holds
//!     - verbose: a header line and one descriptive record per token (`.verbose.vctok`)
//!     - json: the token records serialized with serde, for tooling
//!
//! [drop_kinds] filters tokens by kind before any of these is produced.

use crate::automaton::Automaton;
use crate::lexing::Token;

/// First line of the verbose token report.
pub const VERBOSE_HEADER: &str = "======= The VC compiler =======";

/// One spelling per line, each line terminated.
pub fn plain(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.spelling);
        out.push('\n');
    }
    out
}

/// Header plus one `Kind = <ordinal> [<TYPE>], spelling = "...", position = ...` line per token.
///
/// The ordinal is the position of the token's kind in the automaton's terminal-type catalog,
/// or `-1` when the catalog does not list it.
pub fn verbose(tokens: &[Token], automaton: &Automaton) -> String {
    let mut out = String::from(VERBOSE_HEADER);
    out.push('\n');
    for token in tokens {
        let kind = token.kind.name();
        let ordinal = automaton
            .terminal_ordinal(kind)
            .map_or(-1, |ordinal| ordinal as i64);
        out.push_str(&format!(
            "Kind = {ordinal} [{kind}], spelling = \"{}\", position = {}({})..{}({})\n",
            token.spelling, token.line, token.start, token.line, token.end
        ));
    }
    out
}

pub fn json(tokens: &[Token], pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(tokens)
    } else {
        serde_json::to_string(tokens)
    }
}

/// Remove every token whose kind name is listed in `kinds`.
pub fn drop_kinds(tokens: Vec<Token>, kinds: &[String]) -> Vec<Token> {
    if kinds.is_empty() {
        return tokens;
    }
    tokens
        .into_iter()
        .filter(|token| !kinds.iter().any(|kind| kind == token.kind.name()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexing::TokenKind;

    fn automaton() -> Automaton {
        Automaton::from_json_str(
            r#"{
                "keywords": ["int"],
                "special_literals": [],
                "separators": " ",
                "terminal_types": ["ID", "KEYWORD", "COMMENT"],
                "nodes": {
                    "start": { "starting": true, "children": { "abcdefghijklmnopqrstuvwxyz": "id" } },
                    "id": { "terminal": true, "terminal_type": "ID",
                            "children": { "abcdefghijklmnopqrstuvwxyz": "id" } }
                }
            }"#,
        )
        .unwrap()
    }

    fn sample() -> Vec<Token> {
        vec![
            Token::new("int", TokenKind::Keyword, 1, 1, 3),
            Token::new("x", TokenKind::Terminal("ID".into()), 1, 5, 5),
            Token::new("// x", TokenKind::Terminal("COMMENT".into()), 1, 7, 10),
            Token::new("+", TokenKind::Terminal("OPERATOR".into()), 2, 1, 1),
        ]
    }

    #[test]
    fn test_plain() {
        let tokens = sample();
        assert_eq!(plain(&tokens[..2]), "int\nx\n");
        assert_eq!(plain(&[]), "");
    }

    #[test]
    fn test_verbose_report() {
        let report = verbose(&sample(), &automaton());
        insta::assert_snapshot!(report, @r#"
        ======= The VC compiler =======
        Kind = 1 [KEYWORD], spelling = "int", position = 1(1)..1(3)
        Kind = 0 [ID], spelling = "x", position = 1(5)..1(5)
        Kind = 2 [COMMENT], spelling = "// x", position = 1(7)..1(10)
        Kind = -1 [OPERATOR], spelling = "+", position = 2(1)..2(1)
        "#);
    }

    #[test]
    fn test_drop_kinds() {
        let kept = drop_kinds(sample(), &["COMMENT".to_string()]);
        let spellings: Vec<&str> = kept.iter().map(|t| t.spelling.as_str()).collect();
        assert_eq!(spellings, vec!["int", "x", "+"]);
        assert_eq!(drop_kinds(sample(), &[]).len(), 4);
    }

    #[test]
    fn test_json_records() {
        let text = json(&sample()[1..2], false).unwrap();
        assert_eq!(
            text,
            r#"[{"spelling":"x","kind":{"Terminal":"ID"},"line":1,"start":5,"end":5}]"#
        );
    }
}
