//! Lexer for the GDScript formatter.
//!
//! Two passes: a logos-derived raw scan ([`raw_token`]) and an
//! indentation cooker ([`cooker`]) that makes the language's significant
//! indentation explicit as `Indent`/`Dedent`/`Newline` tokens.
//!
//! # Errors
//!
//! Lexing aborts on the first error: [`gds_ir::ParseErrorKind::UnterminatedString`],
//! [`gds_ir::ParseErrorKind::InvalidIndent`] (spaces or mixed whitespace
//! in a code line's leading indentation, or a dedent to no open level),
//! or [`gds_ir::ParseErrorKind::UnexpectedChar`].

mod cooker;
mod raw_token;

use gds_ir::{ParseError, TokenList};

/// Lex source code into a cooked [`TokenList`].
///
/// The stream keeps every physical newline and comment (the parser
/// attaches them to tree nodes) and always ends with `Eof`.
pub fn lex(source: &str) -> Result<TokenList, ParseError> {
    cooker::cook(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gds_ir::{ParseErrorKind, TokenKind};

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_lex_empty() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_lex_var_decl() {
        assert_eq!(
            kinds("var x = 0"),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Eq,
                TokenKind::Int,
                TokenKind::Newline { indent: 0 },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_infer_assign() {
        let kinds = kinds("var x := 0");
        assert!(kinds.contains(&TokenKind::ColonEq));
    }

    #[test]
    fn test_lex_indent_dedent() {
        assert_eq!(
            kinds("func f():\n\tpass\nvar x"),
            vec![
                TokenKind::Func,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Colon,
                TokenKind::Newline { indent: 1 },
                TokenKind::Indent,
                TokenKind::Pass,
                TokenKind::Newline { indent: 0 },
                TokenKind::Dedent,
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Newline { indent: 0 },
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_closes_open_indents_at_eof() {
        let kinds = kinds("if x:\n\tif y:\n\t\tpass");
        let dedents = kinds
            .iter()
            .filter(|k| matches!(k, TokenKind::Dedent))
            .count();
        assert_eq!(dedents, 2);
        assert_eq!(kinds.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_lex_no_depth_tokens_inside_brackets() {
        let kinds = kinds("var x = [\n\t0,\n\t1,\n]");
        assert!(!kinds.contains(&TokenKind::Indent));
        assert!(!kinds.contains(&TokenKind::Dedent));
        // Newlines inside the brackets are retained as trivia.
        assert!(kinds
            .iter()
            .any(|k| matches!(k, TokenKind::Newline { indent: 1 })));
    }

    #[test]
    fn test_lex_comment_own_line_flag() {
        let tokens = lex("# above\nvar x = 0 # beside").unwrap();
        let comments: Vec<bool> = tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::Comment { own_line } => Some(own_line),
                _ => None,
            })
            .collect();
        assert_eq!(comments, vec![true, false]);
    }

    #[test]
    fn test_lex_comment_line_keeps_indent_stack() {
        // The dedented comment must not emit depth tokens.
        let kinds = kinds("func f():\n\tpass\n#\tdisabled\n\tpass");
        let dedents = kinds
            .iter()
            .filter(|k| matches!(k, TokenKind::Dedent))
            .count();
        assert_eq!(dedents, 1);
    }

    #[test]
    fn test_lex_string_kinds() {
        assert!(kinds(r#"var s = "hi""#).contains(&TokenKind::Str));
        assert!(kinds(r"var s = 'hi'").contains(&TokenKind::Str));
        assert!(kinds(r#"var s = &"name""#).contains(&TokenKind::StringName));
        assert!(kinds(r#"var s = ^"path""#).contains(&TokenKind::NodePath));
        assert!(kinds("var s = \"\"\"multi\nline\"\"\"").contains(&TokenKind::Str));
    }

    #[test]
    fn test_lex_get_node_forms() {
        assert!(kinds("var n = $Node").contains(&TokenKind::GetNode));
        assert!(kinds("var n = $NodeA/NodeB/NodeC").contains(&TokenKind::GetNode));
        assert!(kinds(r#"var n = $"../Parent/NodeB""#).contains(&TokenKind::GetNode));
    }

    #[test]
    fn test_lex_numeric_forms() {
        for source in ["var n = 0x1F", "var n = 0b1010", "var n = 1_000", "var n = 2.5e10"] {
            let kinds = kinds(source);
            assert!(
                kinds.contains(&TokenKind::Int) || kinds.contains(&TokenKind::Float),
                "no numeric token for {source:?}"
            );
        }
    }

    #[test]
    fn test_lex_line_continuation_joins() {
        let kinds = kinds("var x = 1 + \\\n\t2");
        // No newline between `+` and `2`; the statement ends at EOF.
        let newlines = kinds
            .iter()
            .filter(|k| matches!(k, TokenKind::Newline { .. }))
            .count();
        assert_eq!(newlines, 1);
        assert!(!kinds.contains(&TokenKind::Indent));
    }

    #[test]
    fn test_lex_rejects_space_indent() {
        let err = lex("if x:\n    pass").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidIndent);
    }

    #[test]
    fn test_lex_rejects_mixed_indent() {
        let err = lex("if x:\n\t pass").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidIndent);
    }

    #[test]
    fn test_lex_rejects_bad_dedent() {
        let err = lex("if x:\n\t\t\tpass\n\t\tpass").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidIndent);
    }

    #[test]
    fn test_lex_unterminated_string() {
        let err = lex("var s = \"open").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
    }

    #[test]
    fn test_lex_unterminated_block_string() {
        let err = lex("var s = \"\"\"open\nforever").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
    }

    #[test]
    fn test_lex_unexpected_char() {
        let err = lex("var x = `tick`").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedChar);
    }

    #[test]
    fn test_lex_operator_spellings() {
        let kinds = kinds("x += 1 << 2 and y || z");
        assert!(kinds.contains(&TokenKind::PlusEq));
        assert!(kinds.contains(&TokenKind::Shl));
        assert!(kinds.contains(&TokenKind::And));
        assert!(kinds.contains(&TokenKind::PipePipe));
    }
}
