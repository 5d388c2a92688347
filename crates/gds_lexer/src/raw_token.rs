//! Raw token definition.
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! indentation cooking. Whitespace is a real token here: the cooker needs
//! the leading run of each line to derive `Indent`/`Dedent`.

use logos::{Lexer, Logos};

/// Consume the remainder of a triple-quoted string opened by `quote`
/// repeated three times. Backslash escapes a following quote. Returns
/// false when the file ends before the closing delimiter, which logos
/// reports as an error token.
fn lex_block_string(lex: &mut Lexer<RawToken>, quote: u8) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
        } else if bytes[i] == quote
            && i + 3 <= bytes.len()
            && bytes[i + 1] == quote
            && bytes[i + 2] == quote
        {
            lex.bump(i + 3);
            return true;
        } else {
            i += 1;
        }
    }
    false
}

fn lex_block_double(lex: &mut Lexer<RawToken>) -> bool {
    lex_block_string(lex, b'"')
}

fn lex_block_single(lex: &mut Lexer<RawToken>) -> bool {
    lex_block_string(lex, b'\'')
}

/// Raw token from logos (before cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawToken {
    #[regex(r"[ \t\r]+")]
    Whitespace,

    #[token("\n")]
    Newline,

    #[regex(r"\\[ \t]*\r?\n")]
    LineContinuation,

    #[regex(r"#[^\n]*")]
    Comment,

    // Declaration keywords
    #[token("class")]
    Class,
    #[token("class_name")]
    ClassName,
    #[token("extends")]
    Extends,
    #[token("func")]
    Func,
    #[token("static")]
    Static,
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("signal")]
    Signal,
    #[token("enum")]
    Enum,

    // Statement keywords
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("match")]
    Match,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("pass")]
    Pass,
    #[token("return")]
    Return,
    #[token("breakpoint")]
    Breakpoint,
    #[token("assert")]
    Assert,
    #[token("await")]
    Await,

    // Operator keywords
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("as")]
    As,

    // Value keywords
    #[token("self")]
    SelfKw,
    #[token("super")]
    Super,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("void")]
    Void,
    #[token("preload")]
    Preload,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":=")]
    ColonEq,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("@")]
    At,

    // Operators; longest spellings first so logos prefers them
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,

    // Numeric literals, reproduced verbatim by the formatter
    #[regex(r"0x[0-9a-fA-F][0-9a-fA-F_]*")]
    HexInt,
    #[regex(r"0b[01][01_]*")]
    BinInt,
    #[regex(r"[0-9][0-9_]*")]
    Int,
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+")]
    Float,

    // String literals. Triple-quoted forms consume via callback so they
    // can span lines; an unclosed one becomes an error token.
    #[token("\"\"\"", lex_block_double)]
    #[token("'''", lex_block_single)]
    BlockString,
    #[regex(r#"r?"([^"\\\n]|\\.)*""#)]
    #[regex(r"r?'([^'\\\n]|\\.)*'")]
    String,
    #[regex(r#"&"([^"\\\n]|\\.)*""#)]
    #[regex(r"&'([^'\\\n]|\\.)*'")]
    StringName,
    #[regex(r#"\^"([^"\\\n]|\\.)*""#)]
    #[regex(r"\^'([^'\\\n]|\\.)*'")]
    NodePath,

    // `$Path/To/Node` and `$"…"` get-node shorthands
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*(/[A-Za-z_][A-Za-z0-9_]*)*")]
    #[regex(r#"\$"([^"\\\n]|\\.)*""#)]
    #[regex(r"\$'([^'\\\n]|\\.)*'")]
    GetNode,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}
