//! Indentation cooking.
//!
//! Converts the raw logos stream into the cooked [`TokenList`]:
//!
//! - the leading run of tabs on each code line becomes `Indent`/`Dedent`
//!   tokens against a stack of open levels;
//! - inside `()[]{}` physical lines join, so depth tokens are suppressed
//!   while `Newline` trivia is kept (it carries the next line's tab
//!   depth for constructs that still care, like lambda bodies);
//! - `\`-newline joins lines everywhere;
//! - comment lines never touch the indentation stack;
//! - spaces in the leading indentation of a code line are rejected.

use gds_ir::{ParseError, Span, Token, TokenKind, TokenList};
use logos::Logos;

use crate::raw_token::RawToken;

/// A raw token with its span, materialized for lookahead.
struct Raw {
    token: Result<RawToken, ()>,
    span: Span,
}

pub(crate) fn cook(source: &str) -> Result<TokenList, ParseError> {
    if u32::try_from(source.len()).is_err() {
        return Err(ParseError::internal("source file exceeds 4 GiB"));
    }

    let raw: Vec<Raw> = RawToken::lexer(source)
        .spanned()
        .map(|(token, range)| Raw {
            token,
            span: Span::from_range(range),
        })
        .collect();

    let mut out = TokenList::new();
    let mut indent_stack: Vec<u16> = vec![0];
    let mut bracket_depth = 0usize;
    let mut at_line_start = true;
    let mut pending_ws: Option<Span> = None;

    for (i, item) in raw.iter().enumerate() {
        let token = match item.token {
            Ok(token) => token,
            Err(()) => return Err(classify_error(source, item.span)),
        };

        match token {
            RawToken::Whitespace => {
                if at_line_start {
                    pending_ws = Some(item.span);
                }
            }
            RawToken::LineContinuation => {
                // Joins the physical lines; indentation of the next line
                // is ordinary whitespace.
                at_line_start = false;
                pending_ws = None;
            }
            RawToken::Newline => {
                let indent = next_line_indent(source, &raw, i);
                out.push(Token::new(TokenKind::Newline { indent }, item.span));
                at_line_start = true;
                pending_ws = None;
            }
            RawToken::Comment => {
                out.push(Token::new(
                    TokenKind::Comment {
                        own_line: at_line_start,
                    },
                    item.span,
                ));
                // The rest of the line is the comment; indentation state
                // is untouched.
            }
            _ => {
                if at_line_start && bracket_depth == 0 {
                    apply_indent(source, pending_ws, item.span, &mut indent_stack, &mut out)?;
                }
                at_line_start = false;
                pending_ws = None;

                match token {
                    RawToken::LParen | RawToken::LBracket | RawToken::LBrace => {
                        bracket_depth += 1;
                    }
                    RawToken::RParen | RawToken::RBracket | RawToken::RBrace => {
                        bracket_depth = bracket_depth.saturating_sub(1);
                    }
                    _ => {}
                }

                out.push(Token::new(convert(token), item.span));
            }
        }
    }

    let end = Span::point(u32::try_from(source.len()).unwrap_or(u32::MAX));
    if !matches!(
        last_significant(&out),
        Some(TokenKind::Newline { .. }) | None
    ) {
        out.push(Token::new(TokenKind::Newline { indent: 0 }, end));
    }
    for _ in 1..indent_stack.len() {
        out.push(Token::new(TokenKind::Dedent, end));
    }
    out.push(Token::new(TokenKind::Eof, end));

    Ok(out)
}

/// Tab depth of the line that starts after the newline at `raw[i]`.
fn next_line_indent(source: &str, raw: &[Raw], i: usize) -> u16 {
    match raw.get(i + 1) {
        Some(Raw {
            token: Ok(RawToken::Whitespace),
            span,
        }) => count_tabs(&source[span.to_range()]),
        _ => 0,
    }
}

fn count_tabs(ws: &str) -> u16 {
    u16::try_from(ws.chars().filter(|&c| c == '\t').count()).unwrap_or(u16::MAX)
}

/// Validate a code line's leading whitespace and emit `Indent`/`Dedent`.
fn apply_indent(
    source: &str,
    pending_ws: Option<Span>,
    at: Span,
    indent_stack: &mut Vec<u16>,
    out: &mut TokenList,
) -> Result<(), ParseError> {
    let depth = match pending_ws {
        Some(ws_span) => {
            let ws = &source[ws_span.to_range()];
            if ws.contains(' ') {
                return Err(ParseError::invalid_indent(
                    ws_span,
                    "indentation must use tabs, found spaces",
                ));
            }
            count_tabs(ws)
        }
        None => 0,
    };

    let current = *indent_stack.last().unwrap_or(&0);
    if depth > current {
        indent_stack.push(depth);
        out.push(Token::new(TokenKind::Indent, Span::point(at.start)));
    } else if depth < current {
        while indent_stack.last().is_some_and(|&level| level > depth) {
            indent_stack.pop();
            out.push(Token::new(TokenKind::Dedent, Span::point(at.start)));
        }
        if *indent_stack.last().unwrap_or(&0) != depth {
            return Err(ParseError::invalid_indent(
                Span::point(at.start),
                "unindent does not match any outer indentation level",
            ));
        }
    }
    Ok(())
}

fn last_significant(out: &TokenList) -> Option<TokenKind> {
    (0..out.len())
        .rev()
        .map(|i| out[i].kind)
        .find(|kind| !matches!(kind, TokenKind::Comment { .. }))
}

/// Classify a logos error token into a lexer error.
fn classify_error(source: &str, span: Span) -> ParseError {
    let text = &source[span.to_range()];
    let mut chars = text.chars();
    let first = chars.next().unwrap_or('\0');
    let second = chars.next().unwrap_or('\0');
    let string_start = matches!(first, '"' | '\'')
        || (matches!(first, '&' | '^' | '$' | 'r') && matches!(second, '"' | '\''));
    if string_start {
        ParseError::unterminated_string(span)
    } else {
        ParseError::unexpected_char(span, text)
    }
}

fn convert(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Class => TokenKind::Class,
        RawToken::ClassName => TokenKind::ClassName,
        RawToken::Extends => TokenKind::Extends,
        RawToken::Func => TokenKind::Func,
        RawToken::Static => TokenKind::Static,
        RawToken::Var => TokenKind::Var,
        RawToken::Const => TokenKind::Const,
        RawToken::Signal => TokenKind::Signal,
        RawToken::Enum => TokenKind::Enum,
        RawToken::If => TokenKind::If,
        RawToken::Elif => TokenKind::Elif,
        RawToken::Else => TokenKind::Else,
        RawToken::For => TokenKind::For,
        RawToken::While => TokenKind::While,
        RawToken::Match => TokenKind::Match,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Pass => TokenKind::Pass,
        RawToken::Return => TokenKind::Return,
        RawToken::Breakpoint => TokenKind::Breakpoint,
        RawToken::Assert => TokenKind::Assert,
        RawToken::Await => TokenKind::Await,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::In => TokenKind::In,
        RawToken::Is => TokenKind::Is,
        RawToken::As => TokenKind::As,
        RawToken::SelfKw => TokenKind::SelfKw,
        RawToken::Super => TokenKind::Super,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::Void => TokenKind::Void,
        RawToken::Preload => TokenKind::Preload,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::ColonEq => TokenKind::ColonEq,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Arrow => TokenKind::Arrow,
        RawToken::At => TokenKind::At,
        RawToken::ShlEq => TokenKind::ShlEq,
        RawToken::ShrEq => TokenKind::ShrEq,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Eq => TokenKind::Eq,
        RawToken::HexInt | RawToken::BinInt | RawToken::Int => TokenKind::Int,
        RawToken::Float => TokenKind::Float,
        RawToken::BlockString | RawToken::String => TokenKind::Str,
        RawToken::StringName => TokenKind::StringName,
        RawToken::NodePath => TokenKind::NodePath,
        RawToken::GetNode => TokenKind::GetNode,
        RawToken::Ident => TokenKind::Identifier,
        // Handled before conversion.
        RawToken::Whitespace
        | RawToken::Newline
        | RawToken::LineContinuation
        | RawToken::Comment => unreachable!("trivia is cooked separately"),
    }
}
