//! Recursive-descent parser for the GDScript formatter.
//!
//! Consumes the cooked token stream from `gds_lexer` and produces the
//! lossless tree in `gds_ir::ast`. Every comment token is attached to a
//! node (leading above, trailing beside, dangling inside empty groups,
//! footer at suite ends, disabled-code lines verbatim), and blank lines
//! are recorded as at-most-one `blank_before` flags.
//!
//! # Error recovery
//!
//! A malformed match arm or property accessor is recoverable: the parser
//! keeps the tree built so far and records the byte offset where the
//! unparseable region starts. The formatter emits the formatted prefix
//! and passes the tail through unchanged. Every other error aborts the
//! parse.

mod cursor;
mod grammar;
mod parser;

use gds_ir::ast::Class;
use gds_ir::{ParseError, TokenList};
use tracing::debug;

/// The result of a successful parse.
#[derive(Debug)]
pub struct ParseOutput {
    /// The file's class body.
    pub class: Class,
    /// Byte offset where verbatim pass-through starts, when a truncated
    /// construct was recovered.
    pub tail: Option<u32>,
}

/// Parse a cooked token stream into a class tree.
pub fn parse(source: &str, tokens: &TokenList) -> Result<ParseOutput, ParseError> {
    debug!(len = source.len(), "parse");
    let cursor = cursor::Cursor::new(source, tokens);
    let mut parser = parser::Parser::new(cursor);
    let class = parser.parse_class_body(true)?;
    Ok(ParseOutput {
        class,
        tail: parser.tail,
    })
}

/// Convenience entry: lex and parse in one step.
pub fn parse_source(source: &str) -> Result<ParseOutput, ParseError> {
    let tokens = gds_lexer::lex(source)?;
    parse(source, &tokens)
}
