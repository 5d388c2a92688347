//! The error type crossing the formatter's public API.

use crate::Span;
use std::fmt;

/// What went wrong while lexing or parsing.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ParseErrorKind {
    /// End of file inside a string literal.
    UnterminatedString,
    /// Mixed tab/space indentation, space indentation, or a dedent to a
    /// depth that matches no open block.
    InvalidIndent,
    /// A byte sequence no token starts with.
    UnexpectedChar,
    /// The parser expected one of a finite token set and saw something else.
    UnexpectedToken,
    /// A construct opened but was not completed before end of file.
    /// Recoverable: the formatter emits the valid prefix and passes the
    /// tail through unchanged.
    TruncatedConstruct,
    /// A must-not-happen state in the normalizer or layouter.
    Internal,
}

impl ParseErrorKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ParseErrorKind::UnterminatedString => "unterminated string",
            ParseErrorKind::InvalidIndent => "invalid indentation",
            ParseErrorKind::UnexpectedChar => "unexpected character",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::TruncatedConstruct => "truncated construct",
            ParseErrorKind::Internal => "internal error",
        }
    }
}

/// Parse error with location and message.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn unterminated_string(span: Span) -> Self {
        ParseError::new(
            ParseErrorKind::UnterminatedString,
            span,
            "string literal is never closed",
        )
    }

    pub fn invalid_indent(span: Span, message: impl Into<String>) -> Self {
        ParseError::new(ParseErrorKind::InvalidIndent, span, message)
    }

    pub fn unexpected_char(span: Span, text: &str) -> Self {
        ParseError::new(
            ParseErrorKind::UnexpectedChar,
            span,
            format!("unrecognized token `{text}`"),
        )
    }

    pub fn unexpected_token(span: Span, found: &str, expected: &str) -> Self {
        ParseError::new(
            ParseErrorKind::UnexpectedToken,
            span,
            format!("expected {expected}, found {found}"),
        )
    }

    pub fn truncated(span: Span, message: impl Into<String>) -> Self {
        ParseError::new(ParseErrorKind::TruncatedConstruct, span, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ParseError::new(ParseErrorKind::Internal, Span::DUMMY, message)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}: {}",
            self.kind.display_name(),
            self.span,
            self.message
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::unexpected_token(Span::new(4, 5), "`:`", "an expression");
        assert_eq!(
            err.to_string(),
            "unexpected token at 4..5: expected an expression, found `:`"
        );
    }

    #[test]
    fn test_error_constructors() {
        assert_eq!(
            ParseError::unterminated_string(Span::new(0, 3)).kind,
            ParseErrorKind::UnterminatedString
        );
        assert_eq!(
            ParseError::internal("unreachable layout state").kind,
            ParseErrorKind::Internal
        );
    }
}
