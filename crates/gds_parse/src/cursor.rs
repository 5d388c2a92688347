//! Token cursor for navigating the cooked token stream.
//!
//! Provides low-level token access, lookahead, consumption, and source
//! slicing. Grammar logic lives in the `grammar` modules; the cursor only
//! knows about tokens.

use gds_ir::{ParseError, Span, Token, TokenKind, TokenList};

pub(crate) struct Cursor<'a> {
    source: &'a str,
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str, tokens: &'a TokenList) -> Self {
        debug_assert!(!tokens.is_empty(), "token stream always ends with Eof");
        Cursor {
            source,
            tokens,
            pos: 0,
        }
    }

    /// Get the current token.
    ///
    /// Invariant: the cursor never advances past the trailing `Eof`.
    #[inline]
    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn span(&self) -> Span {
        self.current().span
    }

    /// Source text of the current token.
    #[inline]
    pub(crate) fn text(&self) -> &'a str {
        &self.source[self.span().to_range()]
    }

    /// Source text of an arbitrary span.
    #[inline]
    pub(crate) fn slice(&self, span: Span) -> &'a str {
        &self.source[span.to_range()]
    }

    /// Advance one token, returning the one stepped over.
    pub(crate) fn advance(&mut self) -> Token {
        let token = *self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token when it matches.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or fail with `UnexpectedToken`.
    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(context))
        }
    }

    /// An `UnexpectedToken` error describing the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let found = match self.kind() {
            TokenKind::Identifier
            | TokenKind::Int
            | TokenKind::Float
            | TokenKind::Str
            | TokenKind::StringName
            | TokenKind::NodePath
            | TokenKind::GetNode => format!("`{}`", self.text()),
            kind => format!("`{}`", kind.display_name()),
        };
        ParseError::unexpected_token(self.span(), &found, expected)
    }

    /// Peek at the next token's kind (one-token lookahead).
    #[inline]
    pub(crate) fn peek_next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    /// Is the current token an identifier with this exact text?
    pub(crate) fn check_ident(&self, text: &str) -> bool {
        self.check(TokenKind::Identifier) && self.text() == text
    }

    /// Tab column of the comment token starting at `start`, counted from
    /// the beginning of its source line.
    pub(crate) fn column_of(&self, start: u32) -> u16 {
        let head = &self.source[..start as usize];
        let line_start = head.rfind('\n').map_or(0, |i| i + 1);
        u16::try_from(
            self.source[line_start..start as usize]
                .chars()
                .filter(|&c| c == '\t')
                .count(),
        )
        .unwrap_or(u16::MAX)
    }

    /// The full source line holding offset `start`, from the line start
    /// through `end` — used to preserve disabled-code comments verbatim.
    pub(crate) fn line_through(&self, start: u32, end: u32) -> &'a str {
        let head = &self.source[..start as usize];
        let line_start = head.rfind('\n').map_or(0, |i| i + 1);
        &self.source[line_start..end as usize]
    }
}
