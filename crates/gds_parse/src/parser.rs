//! Parser state and trivia plumbing.
//!
//! The grammar modules drive a [`Parser`] that owns the token cursor plus
//! the comment bookkeeping the attachment rules need:
//!
//! - `pending` holds stand-alone comments waiting for the construct that
//!   follows them;
//! - `carried` holds comments that bubbled out of a finished suite and
//!   belong to the parent (a dedented comment between an `if` body and
//!   its `else`, for example);
//! - `tail` is set when a truncated construct switches the formatter
//!   into pass-through mode for the rest of the file.

use gds_ir::{CommentLine, InlineComment, ParseError, Span, TokenKind};

use crate::cursor::Cursor;

/// A stand-alone comment not yet attached to a node.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingComment {
    /// Span of the comment text (`#` through end of line).
    pub(crate) span: Span,
    /// Tab column of the `#`.
    pub(crate) column: u16,
    /// A blank line preceded this comment.
    pub(crate) blank_before: bool,
}

pub(crate) struct Parser<'a> {
    pub(crate) cursor: Cursor<'a>,
    /// Open `( [ {` count; newlines are trivia while non-zero.
    pub(crate) bracket_depth: usize,
    /// Suite nesting depth in indentation levels.
    pub(crate) depth: u16,
    /// Stand-alone comments waiting for the next construct.
    pub(crate) pending: Vec<PendingComment>,
    /// Comments that bubbled out of a finished suite.
    pub(crate) carried: Vec<PendingComment>,
    /// A blank line seen just before a dedent; it belongs to whatever
    /// the parent parses next.
    pub(crate) carried_blank: bool,
    /// Byte offset where pass-through of unparseable source begins.
    pub(crate) tail: Option<u32>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        Parser {
            cursor,
            bracket_depth: 0,
            depth: 0,
            pending: Vec::new(),
            carried: Vec::new(),
            carried_blank: false,
            tail: None,
        }
    }

    /// True once a truncated construct switched to pass-through mode;
    /// every enclosing loop unwinds without consuming more tokens.
    pub(crate) fn truncated(&self) -> bool {
        self.tail.is_some()
    }

    // --- Line-level trivia -------------------------------------------------

    /// Skip newlines and collect stand-alone comments into `pending`.
    ///
    /// Returns true when a blank line immediately precedes the next
    /// construct. Runs of blanks collapse to one; a blank above a comment
    /// is recorded on that comment instead.
    pub(crate) fn collect_line_trivia(&mut self) -> bool {
        let mut blank = std::mem::take(&mut self.carried_blank);
        let mut comment_terminator = false;
        loop {
            match self.cursor.kind() {
                TokenKind::Newline { .. } => {
                    if comment_terminator {
                        comment_terminator = false;
                    } else {
                        blank = true;
                    }
                    self.cursor.advance();
                }
                TokenKind::Comment { own_line: true } => {
                    let span = self.cursor.span();
                    self.pending.push(PendingComment {
                        span,
                        column: self.cursor.column_of(span.start),
                        blank_before: blank,
                    });
                    blank = false;
                    comment_terminator = true;
                    self.cursor.advance();
                }
                _ => return blank,
            }
        }
    }

    /// Move carried comments from a finished suite in front of `pending`.
    pub(crate) fn reclaim_carried(&mut self) {
        if !self.carried.is_empty() {
            let mut carried = std::mem::take(&mut self.carried);
            carried.append(&mut self.pending);
            self.pending = carried;
        }
    }

    /// Turn a pending comment into a [`CommentLine`], deciding whether it
    /// is a disabled-code line relative to `expected_depth`.
    pub(crate) fn finish_comment(&self, pc: &PendingComment, expected_depth: u16) -> CommentLine {
        let text = self.cursor.slice(pc.span);
        let content = text.trim_start_matches('#');
        let disabled = pc.column < expected_depth && content.starts_with('\t');
        let text = if disabled {
            self.cursor.line_through(pc.span.start, pc.span.end)
        } else {
            text
        };
        CommentLine {
            text: text.to_string(),
            column: pc.column,
            blank_before: pc.blank_before,
            disabled,
        }
    }

    /// Drain `pending` into finished comment lines at `expected_depth`.
    pub(crate) fn drain_pending(&mut self, expected_depth: u16) -> Vec<CommentLine> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .iter()
            .map(|pc| self.finish_comment(pc, expected_depth))
            .collect()
    }

    /// Split `pending` at a suite boundary: comments at (or beyond) the
    /// suite's depth stay as its footer, shallower ones bubble to the
    /// parent via `carried`.
    pub(crate) fn split_footer(&mut self, depth: u16) -> Vec<CommentLine> {
        let pending = std::mem::take(&mut self.pending);
        let mut footer = Vec::new();
        for pc in pending {
            if pc.column >= depth {
                footer.push(self.finish_comment(&pc, depth));
            } else {
                self.carried.push(pc);
            }
        }
        footer
    }

    // --- Inline trivia -----------------------------------------------------

    /// Consume a same-line comment, if one trails the code just parsed.
    pub(crate) fn take_trailing(&mut self) -> Option<InlineComment> {
        if matches!(self.cursor.kind(), TokenKind::Comment { own_line: false }) {
            let text = self.cursor.text().to_string();
            self.cursor.advance();
            Some(InlineComment::new(text))
        } else {
            None
        }
    }

    /// Inside brackets, newlines are trivia: skip them and stash any
    /// stand-alone comments for the next element.
    pub(crate) fn skip_expr_trivia(&mut self) {
        if self.bracket_depth == 0 {
            return;
        }
        loop {
            match self.cursor.kind() {
                TokenKind::Newline { .. } => {
                    self.cursor.advance();
                }
                TokenKind::Comment { own_line } => {
                    // A comment right after an opening bracket is not on
                    // its own line but still belongs to what follows.
                    let span = self.cursor.span();
                    self.pending.push(PendingComment {
                        span,
                        column: if own_line {
                            self.cursor.column_of(span.start)
                        } else {
                            self.depth + 1
                        },
                        blank_before: false,
                    });
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    // --- Statement termination ---------------------------------------------

    /// Finish a logical line: optional trailing comment, then a newline
    /// (or `;`, or end of file). Returns the trailing comment.
    pub(crate) fn end_statement(&mut self) -> Result<Option<InlineComment>, ParseError> {
        let trailing = self.take_trailing();
        match self.cursor.kind() {
            TokenKind::Newline { .. } | TokenKind::Semicolon => {
                self.cursor.advance();
            }
            TokenKind::Eof => {}
            _ => return Err(self.cursor.unexpected("end of line")),
        }
        Ok(trailing)
    }

    /// Consume the newline/indent opening an indented block.
    ///
    /// On a missing block the error is a recoverable
    /// `TruncatedConstruct`; callers translate it into pass-through.
    pub(crate) fn expect_block_start(&mut self, context: &str) -> Result<(), ParseError> {
        while matches!(self.cursor.kind(), TokenKind::Newline { .. }) {
            self.cursor.advance();
        }
        // Stand-alone comments between the header and the block belong to
        // the first statement; leave them for collect_line_trivia.
        while matches!(self.cursor.kind(), TokenKind::Comment { own_line: true }) {
            let span = self.cursor.span();
            self.pending.push(PendingComment {
                span,
                column: self.cursor.column_of(span.start),
                blank_before: false,
            });
            self.cursor.advance();
            while matches!(self.cursor.kind(), TokenKind::Newline { .. }) {
                self.cursor.advance();
            }
        }
        if self.cursor.check(TokenKind::Indent) {
            self.cursor.advance();
            Ok(())
        } else {
            Err(ParseError::truncated(
                self.cursor.span(),
                format!("expected an indented block after {context}"),
            ))
        }
    }
}
