//! Comment trivia attached to tree nodes.
//!
//! Comments are not nodes; they are properties of the node they describe.
//! A stand-alone comment above a construct becomes one of its `leading`
//! comments, an end-of-line comment becomes its `trailing` comment, and a
//! comment inside an otherwise empty bracketed group dangles on the group.
//!
//! Disabled-code comments (commented-out code sitting at a column that
//! does not match the surrounding block) keep the full original line so
//! the printer can reproduce them byte for byte.

use std::fmt;

/// A stand-alone comment occupying its own source line.
#[derive(Clone, Eq, PartialEq)]
pub struct CommentLine {
    /// Comment text from the first `#` to end of line.
    pub text: String,
    /// Tab depth of the `#` in the source line.
    pub column: u16,
    /// A blank line separated this comment from what precedes it.
    pub blank_before: bool,
    /// Disabled-code line: print `text` verbatim at column zero of the
    /// original line instead of re-indenting to the block level.
    pub disabled: bool,
}

impl CommentLine {
    pub fn new(text: impl Into<String>, column: u16) -> Self {
        CommentLine {
            text: text.into(),
            column,
            blank_before: false,
            disabled: false,
        }
    }
}

impl fmt::Debug for CommentLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CommentLine({:?} @ col {}{}{})",
            self.text,
            self.column,
            if self.blank_before { ", blank" } else { "" },
            if self.disabled { ", disabled" } else { "" },
        )
    }
}

/// An end-of-line comment trailing code on the same physical line.
#[derive(Clone, Eq, PartialEq)]
pub struct InlineComment {
    /// Comment text from `#` to end of line.
    pub text: String,
}

impl InlineComment {
    pub fn new(text: impl Into<String>) -> Self {
        InlineComment { text: text.into() }
    }
}

impl fmt::Debug for InlineComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InlineComment({:?})", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_line_defaults() {
        let c = CommentLine::new("# hello", 2);
        assert_eq!(c.column, 2);
        assert!(!c.blank_before);
        assert!(!c.disabled);
    }
}
