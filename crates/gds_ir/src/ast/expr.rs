//! Expression nodes.
//!
//! Every expression carries its own comment slots: `leading` holds the
//! full-line comments above it when it appears as a collection element or
//! inside a multi-line group, `trailing` the comment ending its line.
//! Literals keep their exact source text so quote styles and numeric
//! spellings survive the round trip.

use super::op::{BinaryOp, UnaryOp};
use super::{Parameter, Suite, TypeRef};
use crate::{CommentLine, InlineComment};

/// Expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub leading: Vec<CommentLine>,
    pub trailing: Option<InlineComment>,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            leading: Vec::new(),
            trailing: None,
        }
    }

    /// Does this subtree carry any comment?
    ///
    /// A commented operand freezes its enclosing group as broken, so the
    /// layouter asks this before attempting a flat rendering.
    pub fn has_comments(&self) -> bool {
        if !self.leading.is_empty() || self.trailing.is_some() {
            return true;
        }
        match &self.kind {
            ExprKind::Preload(inner) | ExprKind::Await(inner) => inner.has_comments(),
            ExprKind::Call { callee, args, dangling } => {
                !dangling.is_empty()
                    || callee.has_comments()
                    || args.iter().any(Expr::has_comments)
            }
            ExprKind::Attribute { base, .. } => base.has_comments(),
            ExprKind::Subscript { base, index } => base.has_comments() || index.has_comments(),
            ExprKind::Unary { operand, .. } => operand.has_comments(),
            ExprKind::Binary { lhs, rhs, .. } => lhs.has_comments() || rhs.has_comments(),
            ExprKind::Ternary { then, cond, other } => {
                then.has_comments() || cond.has_comments() || other.has_comments()
            }
            ExprKind::Cast { value, .. } => value.has_comments(),
            ExprKind::Array { elements, dangling } => {
                !dangling.is_empty() || elements.iter().any(Expr::has_comments)
            }
            ExprKind::Dictionary { entries, dangling } => {
                !dangling.is_empty()
                    || entries
                        .iter()
                        .any(|e| e.key.has_comments() || e.value.has_comments())
            }
            ExprKind::Paren(inner) => inner.has_comments(),
            ExprKind::Literal(_)
            | ExprKind::Identifier(_)
            | ExprKind::SelfExpr
            | ExprKind::SuperExpr
            | ExprKind::GetNode(_)
            | ExprKind::Lambda { .. } => false,
        }
    }
}

/// Expression variants.
#[derive(Clone, Debug)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    SelfExpr,
    SuperExpr,
    /// `$Path/To/Node` or `$"…"`, text verbatim with the `$`.
    GetNode(String),
    /// `preload(arg)`.
    Preload(Box<Expr>),
    /// `callee(args)`.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        /// Comments inside an otherwise empty argument list, or after
        /// the last argument.
        dangling: Vec<CommentLine>,
    },
    /// `base.name`.
    Attribute { base: Box<Expr>, name: String },
    /// `base[index]`.
    Subscript { base: Box<Expr>, index: Box<Expr> },
    /// Prefix operator.
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// `await operand`.
    Await(Box<Expr>),
    /// `lhs op rhs`.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// `then if cond else other`.
    Ternary {
        then: Box<Expr>,
        cond: Box<Expr>,
        other: Box<Expr>,
    },
    /// `value as Type`.
    Cast { value: Box<Expr>, ty: TypeRef },
    /// `[elements]`.
    Array {
        elements: Vec<Expr>,
        dangling: Vec<CommentLine>,
    },
    /// `{entries}`.
    Dictionary {
        entries: Vec<DictEntry>,
        dangling: Vec<CommentLine>,
    },
    /// `func(params) [-> Type]:` with an indented body.
    Lambda {
        params: Vec<Parameter>,
        return_ty: Option<TypeRef>,
        body: Suite,
    },
    /// Explicit grouping parentheses from the source.
    ///
    /// Removed by the normalizer; output parenthesization is re-derived
    /// from precedence.
    Paren(Box<Expr>),
}

/// One `key: value` (or Lua-style `key = value`) dictionary entry.
#[derive(Clone, Debug)]
pub struct DictEntry {
    pub key: Expr,
    pub value: Expr,
    pub style: DictKeyStyle,
}

/// The key syntax a dictionary entry was written with, preserved.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DictKeyStyle {
    /// `"key": value`
    Colon,
    /// `key = value`
    Lua,
}

/// A literal token, reproduced verbatim.
#[derive(Clone, Debug)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Exact source text, quote style and escapes included.
    pub text: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, text: impl Into<String>) -> Self {
        Literal {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LiteralKind {
    Int,
    Float,
    Str,
    /// `&"…"`
    StringName,
    /// `^"…"`
    NodePath,
    Bool,
    Null,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Expr {
        Expr::new(ExprKind::Identifier(name.into()))
    }

    #[test]
    fn test_has_comments_plain() {
        let expr = ident("x");
        assert!(!expr.has_comments());
    }

    #[test]
    fn test_has_comments_nested() {
        let mut operand = ident("x");
        operand.trailing = Some(InlineComment::new("# here"));
        let expr = Expr::new(ExprKind::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(operand),
            rhs: Box::new(ident("y")),
        });
        assert!(expr.has_comments());
    }

    #[test]
    fn test_has_comments_dangling() {
        let expr = Expr::new(ExprKind::Array {
            elements: Vec::new(),
            dangling: vec![CommentLine::new("# lonely", 1)],
        });
        assert!(expr.has_comments());
    }
}
