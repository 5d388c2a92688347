//! Statement nodes and match patterns.

use super::{Expr, Suite, Trivia, VarDecl};

/// A statement inside a suite.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub trivia: Trivia,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            kind,
            trivia: Trivia::new(),
        }
    }

    /// True for statements that own an indented suite; a disabled-line
    /// comment following one of these gets a separating blank line.
    pub fn is_compound(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::If(_) | StmtKind::While { .. } | StmtKind::For { .. } | StmtKind::Match { .. }
        )
    }
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    /// Local `var` declaration (annotation-free).
    Var(VarDecl),
    If(IfStmt),
    While {
        condition: Expr,
        body: Suite,
    },
    For {
        binding: String,
        iterable: Expr,
        body: Suite,
    },
    Match {
        subject: Expr,
        arms: Vec<MatchArm>,
    },
    Return(Option<Expr>),
    Pass,
    Break,
    Continue,
    Breakpoint,
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
    /// `target op value`; the operator text (`=`, `+=`, …) is preserved.
    Assign {
        target: Expr,
        op: &'static str,
        value: Expr,
    },
    Expr(Expr),
}

/// An `if`/`elif`/`else` chain.
#[derive(Clone, Debug)]
pub struct IfStmt {
    /// The `if` branch; its comments live on the enclosing [`Stmt`].
    pub if_branch: IfBranch,
    /// `elif` branches with their own comment lines.
    pub elif_branches: Vec<IfBranch>,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Clone, Debug)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Suite,
    pub trivia: Trivia,
}

#[derive(Clone, Debug)]
pub struct ElseBranch {
    pub body: Suite,
    pub trivia: Trivia,
}

/// One arm of a `match` statement.
#[derive(Clone, Debug)]
pub struct MatchArm {
    /// Comma-separated alternative patterns.
    pub patterns: Vec<Pattern>,
    pub body: Suite,
    pub trivia: Trivia,
}

/// A match pattern.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// A literal or constant expression pattern.
    Value(Expr),
    /// `_`
    Wildcard,
    /// `var name`
    Binding(String),
    /// `[p0, p1, ..]` — `open_ended` when it ends with `..`.
    Array {
        elements: Vec<Pattern>,
        open_ended: bool,
    },
    /// `{"key": pattern, ..}` — a `None` value matches the key alone.
    Dictionary {
        entries: Vec<(Expr, Option<Pattern>)>,
        open_ended: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;

    #[test]
    fn test_is_compound() {
        let pass = Stmt::new(StmtKind::Pass);
        assert!(!pass.is_compound());

        let while_stmt = Stmt::new(StmtKind::While {
            condition: Expr::new(ExprKind::Identifier("flag".into())),
            body: Suite::new(),
        });
        assert!(while_stmt.is_compound());
    }
}
