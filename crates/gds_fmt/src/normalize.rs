//! Canonical tree rewrites between parsing and layout.
//!
//! - class header lines reorder to `@tool`, `class_name`, `extends`,
//!   `@icon`;
//! - property accessors reorder to `set` before `get`;
//! - explicit grouping parentheses are dropped everywhere, hoisting
//!   their comments: a trailing comment on the close paren moves to the
//!   inner expression, and a parenthesized dictionary value moves its
//!   leading comments onto the entry's key. Output parenthesization is
//!   re-derived from precedence by the layouter, which removes the
//!   parens that existed only to host a multi-line form.
//!
//! Trailing commas are not a tree rewrite: the layouter inserts them
//! through `IfBroken` so they appear exactly when a collection renders
//! expanded.

use gds_ir::ast::{
    Accessor, Class, Expr, ExprKind, HeaderKind, HeaderLine, Member, MemberKind, Property, Stmt,
    StmtKind, Suite, VarDecl,
};

pub(crate) fn normalize(class: &mut Class) {
    normalize_class(class);
}

fn normalize_class(class: &mut Class) {
    class.header.sort_by_key(header_rank);
    for member in &mut class.members {
        normalize_member(member);
    }
}

fn header_rank(line: &HeaderLine) -> u8 {
    match line.kind {
        HeaderKind::Tool(_) => 0,
        HeaderKind::ClassName(_) => 1,
        HeaderKind::Extends(_) => 2,
        HeaderKind::Icon(_) => 3,
    }
}

fn normalize_member(member: &mut Member) {
    match &mut member.kind {
        MemberKind::Var(decl) => normalize_var(decl),
        MemberKind::Const(decl) => {
            for annotation in &mut decl.annotations {
                normalize_annotation_args(annotation);
            }
            walk_expr(&mut decl.value);
        }
        MemberKind::Signal(decl) => {
            if let Some(params) = &mut decl.params {
                for param in params {
                    if let Some(default) = &mut param.default {
                        walk_expr(default);
                    }
                }
            }
        }
        MemberKind::Enum(decl) => {
            for variant in &mut decl.variants {
                if let Some(value) = &mut variant.value {
                    walk_expr(value);
                }
            }
        }
        MemberKind::Func(decl) => {
            for annotation in &mut decl.annotations {
                normalize_annotation_args(annotation);
            }
            for param in &mut decl.params {
                if let Some(default) = &mut param.default {
                    walk_expr(default);
                }
            }
            normalize_suite(&mut decl.body);
        }
        MemberKind::Class(inner) => normalize_class(&mut inner.body),
        MemberKind::Pass => {}
    }
}

fn normalize_var(decl: &mut VarDecl) {
    for annotation in &mut decl.annotations {
        normalize_annotation_args(annotation);
    }
    if let Some(value) = &mut decl.value {
        walk_expr(value);
    }
    if let Some(property) = &mut decl.property {
        normalize_property(property);
    }
}

fn normalize_annotation_args(annotation: &mut gds_ir::ast::Annotation) {
    if let Some(args) = &mut annotation.args {
        for arg in args {
            walk_expr(arg);
        }
    }
}

/// Reorder accessors to the canonical `set` then `get`, keeping each
/// accessor's comments and body with it.
fn normalize_property(property: &mut Property) {
    property.accessors.sort_by_key(accessor_rank);
    for accessor in &mut property.accessors {
        normalize_suite(&mut accessor.body);
    }
}

fn accessor_rank(accessor: &Accessor) -> u8 {
    if accessor.kind.is_set() {
        0
    } else {
        1
    }
}

fn normalize_suite(suite: &mut Suite) {
    for stmt in &mut suite.statements {
        normalize_stmt(stmt);
    }
}

fn normalize_stmt(stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Var(decl) => normalize_var(decl),
        StmtKind::If(if_stmt) => {
            walk_expr(&mut if_stmt.if_branch.condition);
            normalize_suite(&mut if_stmt.if_branch.body);
            for branch in &mut if_stmt.elif_branches {
                walk_expr(&mut branch.condition);
                normalize_suite(&mut branch.body);
            }
            if let Some(else_branch) = &mut if_stmt.else_branch {
                normalize_suite(&mut else_branch.body);
            }
        }
        StmtKind::While { condition, body } => {
            walk_expr(condition);
            normalize_suite(body);
        }
        StmtKind::For {
            iterable, body, ..
        } => {
            walk_expr(iterable);
            normalize_suite(body);
        }
        StmtKind::Match { subject, arms } => {
            walk_expr(subject);
            for arm in arms {
                normalize_suite(&mut arm.body);
            }
        }
        StmtKind::Return(Some(value)) => walk_expr(value),
        StmtKind::Assert { condition, message } => {
            walk_expr(condition);
            if let Some(message) = message {
                walk_expr(message);
            }
        }
        StmtKind::Assign { target, value, .. } => {
            walk_expr(target);
            walk_expr(value);
        }
        StmtKind::Expr(expr) => walk_expr(expr),
        StmtKind::Return(None)
        | StmtKind::Pass
        | StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Breakpoint => {}
    }
}

/// Recurse through an expression, unwrapping `Paren` nodes bottom-up.
fn walk_expr(expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Preload(inner) | ExprKind::Await(inner) => walk_expr(inner),
        ExprKind::Call { callee, args, .. } => {
            walk_expr(callee);
            for arg in args {
                walk_expr(arg);
            }
        }
        ExprKind::Attribute { base, .. } => walk_expr(base),
        ExprKind::Subscript { base, index } => {
            walk_expr(base);
            walk_expr(index);
        }
        ExprKind::Unary { operand, .. } => walk_expr(operand),
        ExprKind::Binary { lhs, rhs, .. } => {
            walk_expr(lhs);
            walk_expr(rhs);
        }
        ExprKind::Ternary { then, cond, other } => {
            walk_expr(then);
            walk_expr(cond);
            walk_expr(other);
        }
        ExprKind::Cast { value, .. } => walk_expr(value),
        ExprKind::Array { elements, .. } => {
            for element in elements {
                walk_expr(element);
            }
        }
        ExprKind::Dictionary { entries, .. } => {
            for entry in entries {
                walk_expr(&mut entry.key);
                walk_expr(&mut entry.value);
                // A parenthesized value's comments belong above the key:
                // the entry renders as one `key: value` line.
                let hoisted: Vec<_> = entry.value.leading.drain(..).collect();
                entry.key.leading.extend(hoisted);
            }
        }
        ExprKind::Lambda { params, body, .. } => {
            for param in params.iter_mut() {
                if let Some(default) = &mut param.default {
                    walk_expr(default);
                }
            }
            normalize_suite(body);
        }
        ExprKind::Paren(_) => {}
        ExprKind::Literal(_)
        | ExprKind::Identifier(_)
        | ExprKind::SelfExpr
        | ExprKind::SuperExpr
        | ExprKind::GetNode(_) => {}
    }

    if matches!(expr.kind, ExprKind::Paren(_)) {
        let ExprKind::Paren(inner) = std::mem::replace(&mut expr.kind, ExprKind::SelfExpr) else {
            unreachable!();
        };
        let mut inner = *inner;
        walk_expr(&mut inner);
        // Hoist: comments on the parens join the inner expression's.
        let mut leading = std::mem::take(&mut expr.leading);
        leading.extend(inner.leading.drain(..));
        inner.leading = leading;
        if inner.trailing.is_none() {
            inner.trailing = expr.trailing.take();
        }
        *expr = inner;
    }
}
