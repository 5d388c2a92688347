//! Layout: translating tree nodes into document primitives.
//!
//! Parenthesization is re-derived from precedence here, which is what
//! makes redundant source parentheses disappear. Two paren styles exist:
//! precedence parens are part of the expression text and render flat or
//! broken alike, while wrap parens (`IfBroken`) appear only when a bare
//! binary chain, ternary, or condition has to break across lines.
//!
//! Comment-bearing constructs freeze as broken: a leading comment inside
//! a group contributes a hard break, and trailing comments on elements or
//! operands force the expanded form so the comment ends its own line.

use gds_ir::ast::{
    Accessor, AccessorKind, Annotation, BinaryOp, ConstDecl, DictKeyStyle, EnumDecl, Expr,
    ExprKind, FuncDecl, IfStmt, MatchArm, Parameter, Pattern, SignalDecl, Stmt, StmtKind, Suite,
    TypeRef, VarDecl,
};
use gds_ir::{CommentLine, InlineComment};

use crate::config::FormatConfig;
use crate::doc::{Doc, GroupMode};

/// Precedence slot of postfix bases (member/subscript/call).
const PREC_POSTFIX: u8 = 13;
/// Precedence slot of unary operands.
const PREC_UNARY: u8 = 12;
/// Precedence slot of `as` cast values.
const PREC_CAST: u8 = 2;

/// Whether wrap parentheses surround a breaking construct.
#[derive(Copy, Clone, Eq, PartialEq)]
enum ParenStyle {
    /// The enclosing context already provides the parentheses.
    Provided,
    /// Emit `(`/`)` only when the group breaks.
    IfBroken,
}

pub(crate) struct Layouter<'a> {
    config: &'a FormatConfig,
}

/// Ensure a space after the comment marker: `#x` becomes `# x`, doc
/// comments (`##`) keep their marker, existing spacing is untouched.
pub(crate) fn normalize_comment(text: &str) -> String {
    let hashes = text.len() - text.trim_start_matches('#').len();
    let (marker, rest) = text.split_at(hashes);
    if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t') {
        text.to_string()
    } else {
        format!("{marker} {rest}")
    }
}

/// One element of a bracketed list, with its comma-adjacent comment.
struct ItemDoc {
    doc: Doc,
    trailing: Option<String>,
}

struct ListOpts {
    /// Trailing comma in the expanded form (arrays, dictionaries, enums).
    trailing_comma: bool,
    /// Space padding inside the brackets when flat (enum braces).
    pad_flat: bool,
}

impl<'a> Layouter<'a> {
    pub(crate) fn new(config: &'a FormatConfig) -> Self {
        Layouter { config }
    }

    fn block_indent(&self) -> u16 {
        self.config.block_indent()
    }

    // --- comments ----------------------------------------------------------

    fn comment_line_doc(&self, comment: &CommentLine) -> Doc {
        if comment.disabled {
            Doc::Verbatim(comment.text.clone())
        } else {
            Doc::text(normalize_comment(&comment.text))
        }
    }

    fn trailing_text(&self, comment: &InlineComment) -> String {
        format!(" {}", normalize_comment(&comment.text))
    }

    // --- suites and statements ---------------------------------------------

    pub(crate) fn suite_doc(&self, suite: &Suite) -> Doc {
        let mut parts = Vec::new();
        for (i, stmt) in suite.statements.iter().enumerate() {
            if i > 0 {
                parts.push(Doc::HardBreak);
            }
            let blank = stmt.trivia.blank_before && i > 0;
            if blank {
                parts.push(Doc::HardBreak);
            }
            // A disabled line right after a compound statement reads as
            // part of its suite; a separating blank keeps it distinct.
            if !blank
                && i > 0
                && suite.statements[i - 1].is_compound()
                && stmt.trivia.leading.first().is_some_and(|c| c.disabled)
            {
                parts.push(Doc::HardBreak);
            }
            for comment in &stmt.trivia.leading {
                if comment.blank_before {
                    parts.push(Doc::HardBreak);
                }
                parts.push(self.comment_line_doc(comment));
                parts.push(Doc::HardBreak);
            }
            parts.push(self.stmt_doc(stmt));
        }
        for comment in &suite.footer {
            parts.push(Doc::HardBreak);
            if comment.blank_before {
                parts.push(Doc::HardBreak);
            }
            parts.push(self.comment_line_doc(comment));
        }
        Doc::concat(parts)
    }

    fn stmt_doc(&self, stmt: &Stmt) -> Doc {
        let trailing = stmt.trivia.trailing.as_ref();
        match &stmt.kind {
            StmtKind::Var(decl) => self.var_decl_doc(decl, trailing),
            StmtKind::If(if_stmt) => self.if_doc(if_stmt, trailing),
            StmtKind::While { condition, body } => Doc::concat(vec![
                Doc::text("while "),
                self.condition_doc(condition),
                Doc::text(":"),
                self.opt_trailing(trailing),
                Doc::HardBreak,
                Doc::indent(1, self.suite_doc(body)),
            ]),
            StmtKind::For {
                binding,
                iterable,
                body,
            } => Doc::concat(vec![
                Doc::text(format!("for {binding} in ")),
                self.value_doc(iterable, None),
                Doc::text(":"),
                self.opt_trailing(trailing),
                Doc::HardBreak,
                Doc::indent(1, self.suite_doc(body)),
            ]),
            StmtKind::Match { subject, arms } => self.match_doc(subject, arms, trailing),
            StmtKind::Return(value) => {
                let mut parts = vec![Doc::text("return")];
                match value {
                    Some(value) => {
                        parts.push(Doc::text(" "));
                        parts.push(self.value_doc(value, trailing));
                    }
                    None => parts.push(self.opt_trailing(trailing)),
                }
                Doc::concat(parts)
            }
            StmtKind::Pass => self.keyword_doc("pass", trailing),
            StmtKind::Break => self.keyword_doc("break", trailing),
            StmtKind::Continue => self.keyword_doc("continue", trailing),
            StmtKind::Breakpoint => self.keyword_doc("breakpoint", trailing),
            StmtKind::Assert { condition, message } => {
                let mut parts = vec![Doc::text("assert("), self.element_doc(condition)];
                if let Some(message) = message {
                    parts.push(Doc::text(", "));
                    parts.push(self.element_doc(message));
                }
                parts.push(Doc::text(")"));
                parts.push(self.opt_trailing(trailing));
                Doc::concat(parts)
            }
            StmtKind::Assign { target, op, value } => Doc::concat(vec![
                self.expr_doc(target, 0),
                Doc::text(format!(" {op} ")),
                self.value_doc(value, trailing),
            ]),
            StmtKind::Expr(expr) => self.value_doc(expr, trailing),
        }
    }

    fn keyword_doc(&self, keyword: &str, trailing: Option<&InlineComment>) -> Doc {
        Doc::concat(vec![Doc::text(keyword), self.opt_trailing(trailing)])
    }

    fn opt_trailing(&self, trailing: Option<&InlineComment>) -> Doc {
        match trailing {
            Some(comment) => Doc::text(self.trailing_text(comment)),
            None => Doc::Nil,
        }
    }

    fn if_doc(&self, if_stmt: &IfStmt, trailing: Option<&InlineComment>) -> Doc {
        let mut parts = vec![
            Doc::text("if "),
            self.condition_doc(&if_stmt.if_branch.condition),
            Doc::text(":"),
            self.opt_trailing(trailing),
            Doc::HardBreak,
            Doc::indent(1, self.suite_doc(&if_stmt.if_branch.body)),
        ];
        for branch in &if_stmt.elif_branches {
            parts.push(Doc::HardBreak);
            for comment in &branch.trivia.leading {
                if comment.blank_before {
                    parts.push(Doc::HardBreak);
                }
                parts.push(self.comment_line_doc(comment));
                parts.push(Doc::HardBreak);
            }
            parts.push(Doc::text("elif "));
            parts.push(self.condition_doc(&branch.condition));
            parts.push(Doc::text(":"));
            parts.push(self.opt_trailing(branch.trivia.trailing.as_ref()));
            parts.push(Doc::HardBreak);
            parts.push(Doc::indent(1, self.suite_doc(&branch.body)));
        }
        if let Some(else_branch) = &if_stmt.else_branch {
            parts.push(Doc::HardBreak);
            for comment in &else_branch.trivia.leading {
                if comment.blank_before {
                    parts.push(Doc::HardBreak);
                }
                parts.push(self.comment_line_doc(comment));
                parts.push(Doc::HardBreak);
            }
            parts.push(Doc::text("else:"));
            parts.push(self.opt_trailing(else_branch.trivia.trailing.as_ref()));
            parts.push(Doc::HardBreak);
            parts.push(Doc::indent(1, self.suite_doc(&else_branch.body)));
        }
        Doc::concat(parts)
    }

    fn match_doc(
        &self,
        subject: &Expr,
        arms: &[MatchArm],
        trailing: Option<&InlineComment>,
    ) -> Doc {
        let mut parts = vec![
            Doc::text("match "),
            self.value_doc(subject, None),
            Doc::text(":"),
            self.opt_trailing(trailing),
        ];
        let mut arm_parts = Vec::new();
        for (i, arm) in arms.iter().enumerate() {
            arm_parts.push(Doc::HardBreak);
            if arm.trivia.blank_before && i > 0 {
                arm_parts.push(Doc::HardBreak);
            }
            for comment in &arm.trivia.leading {
                if comment.blank_before {
                    arm_parts.push(Doc::HardBreak);
                }
                arm_parts.push(self.comment_line_doc(comment));
                arm_parts.push(Doc::HardBreak);
            }
            let patterns = arm
                .patterns
                .iter()
                .map(|p| self.pattern_text(p))
                .collect::<Vec<_>>()
                .join(", ");
            arm_parts.push(Doc::text(patterns));
            arm_parts.push(Doc::text(":"));
            arm_parts.push(self.opt_trailing(arm.trivia.trailing.as_ref()));
            arm_parts.push(Doc::HardBreak);
            arm_parts.push(Doc::indent(1, self.suite_doc(&arm.body)));
        }
        if !arm_parts.is_empty() {
            parts.push(Doc::indent(1, Doc::concat(arm_parts)));
        }
        Doc::concat(parts)
    }

    fn pattern_text(&self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::Value(expr) => self.flat_text(&self.expr_doc(expr, 0)),
            Pattern::Wildcard => "_".to_string(),
            Pattern::Binding(name) => format!("var {name}"),
            Pattern::Array {
                elements,
                open_ended,
            } => {
                let mut parts: Vec<String> =
                    elements.iter().map(|p| self.pattern_text(p)).collect();
                if *open_ended {
                    parts.push("..".to_string());
                }
                format!("[{}]", parts.join(", "))
            }
            Pattern::Dictionary {
                entries,
                open_ended,
            } => {
                let mut parts: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| {
                        let key = self.flat_text(&self.expr_doc(key, 0));
                        match value {
                            Some(pattern) => format!("{key}: {}", self.pattern_text(pattern)),
                            None => key,
                        }
                    })
                    .collect();
                if *open_ended {
                    parts.push("..".to_string());
                }
                format!("{{{}}}", parts.join(", "))
            }
        }
    }

    // --- declarations ------------------------------------------------------

    pub(crate) fn var_decl_doc(&self, decl: &VarDecl, trailing: Option<&InlineComment>) -> Doc {
        let mut head = format!("var {}", decl.name);
        if let Some(ty) = &decl.ty {
            head.push_str(": ");
            head.push_str(&self.type_text(ty));
        }
        let mut parts = vec![Doc::text(head)];
        let has_property = decl.property.is_some();
        if let Some(value) = &decl.value {
            parts.push(Doc::text(if decl.infer { " := " } else { " = " }));
            parts.push(self.value_doc(value, if has_property { None } else { trailing }));
        } else if !has_property {
            parts.push(self.opt_trailing(trailing));
        }
        if let Some(property) = &decl.property {
            parts.push(Doc::text(":"));
            parts.push(self.opt_trailing(trailing));
            let mut accessor_parts = Vec::new();
            for (i, accessor) in property.accessors.iter().enumerate() {
                accessor_parts.push(Doc::HardBreak);
                if accessor.trivia.blank_before && i > 0 {
                    accessor_parts.push(Doc::HardBreak);
                }
                accessor_parts.push(self.accessor_doc(accessor));
            }
            parts.push(Doc::indent(1, Doc::concat(accessor_parts)));
        }
        Doc::concat(parts)
    }

    fn accessor_doc(&self, accessor: &Accessor) -> Doc {
        let mut parts = Vec::new();
        for comment in &accessor.trivia.leading {
            if comment.blank_before {
                parts.push(Doc::HardBreak);
            }
            parts.push(self.comment_line_doc(comment));
            parts.push(Doc::HardBreak);
        }
        let head = match &accessor.kind {
            AccessorKind::Set { param } => format!("set({param}):"),
            AccessorKind::Get => "get:".to_string(),
        };
        parts.push(Doc::text(head));
        parts.push(self.opt_trailing(accessor.trivia.trailing.as_ref()));
        parts.push(Doc::HardBreak);
        parts.push(Doc::indent(1, self.suite_doc(&accessor.body)));
        Doc::concat(parts)
    }

    pub(crate) fn const_decl_doc(&self, decl: &ConstDecl, trailing: Option<&InlineComment>) -> Doc {
        let mut head = format!("const {}", decl.name);
        if let Some(ty) = &decl.ty {
            head.push_str(": ");
            head.push_str(&self.type_text(ty));
        }
        head.push_str(if decl.infer { " := " } else { " = " });
        Doc::concat(vec![
            Doc::text(head),
            self.value_doc(&decl.value, trailing),
        ])
    }

    pub(crate) fn signal_doc(&self, decl: &SignalDecl, trailing: Option<&InlineComment>) -> Doc {
        let mut parts = vec![Doc::text(format!("signal {}", decl.name))];
        if let Some(params) = &decl.params {
            parts.push(self.param_list_doc(params, &decl.dangling));
        }
        parts.push(self.opt_trailing(trailing));
        Doc::concat(parts)
    }

    pub(crate) fn enum_doc(&self, decl: &EnumDecl, trailing: Option<&InlineComment>) -> Doc {
        let head = match &decl.name {
            Some(name) => format!("enum {name} "),
            None => "enum ".to_string(),
        };
        let items = decl
            .variants
            .iter()
            .map(|variant| {
                let mut text = variant.name.clone();
                if let Some(value) = &variant.value {
                    text.push_str(" = ");
                    text.push_str(&self.flat_text(&self.expr_doc(value, 0)));
                }
                let mut doc_parts = Vec::new();
                for comment in &variant.leading {
                    doc_parts.push(self.comment_line_doc(comment));
                    doc_parts.push(Doc::HardBreak);
                }
                doc_parts.push(Doc::text(text));
                ItemDoc {
                    doc: Doc::concat(doc_parts),
                    trailing: variant.trailing.as_ref().map(|c| self.trailing_text(c)),
                }
            })
            .collect();
        Doc::concat(vec![
            Doc::text(head),
            self.list_doc(
                "{",
                "}",
                items,
                &decl.dangling,
                ListOpts {
                    trailing_comma: true,
                    pad_flat: true,
                },
            ),
            self.opt_trailing(trailing),
        ])
    }

    pub(crate) fn func_doc(&self, decl: &FuncDecl, trailing: Option<&InlineComment>) -> Doc {
        let head = if decl.is_static {
            format!("static func {}", decl.name)
        } else {
            format!("func {}", decl.name)
        };
        let mut parts = vec![
            Doc::text(head),
            self.param_list_doc(&decl.params, &decl.dangling),
        ];
        if let Some(ty) = &decl.return_ty {
            parts.push(Doc::text(format!(" -> {}", self.type_text(ty))));
        }
        parts.push(Doc::text(":"));
        parts.push(self.opt_trailing(trailing));
        parts.push(Doc::HardBreak);
        parts.push(Doc::indent(1, self.suite_doc(&decl.body)));
        Doc::concat(parts)
    }

    fn param_list_doc(&self, params: &[Parameter], dangling: &[CommentLine]) -> Doc {
        let items = params
            .iter()
            .map(|param| {
                let mut text = param.name.clone();
                if let Some(ty) = &param.ty {
                    text.push_str(": ");
                    text.push_str(&self.type_text(ty));
                }
                if let Some(default) = &param.default {
                    if param.infer {
                        text.push_str(" := ");
                    } else if param.ty.is_some() {
                        text.push_str(" = ");
                    } else {
                        text.push_str(" = ");
                    }
                    text.push_str(&self.flat_text(&self.expr_doc(default, 0)));
                }
                let mut doc_parts = Vec::new();
                for comment in &param.leading {
                    doc_parts.push(self.comment_line_doc(comment));
                    doc_parts.push(Doc::HardBreak);
                }
                doc_parts.push(Doc::text(text));
                ItemDoc {
                    doc: Doc::concat(doc_parts),
                    trailing: param.trailing.as_ref().map(|c| self.trailing_text(c)),
                }
            })
            .collect();
        self.list_doc(
            "(",
            ")",
            items,
            dangling,
            ListOpts {
                trailing_comma: false,
                pad_flat: false,
            },
        )
    }

    pub(crate) fn annotation_text(&self, annotation: &Annotation) -> String {
        match &annotation.args {
            None => format!("@{}", annotation.name),
            Some(args) => {
                let args = args
                    .iter()
                    .map(|arg| self.flat_text(&self.expr_doc(arg, 0)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("@{}({args})", annotation.name)
            }
        }
    }

    pub(crate) fn type_text(&self, ty: &TypeRef) -> String {
        match &ty.generic {
            Some(inner) => format!("{}[{}]", ty.name, self.type_text(inner)),
            None => ty.name.clone(),
        }
    }

    /// Flat source text of an expression (class headers, annotation
    /// arguments, patterns — positions that never wrap).
    pub(crate) fn expr_text(&self, expr: &Expr) -> String {
        self.flat_text(&self.expr_doc(expr, 0))
    }

    /// Render a document as if the line were infinitely wide.
    pub(crate) fn flat_text(&self, doc: &Doc) -> String {
        let config = FormatConfig {
            line_length_maximum: usize::MAX,
            ..self.config.clone()
        };
        crate::doc::render(doc, 0, &config)
    }

    // --- value and condition positions -------------------------------------

    /// An expression in value position (`var x = …`, `return …`,
    /// assignment right side, `for` iterable, `match` subject).
    /// Calls and collections hug their own brackets when breaking; bare
    /// binary chains and ternaries break inside wrap parentheses.
    pub(crate) fn value_doc(&self, expr: &Expr, trailing: Option<&InlineComment>) -> Doc {
        match &expr.kind {
            ExprKind::Binary { .. } => self.chain_wrap_doc(expr, ParenStyle::IfBroken, trailing),
            ExprKind::Ternary { .. } => self.ternary_wrap_doc(expr, ParenStyle::IfBroken, trailing),
            _ => {
                let mut parts = vec![self.expr_doc(expr, 0)];
                if let Some(comment) = &expr.trailing {
                    parts.push(Doc::text(self.trailing_text(comment)));
                }
                parts.push(self.opt_trailing(trailing));
                Doc::concat(parts)
            }
        }
    }

    /// An `if`/`elif`/`while` condition: a breaking condition is wrapped
    /// in parentheses unless it is a collection literal, which hugs its
    /// own brackets.
    fn condition_doc(&self, expr: &Expr) -> Doc {
        match &expr.kind {
            ExprKind::Array { .. } | ExprKind::Dictionary { .. } => self.expr_doc(expr, 0),
            ExprKind::Binary { .. } => self.chain_wrap_doc(expr, ParenStyle::IfBroken, None),
            ExprKind::Ternary { .. } => self.ternary_wrap_doc(expr, ParenStyle::IfBroken, None),
            _ => {
                let inner = self.expr_doc(expr, 0);
                Doc::group(
                    GroupMode::Fit,
                    Doc::concat(vec![
                        Doc::if_broken(Doc::text("("), Doc::Nil),
                        Doc::indent(
                            self.block_indent(),
                            Doc::concat(vec![Doc::SoftBreak, inner]),
                        ),
                        Doc::SoftBreak,
                        Doc::if_broken(Doc::text(")"), Doc::Nil),
                    ]),
                )
            }
        }
    }

    /// A collection element, call argument, or dictionary value: binary
    /// chains and ternaries wrap in parentheses when they break, other
    /// expressions render plainly.
    fn element_doc(&self, expr: &Expr) -> Doc {
        match &expr.kind {
            ExprKind::Binary { .. } => self.chain_wrap_doc(expr, ParenStyle::IfBroken, None),
            ExprKind::Ternary { .. } => self.ternary_wrap_doc(expr, ParenStyle::IfBroken, None),
            _ => self.expr_doc(expr, 0),
        }
    }

    // --- binary chains and ternaries ---------------------------------------

    /// Flatten a binary expression into the operands and operators of its
    /// equal-precedence left spine.
    fn flatten_chain<'e>(&self, expr: &'e Expr) -> (Vec<&'e Expr>, Vec<BinaryOp>) {
        fn walk<'e>(
            expr: &'e Expr,
            prec: u8,
            operands: &mut Vec<&'e Expr>,
            ops: &mut Vec<BinaryOp>,
        ) {
            match &expr.kind {
                // Interior spine nodes with their own comments stay
                // intact so no comment slot is lost.
                ExprKind::Binary { op, lhs, rhs }
                    if op.precedence() == prec
                        && expr.leading.is_empty()
                        && expr.trailing.is_none() =>
                {
                    walk(lhs, prec, operands, ops);
                    ops.push(*op);
                    operands.push(rhs);
                }
                _ => operands.push(expr),
            }
        }

        let ExprKind::Binary { op, lhs, rhs } = &expr.kind else {
            return (vec![expr], Vec::new());
        };
        let prec = op.precedence();
        let mut operands = Vec::new();
        let mut ops = Vec::new();
        walk(lhs, prec, &mut operands, &mut ops);
        ops.push(*op);
        operands.push(rhs);
        (operands, ops)
    }

    /// A binary chain that breaks with the operator leading each
    /// continuation line, inside wrap parentheses.
    fn chain_wrap_doc(
        &self,
        expr: &Expr,
        parens: ParenStyle,
        stmt_trailing: Option<&InlineComment>,
    ) -> Doc {
        let ExprKind::Binary { op, .. } = &expr.kind else {
            return self.expr_doc(expr, 0);
        };
        let prec = op.precedence();
        let (operands, ops) = self.flatten_chain(expr);

        let mut has_comments = expr.trailing.is_some() || stmt_trailing.is_some();
        let mut inner_parts = Vec::new();
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                inner_parts.push(Doc::Line);
                inner_parts.push(Doc::text(format!("{} ", ops[i - 1].text())));
            }
            let min = if i == 0 { prec } else { prec + 1 };
            inner_parts.push(self.expr_doc(operand, min));
            if let Some(comment) = &operand.trailing {
                inner_parts.push(Doc::text(self.trailing_text(comment)));
                has_comments = true;
            }
            if !operand.leading.is_empty() {
                has_comments = true;
            }
        }
        let inner_mode = if has_comments {
            GroupMode::Broken
        } else {
            GroupMode::FitContent
        };

        let mut indented = vec![Doc::SoftBreak, Doc::group(inner_mode, Doc::concat(inner_parts))];
        if let Some(comment) = &expr.trailing {
            indented.push(Doc::text(self.trailing_text(comment)));
        }
        if let Some(comment) = stmt_trailing {
            indented.push(Doc::text(self.trailing_text(comment)));
        }

        let open = match parens {
            ParenStyle::Provided => Doc::Nil,
            ParenStyle::IfBroken => Doc::if_broken(Doc::text("("), Doc::Nil),
        };
        let close = match parens {
            ParenStyle::Provided => Doc::Nil,
            ParenStyle::IfBroken => Doc::if_broken(Doc::text(")"), Doc::Nil),
        };
        Doc::group(
            GroupMode::Fit,
            Doc::concat(vec![
                open,
                Doc::indent(self.block_indent(), Doc::concat(indented)),
                Doc::SoftBreak,
                close,
            ]),
        )
    }

    /// A ternary that breaks as `then if cond` / `else other`, inside
    /// wrap parentheses.
    fn ternary_wrap_doc(
        &self,
        expr: &Expr,
        parens: ParenStyle,
        stmt_trailing: Option<&InlineComment>,
    ) -> Doc {
        let ExprKind::Ternary { then, cond, other } = &expr.kind else {
            return self.expr_doc(expr, 0);
        };
        let has_comments = expr.trailing.is_some()
            || stmt_trailing.is_some()
            || then.trailing.is_some()
            || cond.trailing.is_some()
            || other.trailing.is_some()
            || then.has_comments()
            || cond.has_comments()
            || other.has_comments();

        let mut indented = vec![
            Doc::SoftBreak,
            self.expr_doc(then, PREC_CAST),
            Doc::text(" if "),
            self.expr_doc(cond, PREC_CAST),
        ];
        for comment in [&then.trailing, &cond.trailing].into_iter().flatten() {
            indented.push(Doc::text(self.trailing_text(comment)));
        }
        indented.push(Doc::Line);
        indented.push(Doc::text("else "));
        indented.push(self.expr_doc(other, 1));
        for comment in [&other.trailing, &expr.trailing].into_iter().flatten() {
            indented.push(Doc::text(self.trailing_text(comment)));
        }
        if let Some(comment) = stmt_trailing {
            indented.push(Doc::text(self.trailing_text(comment)));
        }

        let mode = if has_comments {
            GroupMode::Broken
        } else {
            GroupMode::Fit
        };
        let open = match parens {
            ParenStyle::Provided => Doc::Nil,
            ParenStyle::IfBroken => Doc::if_broken(Doc::text("("), Doc::Nil),
        };
        let close = match parens {
            ParenStyle::Provided => Doc::Nil,
            ParenStyle::IfBroken => Doc::if_broken(Doc::text(")"), Doc::Nil),
        };
        Doc::group(
            mode,
            Doc::concat(vec![
                open,
                Doc::indent(self.block_indent(), Doc::concat(indented)),
                Doc::SoftBreak,
                close,
            ]),
        )
    }

    // --- expressions -------------------------------------------------------

    /// Core expression rendering. `min_prec` is the loosest precedence
    /// printable without parentheses in this position; looser children
    /// get precedence parens.
    fn expr_doc(&self, expr: &Expr, min_prec: u8) -> Doc {
        let core = match &expr.kind {
            ExprKind::Literal(literal) => Doc::text(literal.text.clone()),
            ExprKind::Identifier(name) => Doc::text(name.clone()),
            ExprKind::SelfExpr => Doc::text("self"),
            ExprKind::SuperExpr => Doc::text("super"),
            ExprKind::GetNode(text) => Doc::text(text.clone()),
            ExprKind::Preload(arg) => Doc::concat(vec![
                Doc::text("preload"),
                self.call_args_doc(std::slice::from_ref(&**arg), &[]),
            ]),
            ExprKind::Call {
                callee,
                args,
                dangling,
            } => {
                let callee_doc = self.expr_doc(callee, PREC_POSTFIX);
                // A lone collection argument hugs the call parentheses.
                let hug = args.len() == 1
                    && dangling.is_empty()
                    && matches!(
                        args[0].kind,
                        ExprKind::Array { .. } | ExprKind::Dictionary { .. }
                    );
                if hug {
                    Doc::concat(vec![
                        callee_doc,
                        Doc::text("("),
                        self.element_doc(&args[0]),
                        Doc::text(")"),
                    ])
                } else {
                    Doc::concat(vec![callee_doc, self.call_args_doc(args, dangling)])
                }
            }
            ExprKind::Attribute { base, name } => Doc::concat(vec![
                self.expr_doc(base, PREC_POSTFIX),
                Doc::text(format!(".{name}")),
            ]),
            ExprKind::Subscript { base, index } => {
                let items = vec![self.element_item(index)];
                Doc::concat(vec![
                    self.expr_doc(base, PREC_POSTFIX),
                    self.list_doc(
                        "[",
                        "]",
                        items,
                        &[],
                        ListOpts {
                            trailing_comma: false,
                            pad_flat: false,
                        },
                    ),
                ])
            }
            ExprKind::Unary { op, operand } => {
                let doc = Doc::concat(vec![
                    Doc::text(op.text()),
                    self.expr_doc(operand, PREC_UNARY),
                ]);
                if PREC_UNARY < min_prec {
                    self.precedence_paren(doc)
                } else {
                    doc
                }
            }
            ExprKind::Await(operand) => {
                let doc = Doc::concat(vec![
                    Doc::text("await "),
                    self.expr_doc(operand, PREC_UNARY),
                ]);
                if PREC_UNARY < min_prec {
                    self.precedence_paren(doc)
                } else {
                    doc
                }
            }
            ExprKind::Binary { op, .. } => {
                if op.precedence() < min_prec {
                    self.precedence_paren(self.chain_wrap_doc(expr, ParenStyle::Provided, None))
                } else {
                    self.chain_wrap_doc(expr, ParenStyle::Provided, None)
                }
            }
            ExprKind::Ternary { .. } => {
                if 1 < min_prec {
                    self.precedence_paren(self.ternary_wrap_doc(expr, ParenStyle::Provided, None))
                } else {
                    self.ternary_wrap_doc(expr, ParenStyle::Provided, None)
                }
            }
            ExprKind::Cast { value, ty } => {
                let doc = Doc::concat(vec![
                    self.expr_doc(value, PREC_CAST),
                    Doc::text(format!(" as {}", self.type_text(ty))),
                ]);
                if PREC_CAST < min_prec {
                    self.precedence_paren(doc)
                } else {
                    doc
                }
            }
            ExprKind::Array { elements, dangling } => self.list_doc(
                "[",
                "]",
                self.element_items(elements),
                dangling,
                ListOpts {
                    trailing_comma: true,
                    pad_flat: false,
                },
            ),
            ExprKind::Dictionary { entries, dangling } => {
                let items = entries
                    .iter()
                    .map(|entry| {
                        let sep = match entry.style {
                            DictKeyStyle::Colon => ": ",
                            DictKeyStyle::Lua => " = ",
                        };
                        let value = self.element_item(&entry.value);
                        ItemDoc {
                            doc: Doc::concat(vec![
                                self.expr_doc(&entry.key, 0),
                                Doc::text(sep),
                                value.doc,
                            ]),
                            trailing: value.trailing,
                        }
                    })
                    .collect();
                self.list_doc(
                    "{",
                    "}",
                    items,
                    dangling,
                    ListOpts {
                        trailing_comma: true,
                        pad_flat: false,
                    },
                )
            }
            ExprKind::Lambda {
                params,
                return_ty,
                body,
            } => {
                let mut parts = vec![Doc::text("func"), self.param_list_doc(params, &[])];
                if let Some(ty) = return_ty {
                    parts.push(Doc::text(format!(" -> {}", self.type_text(ty))));
                }
                parts.push(Doc::text(":"));
                parts.push(Doc::HardBreak);
                parts.push(Doc::indent(1, self.suite_doc(body)));
                let doc = Doc::concat(parts);
                if min_prec > 0 {
                    self.precedence_paren(doc)
                } else {
                    doc
                }
            }
            // The normalizer removes grouping parens; render through if
            // one survives so no input is ever lost.
            ExprKind::Paren(inner) => self.precedence_paren(self.expr_doc(inner, 0)),
        };

        if expr.leading.is_empty() {
            core
        } else {
            let mut parts = Vec::new();
            for comment in &expr.leading {
                parts.push(self.comment_line_doc(comment));
                parts.push(Doc::HardBreak);
            }
            parts.push(core);
            Doc::concat(parts)
        }
    }

    /// Parentheses required by precedence: present flat or broken.
    fn precedence_paren(&self, inner: Doc) -> Doc {
        Doc::concat(vec![Doc::text("("), inner, Doc::text(")")])
    }

    /// Build a list item for an element expression. Binary chains and
    /// ternaries place the element's trailing comment themselves (inside
    /// their wrap parens); everything else leaves it to the list, where
    /// it lands after the element's comma.
    fn element_item(&self, element: &Expr) -> ItemDoc {
        let internal = matches!(
            element.kind,
            ExprKind::Binary { .. } | ExprKind::Ternary { .. }
        );
        ItemDoc {
            doc: if internal {
                match &element.kind {
                    ExprKind::Binary { .. } => {
                        self.chain_wrap_doc(element, ParenStyle::IfBroken, None)
                    }
                    _ => self.ternary_wrap_doc(element, ParenStyle::IfBroken, None),
                }
            } else {
                self.element_doc(element)
            },
            trailing: if internal {
                None
            } else {
                element.trailing.as_ref().map(|c| self.trailing_text(c))
            },
        }
    }

    fn element_items(&self, elements: &[Expr]) -> Vec<ItemDoc> {
        elements.iter().map(|e| self.element_item(e)).collect()
    }

    fn call_args_doc(&self, args: &[Expr], dangling: &[CommentLine]) -> Doc {
        self.list_doc(
            "(",
            ")",
            self.element_items(args),
            dangling,
            ListOpts {
                trailing_comma: false,
                pad_flat: false,
            },
        )
    }

    // --- bracketed lists ---------------------------------------------------

    /// The shared three-way layout for bracketed element lists: flat,
    /// compact-broken (all elements on one continuation line, measured
    /// content-only), or expanded-broken (one element per line, with a
    /// trailing comma for collections).
    fn list_doc(
        &self,
        open: &str,
        close: &str,
        items: Vec<ItemDoc>,
        dangling: &[CommentLine],
        opts: ListOpts,
    ) -> Doc {
        if items.is_empty() && dangling.is_empty() {
            return Doc::text(format!("{open}{close}"));
        }

        let mut any_trailing = false;
        let last = items.len().saturating_sub(1);
        let mut inner_parts = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                inner_parts.push(Doc::Line);
            }
            inner_parts.push(item.doc);
            if i < last {
                inner_parts.push(Doc::text(","));
            } else if opts.trailing_comma {
                inner_parts.push(Doc::if_broken(Doc::text(","), Doc::Nil));
            }
            if let Some(comment) = item.trailing {
                inner_parts.push(Doc::text(comment));
                any_trailing = true;
            }
        }
        for comment in dangling {
            if !inner_parts.is_empty() {
                inner_parts.push(Doc::HardBreak);
            }
            inner_parts.push(self.comment_line_doc(comment));
        }

        let inner_mode = if any_trailing || !dangling.is_empty() {
            GroupMode::Broken
        } else {
            GroupMode::FitContent
        };
        let pad = || {
            if opts.pad_flat {
                Doc::if_broken(Doc::Nil, Doc::text(" "))
            } else {
                Doc::Nil
            }
        };
        Doc::group(
            GroupMode::Fit,
            Doc::concat(vec![
                Doc::text(open),
                pad(),
                Doc::indent(
                    self.block_indent(),
                    Doc::concat(vec![
                        Doc::SoftBreak,
                        Doc::group(inner_mode, Doc::concat(inner_parts)),
                    ]),
                ),
                pad(),
                Doc::SoftBreak,
                Doc::text(close),
            ]),
        )
    }
}
