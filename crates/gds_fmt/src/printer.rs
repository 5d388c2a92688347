//! Member-level printing and the blank-line policy.
//!
//! Statements and expressions render through the document engine; this
//! module walks class bodies, places annotations, and decides how many
//! blank lines separate members:
//!
//! - two before (and after) a function or inner class, and after the
//!   class header block;
//! - one after a property declaration;
//! - one between members of different kinds;
//! - otherwise up to one user blank line is preserved.

use gds_ir::ast::{
    Annotation, Class, Expr, ExprKind, HeaderKind, Member, MemberKind, VarDecl,
};
use gds_ir::{CommentLine, InlineComment};

use crate::config::{FormatConfig, TAB_MEASURE_WIDTH};
use crate::doc::{render, Doc};
use crate::layout::{normalize_comment, Layouter};

/// Member category for the blank-line policy. Plain variables and
/// property variables separate so a property forces a following blank.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum MemberSlot {
    Var,
    VarProperty,
    Const,
    Signal,
    Enum,
    FuncLike,
    Pass,
}

/// Comparison family: a property variable is still a variable when
/// deciding whether the member kind changed.
fn family(slot: MemberSlot) -> MemberSlot {
    match slot {
        MemberSlot::VarProperty => MemberSlot::Var,
        other => other,
    }
}

fn slot_of(member: &Member) -> MemberSlot {
    match &member.kind {
        MemberKind::Var(decl) if decl.property.is_some() => MemberSlot::VarProperty,
        MemberKind::Var(_) => MemberSlot::Var,
        MemberKind::Const(_) => MemberSlot::Const,
        MemberKind::Signal(_) => MemberSlot::Signal,
        MemberKind::Enum(_) => MemberSlot::Enum,
        MemberKind::Func(_) | MemberKind::Class(_) => MemberSlot::FuncLike,
        MemberKind::Pass => MemberSlot::Pass,
    }
}

pub(crate) struct Printer<'a> {
    config: &'a FormatConfig,
    layout: Layouter<'a>,
    out: String,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(config: &'a FormatConfig) -> Self {
        Printer {
            config,
            layout: Layouter::new(config),
            out: String::new(),
        }
    }

    /// Trim trailing blank lines and end with exactly one newline.
    pub(crate) fn finish(mut self) -> String {
        while self.out.ends_with("\n\n") {
            self.out.pop();
        }
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out
    }

    /// The output so far, for pass-through assembly.
    pub(crate) fn into_raw(self) -> String {
        self.out
    }

    pub(crate) fn print_class(&mut self, class: &Class, depth: u16) {
        for line in &class.header {
            for comment in &line.trivia.leading {
                self.write_comment_line(depth, comment);
            }
            let text = self.header_text(&line.kind);
            self.write_line(depth, &text, line.trivia.trailing.as_ref());
        }

        let mut prev: Option<MemberSlot> = None;
        let after_header = !class.header.is_empty();
        for member in &class.members {
            let blanks = match prev {
                None => {
                    if after_header {
                        2
                    } else {
                        0
                    }
                }
                Some(prev) => required_blanks(prev, member),
            };
            self.blank_lines(blanks);
            for comment in &member.trivia.leading {
                if comment.blank_before {
                    self.blank_lines(1);
                }
                self.write_comment_line(depth, comment);
            }
            self.print_member(member, depth);
            prev = Some(slot_of(member));
        }

        for comment in &class.footer {
            if comment.blank_before {
                self.blank_lines(1);
            }
            self.write_comment_line(depth, comment);
        }
    }

    fn print_member(&mut self, member: &Member, depth: u16) {
        let trailing = member.trivia.trailing.as_ref();
        match &member.kind {
            MemberKind::Var(decl) => {
                let doc = self.layout.var_decl_doc(decl, trailing);
                self.print_annotated(&decl.annotations, doc, depth, preload_value(decl));
            }
            MemberKind::Const(decl) => {
                let doc = self.layout.const_decl_doc(decl, trailing);
                self.print_annotated(&decl.annotations, doc, depth, false);
            }
            MemberKind::Signal(decl) => {
                let doc = self.layout.signal_doc(decl, trailing);
                self.write_doc(&doc, depth);
            }
            MemberKind::Enum(decl) => {
                let doc = self.layout.enum_doc(decl, trailing);
                self.write_doc(&doc, depth);
            }
            MemberKind::Func(decl) => {
                // Function annotations always take their own line.
                for annotation in &decl.annotations {
                    let text = self.layout.annotation_text(annotation);
                    self.write_line(depth, &text, None);
                }
                let doc = self.layout.func_doc(decl, trailing);
                self.write_doc(&doc, depth);
            }
            MemberKind::Class(inner) => {
                let text = format!("class {}:", inner.name);
                self.write_line(depth, &text, trailing);
                self.print_class(&inner.body, depth + 1);
            }
            MemberKind::Pass => {
                self.write_line(depth, "pass", trailing);
            }
        }
    }

    /// Place a declaration's annotations: argument-less annotations share
    /// the line of a declaration that renders flat (or whose breaking
    /// value is a `preload`); otherwise each annotation gets its own line
    /// above, and annotation argument lists never wrap.
    fn print_annotated(
        &mut self,
        annotations: &[Annotation],
        doc: Doc,
        depth: u16,
        value_is_preload: bool,
    ) {
        if annotations.is_empty() {
            self.write_doc(&doc, depth);
            return;
        }
        let all_bare = annotations.iter().all(Annotation::is_bare);
        if all_bare {
            let prefix = annotations
                .iter()
                .map(|a| self.layout.annotation_text(a))
                .collect::<Vec<_>>()
                .join(" ");
            let prefixed = Doc::concat(vec![Doc::text(format!("{prefix} ")), doc.clone()]);
            let rendered = render(&prefixed, depth, self.config);
            let flat = !rendered.contains('\n');
            let fits = line_width(rendered.lines().next().unwrap_or(""))
                <= self.config.line_length_maximum;
            if (flat && fits) || (!flat && value_is_preload) {
                self.out.push_str(&rendered);
                self.out.push('\n');
                return;
            }
        }
        for annotation in annotations {
            let text = self.layout.annotation_text(annotation);
            self.write_line(depth, &text, None);
        }
        self.write_doc(&doc, depth);
    }

    fn header_text(&self, kind: &HeaderKind) -> String {
        match kind {
            HeaderKind::Tool(annotation) | HeaderKind::Icon(annotation) => {
                self.layout.annotation_text(annotation)
            }
            HeaderKind::ClassName(name) => format!("class_name {name}"),
            HeaderKind::Extends(base) => format!("extends {}", self.layout.expr_text(base)),
        }
    }

    // --- low-level emission ------------------------------------------------

    fn write_doc(&mut self, doc: &Doc, depth: u16) {
        self.out.push_str(&render(doc, depth, self.config));
        self.out.push('\n');
    }

    fn write_line(&mut self, depth: u16, text: &str, trailing: Option<&InlineComment>) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        if let Some(comment) = trailing {
            self.out.push(' ');
            self.out.push_str(&normalize_comment(&comment.text));
        }
        self.out.push('\n');
    }

    fn write_comment_line(&mut self, depth: u16, comment: &CommentLine) {
        if comment.disabled {
            self.out.push_str(&comment.text);
            self.out.push('\n');
        } else {
            self.write_line_plain(depth, &normalize_comment(&comment.text));
        }
    }

    fn write_line_plain(&mut self, depth: u16, text: &str) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank_lines(&mut self, count: usize) {
        for _ in 0..count {
            self.out.push('\n');
        }
    }
}

fn preload_value(decl: &VarDecl) -> bool {
    matches!(
        decl.value,
        Some(Expr {
            kind: ExprKind::Preload(_),
            ..
        })
    )
}

fn required_blanks(prev: MemberSlot, member: &Member) -> usize {
    let slot = slot_of(member);
    if slot == MemberSlot::FuncLike || prev == MemberSlot::FuncLike {
        2
    } else if prev == MemberSlot::VarProperty {
        1
    } else if family(prev) != family(slot) {
        1
    } else if member.trivia.blank_before {
        1
    } else {
        0
    }
}

/// Width of a physical line: leading tabs measure four columns each.
fn line_width(line: &str) -> usize {
    let tabs = line.chars().take_while(|&c| c == '\t').count();
    tabs * TAB_MEASURE_WIDTH + line.chars().skip(tabs).count()
}
