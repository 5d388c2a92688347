//! Document primitives and the best-fit renderer.
//!
//! The layouter translates the tree into this small algebra; the renderer
//! walks it with an explicit work stack, deciding for each group whether
//! to render flat or broken. A group fits flat when its bottom-up flat
//! width added to the current column stays within the line budget; nested
//! groups decide independently, so an outer group can break while an
//! inner one stays flat.
//!
//! Indentation is emitted lazily: a break only records the pending level,
//! and the tabs are written when the next text arrives. Blank lines and
//! verbatim lines therefore never carry trailing tabs.

use crate::config::{FormatConfig, TAB_MEASURE_WIDTH};

/// A layout document.
#[derive(Clone, Debug)]
pub(crate) enum Doc {
    Nil,
    Text(String),
    /// Nothing when flat, a newline when broken.
    SoftBreak,
    /// A space when flat, a newline when broken.
    Line,
    /// Always a newline.
    HardBreak,
    /// A line reproduced byte for byte at column zero (disabled-code
    /// comments keep their original leading whitespace this way).
    Verbatim(String),
    /// Additional indentation levels for the child's broken lines.
    Indent(u16, Box<Doc>),
    Group(GroupMode, Box<Doc>),
    /// First alternative when the enclosing group broke, second when it
    /// stayed flat.
    IfBroken(Box<Doc>, Box<Doc>),
    Concat(Vec<Doc>),
}

/// How a group decides between flat and broken.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum GroupMode {
    /// Flat iff current column + flat width fits the budget.
    Fit,
    /// Flat iff the flat width alone fits the budget, ignoring the
    /// current column. Used for the compact continuation line of a
    /// broken collection, which the original measures content-only.
    FitContent,
    /// Always broken (comment-frozen constructs).
    Broken,
}

impl Doc {
    pub(crate) fn text(s: impl Into<String>) -> Doc {
        Doc::Text(s.into())
    }

    pub(crate) fn concat(parts: Vec<Doc>) -> Doc {
        Doc::Concat(parts)
    }

    pub(crate) fn group(mode: GroupMode, doc: Doc) -> Doc {
        Doc::Group(mode, Box::new(doc))
    }

    pub(crate) fn indent(levels: u16, doc: Doc) -> Doc {
        Doc::Indent(levels, Box::new(doc))
    }

    pub(crate) fn if_broken(broken: Doc, flat: Doc) -> Doc {
        Doc::IfBroken(Box::new(broken), Box::new(flat))
    }

    /// Flat width in measuring columns; `None` when the document cannot
    /// render flat (it contains a hard break or a forced group).
    pub(crate) fn flat_width(&self) -> Option<usize> {
        match self {
            Doc::Nil => Some(0),
            Doc::Text(s) => Some(s.chars().count()),
            Doc::SoftBreak => Some(0),
            Doc::Line => Some(1),
            Doc::HardBreak | Doc::Verbatim(_) => None,
            Doc::Indent(_, child) => child.flat_width(),
            Doc::Group(GroupMode::Broken, _) => None,
            Doc::Group(_, child) => child.flat_width(),
            Doc::IfBroken(_, flat) => flat.flat_width(),
            Doc::Concat(parts) => {
                let mut total = 0;
                for part in parts {
                    total += part.flat_width()?;
                }
                Some(total)
            }
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Mode {
    Flat,
    Break,
}

/// Render a document starting at `indent` levels.
///
/// The first line's indentation is included. All output line endings are
/// `\n` and indentation is one tab per level.
pub(crate) fn render(doc: &Doc, indent: u16, config: &FormatConfig) -> String {
    let mut out = String::new();
    let mut column = indent as usize * TAB_MEASURE_WIDTH;
    let mut pending: Option<u16> = Some(indent);

    let mut stack: Vec<(u16, Mode, &Doc)> = vec![(indent, Mode::Break, doc)];
    while let Some((indent, mode, doc)) = stack.pop() {
        match doc {
            Doc::Nil => {}
            Doc::Text(s) => {
                if let Some(levels) = pending.take() {
                    for _ in 0..levels {
                        out.push('\t');
                    }
                    column = levels as usize * TAB_MEASURE_WIDTH;
                }
                out.push_str(s);
                column += s.chars().count();
            }
            Doc::SoftBreak => {
                if mode == Mode::Break {
                    out.push('\n');
                    pending = Some(indent);
                    column = indent as usize * TAB_MEASURE_WIDTH;
                }
            }
            Doc::Line => {
                if mode == Mode::Break {
                    out.push('\n');
                    pending = Some(indent);
                    column = indent as usize * TAB_MEASURE_WIDTH;
                } else {
                    if let Some(levels) = pending.take() {
                        for _ in 0..levels {
                            out.push('\t');
                        }
                        column = levels as usize * TAB_MEASURE_WIDTH;
                    }
                    out.push(' ');
                    column += 1;
                }
            }
            Doc::HardBreak => {
                out.push('\n');
                pending = Some(indent);
                column = indent as usize * TAB_MEASURE_WIDTH;
            }
            Doc::Verbatim(line) => {
                pending = None;
                out.push_str(line);
                column = line.chars().count();
            }
            Doc::Indent(levels, child) => {
                stack.push((indent + levels, mode, child.as_ref()));
            }
            Doc::Group(group_mode, child) => {
                let broken = match group_mode {
                    GroupMode::Broken => true,
                    GroupMode::Fit => child
                        .flat_width()
                        .map_or(true, |w| column + w > config.line_length_maximum),
                    GroupMode::FitContent => child
                        .flat_width()
                        .map_or(true, |w| w > config.line_length_maximum),
                };
                let mode = if broken { Mode::Break } else { Mode::Flat };
                stack.push((indent, mode, child.as_ref()));
            }
            Doc::IfBroken(broken, flat) => {
                let chosen = if mode == Mode::Break { broken } else { flat };
                stack.push((indent, mode, chosen.as_ref()));
            }
            Doc::Concat(parts) => {
                for part in parts.iter().rev() {
                    stack.push((indent, mode, part));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(limit: usize) -> FormatConfig {
        FormatConfig {
            line_length_maximum: limit,
            indent_in_multiline_block: 1,
        }
    }

    fn list(items: &[&str]) -> Doc {
        let mut inner = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                inner.push(Doc::text(","));
                inner.push(Doc::Line);
            }
            inner.push(Doc::text(*item));
        }
        inner.push(Doc::if_broken(Doc::text(","), Doc::Nil));
        Doc::group(
            GroupMode::Fit,
            Doc::concat(vec![
                Doc::text("["),
                Doc::indent(
                    1,
                    Doc::concat(vec![
                        Doc::SoftBreak,
                        Doc::group(GroupMode::FitContent, Doc::concat(inner)),
                    ]),
                ),
                Doc::SoftBreak,
                Doc::text("]"),
            ]),
        )
    }

    #[test]
    fn test_render_flat_group() {
        let doc = list(&["0", "1", "2"]);
        assert_eq!(render(&doc, 0, &config(100)), "[0, 1, 2]");
    }

    #[test]
    fn test_render_compact_broken() {
        // The outer group breaks, the inner one still fits its content.
        let doc = list(&["aaaa", "bbbb", "cccc"]);
        assert_eq!(
            render(&doc, 0, &config(17)),
            "[\n\taaaa, bbbb, cccc\n]"
        );
    }

    #[test]
    fn test_render_expanded_broken() {
        let doc = list(&["aaaaaaaa", "bbbbbbbb"]);
        assert_eq!(
            render(&doc, 0, &config(10)),
            "[\n\taaaaaaaa,\n\tbbbbbbbb,\n]"
        );
    }

    #[test]
    fn test_render_hard_break_forces_group() {
        let doc = Doc::group(
            GroupMode::Fit,
            Doc::concat(vec![Doc::text("("), Doc::HardBreak, Doc::text(")")]),
        );
        assert_eq!(render(&doc, 0, &config(100)), "(\n)");
    }

    #[test]
    fn test_render_indent_emits_tabs() {
        let doc = Doc::concat(vec![
            Doc::text("a:"),
            Doc::indent(1, Doc::concat(vec![Doc::HardBreak, Doc::text("b")])),
        ]);
        assert_eq!(render(&doc, 1, &config(100)), "\ta:\n\t\tb");
    }

    #[test]
    fn test_render_blank_line_has_no_tabs() {
        let doc = Doc::concat(vec![
            Doc::text("a"),
            Doc::HardBreak,
            Doc::HardBreak,
            Doc::text("b"),
        ]);
        assert_eq!(render(&doc, 1, &config(100)), "\ta\n\n\tb");
    }

    #[test]
    fn test_render_verbatim_ignores_indent() {
        let doc = Doc::concat(vec![
            Doc::text("a"),
            Doc::HardBreak,
            Doc::Verbatim("#\tdisabled".into()),
            Doc::HardBreak,
            Doc::text("b"),
        ]);
        assert_eq!(render(&doc, 2, &config(100)), "\t\ta\n#\tdisabled\n\t\tb");
    }

    #[test]
    fn test_flat_width() {
        assert_eq!(Doc::text("abcd").flat_width(), Some(4));
        assert_eq!(Doc::HardBreak.flat_width(), None);
        assert_eq!(
            Doc::concat(vec![Doc::text("ab"), Doc::Line, Doc::text("cd")]).flat_width(),
            Some(5)
        );
        assert_eq!(
            Doc::group(GroupMode::Broken, Doc::text("x")).flat_width(),
            None
        );
    }

    #[test]
    fn test_content_only_fit_ignores_column() {
        // Inner content is exactly the limit: fits content-only even
        // though indentation pushes the physical line past it.
        let inner = Doc::group(GroupMode::FitContent, Doc::text("x".repeat(20)));
        let doc = Doc::group(
            GroupMode::Fit,
            Doc::concat(vec![
                Doc::text("["),
                Doc::indent(1, Doc::concat(vec![Doc::SoftBreak, inner])),
                Doc::SoftBreak,
                Doc::text("]"),
            ]),
        );
        let out = render(&doc, 2, &config(20));
        assert_eq!(out, "\t\t[\n\t\t\txxxxxxxxxxxxxxxxxxxx\n\t\t]");
    }
}
