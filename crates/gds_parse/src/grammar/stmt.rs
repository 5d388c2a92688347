//! Statement and suite parsing.
//!
//! Suites collect their own line trivia: stand-alone comments become the
//! leading comments of the statement that follows, comments left over at
//! the dedent split into suite footer (column at or beyond the suite) and
//! comments carried to the parent (shallower column — a dedented comment
//! between an `if` body and its `else`, or one that belongs to the next
//! sibling statement).
//!
//! `match` arms run a small state machine — expecting pattern, expecting
//! `:`, expecting an indented body, back on dedent — and a failure in an
//! arm head is recoverable: the whole arm region is passed through
//! verbatim from the newline after the `match` header.

use gds_ir::ast::{
    ElseBranch, IfBranch, IfStmt, MatchArm, Pattern, Stmt, StmtKind, Suite, Trivia,
};
use gds_ir::{CommentLine, ParseError, ParseErrorKind, TokenKind};
use tracing::trace;

use crate::parser::Parser;

/// Build a construct's trivia from collected leading comments and the
/// blank flag; a blank above the first comment is promoted to the
/// construct itself.
pub(crate) fn make_trivia(mut leading: Vec<CommentLine>, blank: bool) -> Trivia {
    let blank_before = leading.first().map_or(blank, |c| c.blank_before);
    if let Some(first) = leading.first_mut() {
        first.blank_before = false;
    }
    Trivia {
        leading,
        trailing: None,
        blank_before,
    }
}

impl Parser<'_> {
    /// Parse statements until the suite dedents. The cursor must already
    /// be past the opening `Indent`; `self.depth` is this suite's depth.
    pub(crate) fn parse_suite(&mut self) -> Result<Suite, ParseError> {
        let depth = self.depth;
        let mut suite = Suite::new();
        loop {
            self.reclaim_carried();
            let blank = self.collect_line_trivia();
            if self.truncated() {
                break;
            }
            match self.cursor.kind() {
                TokenKind::Dedent => {
                    suite.footer = self.split_footer(depth);
                    self.carried_blank = self.carried_blank || blank;
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => {
                    suite.footer = self.split_footer(depth);
                    self.carried_blank = self.carried_blank || blank;
                    break;
                }
                _ => {
                    let leading = self.drain_pending(depth);
                    let mut stmt = self.parse_statement()?;
                    let trailing = stmt.trivia.trailing.take();
                    stmt.trivia = make_trivia(leading, blank);
                    stmt.trivia.trailing = trailing;
                    suite.statements.push(stmt);
                    if self.truncated() {
                        break;
                    }
                }
            }
        }
        Ok(suite)
    }

    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        trace!("parse_statement");
        match self.cursor.kind() {
            TokenKind::Var => {
                let (decl, trailing) = self.parse_var_decl(Vec::new())?;
                let mut stmt = Stmt::new(StmtKind::Var(decl));
                stmt.trivia.trailing = trailing;
                Ok(stmt)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.at_line_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.finish_simple(StmtKind::Return(value))
            }
            TokenKind::Pass => {
                self.cursor.advance();
                self.finish_simple(StmtKind::Pass)
            }
            TokenKind::Break => {
                self.cursor.advance();
                self.finish_simple(StmtKind::Break)
            }
            TokenKind::Continue => {
                self.cursor.advance();
                self.finish_simple(StmtKind::Continue)
            }
            TokenKind::Breakpoint => {
                self.cursor.advance();
                self.finish_simple(StmtKind::Breakpoint)
            }
            TokenKind::Assert => self.parse_assert(),
            _ => self.parse_expr_statement(),
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(
            self.cursor.kind(),
            TokenKind::Newline { .. }
                | TokenKind::Comment { own_line: false }
                | TokenKind::Semicolon
                | TokenKind::Eof
        )
    }

    fn finish_simple(&mut self, kind: StmtKind) -> Result<Stmt, ParseError> {
        let trailing = self.end_statement()?;
        let mut stmt = Stmt::new(kind);
        stmt.trivia.trailing = trailing;
        Ok(stmt)
    }

    /// A suite one level deeper than the current one.
    pub(crate) fn parse_nested_suite(&mut self, context: &str) -> Result<Suite, ParseError> {
        self.expect_block_start(context)?;
        self.depth += 1;
        let suite = self.parse_suite();
        self.depth -= 1;
        suite
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::If, "`if`")?;
        let condition = self.parse_expr()?;
        self.cursor.expect(TokenKind::Colon, "`:` after `if` condition")?;
        let trailing = self.take_trailing();
        let body = self.parse_nested_suite("an `if` statement")?;
        let if_branch = IfBranch {
            condition,
            body,
            trivia: Trivia::new(),
        };

        let mut elif_branches = Vec::new();
        let mut else_branch = None;
        loop {
            // Comments dedented out of the previous body wait in
            // `carried`; they belong to the `elif`/`else` line if one
            // follows, otherwise to the next sibling statement.
            match self.cursor.kind() {
                TokenKind::Elif => {
                    self.reclaim_carried();
                    // Blank lines cannot separate a branch from its chain.
                    self.carried_blank = false;
                    let leading = self.drain_pending(self.depth);
                    self.cursor.advance();
                    let condition = self.parse_expr()?;
                    self.cursor
                        .expect(TokenKind::Colon, "`:` after `elif` condition")?;
                    let mut trivia = make_trivia(leading, false);
                    trivia.trailing = self.take_trailing();
                    let body = self.parse_nested_suite("an `elif` branch")?;
                    elif_branches.push(IfBranch {
                        condition,
                        body,
                        trivia,
                    });
                }
                TokenKind::Else => {
                    self.reclaim_carried();
                    self.carried_blank = false;
                    let leading = self.drain_pending(self.depth);
                    self.cursor.advance();
                    self.cursor.expect(TokenKind::Colon, "`:` after `else`")?;
                    let mut trivia = make_trivia(leading, false);
                    trivia.trailing = self.take_trailing();
                    let body = self.parse_nested_suite("an `else` branch")?;
                    else_branch = Some(ElseBranch { body, trivia });
                    break;
                }
                _ => break,
            }
        }

        let mut stmt = Stmt::new(StmtKind::If(IfStmt {
            if_branch,
            elif_branches,
            else_branch,
        }));
        stmt.trivia.trailing = trailing;
        Ok(stmt)
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::While, "`while`")?;
        let condition = self.parse_expr()?;
        self.cursor
            .expect(TokenKind::Colon, "`:` after `while` condition")?;
        let trailing = self.take_trailing();
        let body = self.parse_nested_suite("a `while` statement")?;
        let mut stmt = Stmt::new(StmtKind::While { condition, body });
        stmt.trivia.trailing = trailing;
        Ok(stmt)
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::For, "`for`")?;
        let binding = if self.cursor.check(TokenKind::Identifier) {
            let name = self.cursor.text().to_string();
            self.cursor.advance();
            name
        } else {
            return Err(self.cursor.unexpected("a loop variable name"));
        };
        self.cursor.expect(TokenKind::In, "`in`")?;
        let iterable = self.parse_expr()?;
        self.cursor
            .expect(TokenKind::Colon, "`:` after `for` iterable")?;
        let trailing = self.take_trailing();
        let body = self.parse_nested_suite("a `for` statement")?;
        let mut stmt = Stmt::new(StmtKind::For {
            binding,
            iterable,
            body,
        });
        stmt.trivia.trailing = trailing;
        Ok(stmt)
    }

    fn parse_assert(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::Assert, "`assert`")?;
        self.cursor.expect(TokenKind::LParen, "`(` after `assert`")?;
        self.bracket_depth += 1;
        self.skip_expr_trivia();
        let condition = self.parse_expr()?;
        self.skip_expr_trivia();
        let message = if self.cursor.eat(TokenKind::Comma) {
            self.skip_expr_trivia();
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.skip_expr_trivia();
        self.cursor.expect(TokenKind::RParen, "`)`")?;
        self.bracket_depth -= 1;
        self.finish_simple(StmtKind::Assert { condition, message })
    }

    fn parse_expr_statement(&mut self) -> Result<Stmt, ParseError> {
        let target = self.parse_expr()?;
        if let Some(op) = assign_op_text(self.cursor.kind()) {
            self.cursor.advance();
            let value = self.parse_expr()?;
            return self.finish_simple(StmtKind::Assign { target, op, value });
        }
        self.finish_simple(StmtKind::Expr(target))
    }

    // --- match ------------------------------------------------------------

    fn parse_match(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.expect(TokenKind::Match, "`match`")?;
        let subject = self.parse_expr()?;
        self.cursor
            .expect(TokenKind::Colon, "`:` after `match` subject")?;
        let trailing = self.take_trailing();

        // Anchor for pass-through recovery: everything from the newline
        // after the header is emitted verbatim when an arm is malformed.
        let anchor = self.cursor.span().start;
        if let Err(err) = self.expect_block_start("a `match` statement") {
            if err.kind == ParseErrorKind::TruncatedConstruct {
                self.tail = Some(anchor);
                let mut stmt = Stmt::new(StmtKind::Match {
                    subject,
                    arms: Vec::new(),
                });
                stmt.trivia.trailing = trailing;
                return Ok(stmt);
            }
            return Err(err);
        }

        self.depth += 1;
        let arms = self.parse_match_arms(anchor);
        self.depth -= 1;
        let arms = arms?;

        let mut stmt = Stmt::new(StmtKind::Match { subject, arms });
        stmt.trivia.trailing = trailing;
        Ok(stmt)
    }

    fn parse_match_arms(&mut self, anchor: u32) -> Result<Vec<MatchArm>, ParseError> {
        let depth = self.depth;
        let mut arms: Vec<MatchArm> = Vec::new();
        loop {
            self.reclaim_carried();
            let blank = self.collect_line_trivia();
            if self.truncated() {
                break;
            }
            match self.cursor.kind() {
                TokenKind::Dedent => {
                    let footer = self.split_footer(depth);
                    if let Some(last) = arms.last_mut() {
                        last.body.footer.extend(footer);
                    }
                    self.carried_blank = self.carried_blank || blank;
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => {
                    let footer = self.split_footer(depth);
                    if let Some(last) = arms.last_mut() {
                        last.body.footer.extend(footer);
                    }
                    self.carried_blank = self.carried_blank || blank;
                    break;
                }
                _ => {
                    let leading = self.drain_pending(depth);
                    match self.parse_match_arm(make_trivia(leading, blank)) {
                        Ok(arm) => arms.push(arm),
                        Err(err)
                            if matches!(
                                err.kind,
                                ParseErrorKind::UnexpectedToken
                                    | ParseErrorKind::TruncatedConstruct
                            ) =>
                        {
                            // Malformed arm: keep the match header in the
                            // tree and pass the arm region through.
                            self.tail = Some(anchor);
                            arms.clear();
                            break;
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }
        Ok(arms)
    }

    /// One arm: pattern list, `:`, indented body.
    fn parse_match_arm(&mut self, mut trivia: Trivia) -> Result<MatchArm, ParseError> {
        let mut patterns = vec![self.parse_pattern()?];
        while self.cursor.eat(TokenKind::Comma) {
            patterns.push(self.parse_pattern()?);
        }
        self.cursor
            .expect(TokenKind::Colon, "`:` after a match pattern")?;
        trivia.trailing = self.take_trailing();
        let body = self.parse_nested_suite("a match arm")?;
        Ok(MatchArm {
            patterns,
            body,
            trivia,
        })
    }

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        match self.cursor.kind() {
            TokenKind::Identifier if self.cursor.text() == "_" => {
                self.cursor.advance();
                Ok(Pattern::Wildcard)
            }
            TokenKind::Var => {
                self.cursor.advance();
                if self.cursor.check(TokenKind::Identifier) {
                    let name = self.cursor.text().to_string();
                    self.cursor.advance();
                    Ok(Pattern::Binding(name))
                } else {
                    Err(self.cursor.unexpected("a binding name after `var`"))
                }
            }
            TokenKind::LBracket => {
                self.cursor.advance();
                self.bracket_depth += 1;
                let mut elements = Vec::new();
                let mut open_ended = false;
                loop {
                    self.skip_expr_trivia();
                    if self.cursor.check(TokenKind::RBracket) {
                        self.cursor.advance();
                        break;
                    }
                    if self.cursor.eat(TokenKind::DotDot) {
                        open_ended = true;
                    } else {
                        elements.push(self.parse_pattern()?);
                    }
                    self.skip_expr_trivia();
                    if !self.cursor.eat(TokenKind::Comma) {
                        self.cursor.expect(TokenKind::RBracket, "`,` or `]`")?;
                        break;
                    }
                }
                self.bracket_depth -= 1;
                Ok(Pattern::Array {
                    elements,
                    open_ended,
                })
            }
            TokenKind::LBrace => {
                self.cursor.advance();
                self.bracket_depth += 1;
                let mut entries = Vec::new();
                let mut open_ended = false;
                loop {
                    self.skip_expr_trivia();
                    if self.cursor.check(TokenKind::RBrace) {
                        self.cursor.advance();
                        break;
                    }
                    if self.cursor.eat(TokenKind::DotDot) {
                        open_ended = true;
                    } else {
                        let key = self.parse_expr()?;
                        let value = if self.cursor.eat(TokenKind::Colon) {
                            Some(self.parse_pattern()?)
                        } else {
                            None
                        };
                        entries.push((key, value));
                    }
                    self.skip_expr_trivia();
                    if !self.cursor.eat(TokenKind::Comma) {
                        self.cursor.expect(TokenKind::RBrace, "`,` or `}`")?;
                        break;
                    }
                }
                self.bracket_depth -= 1;
                Ok(Pattern::Dictionary {
                    entries,
                    open_ended,
                })
            }
            _ => Ok(Pattern::Value(self.parse_expr()?)),
        }
    }
}

fn assign_op_text(kind: TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Eq => Some("="),
        TokenKind::PlusEq => Some("+="),
        TokenKind::MinusEq => Some("-="),
        TokenKind::StarEq => Some("*="),
        TokenKind::SlashEq => Some("/="),
        TokenKind::PercentEq => Some("%="),
        TokenKind::AmpEq => Some("&="),
        TokenKind::PipeEq => Some("|="),
        TokenKind::CaretEq => Some("^="),
        TokenKind::ShlEq => Some("<<="),
        TokenKind::ShrEq => Some(">>="),
        _ => None,
    }
}
