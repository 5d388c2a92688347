//! Expression parsing: precedence climbing over the fixed operator table.
//!
//! Tightest to loosest: member/subscript/call; unary; `* / %`; `+ -`;
//! `<< >>`; `&`; `^`; `|`; comparisons and `in`/`is`; `and`; `or`; `as`;
//! `if … else`.
//!
//! Inside brackets the parser attaches same-line comments to the operand
//! that ends the line and stashes stand-alone comments as the leading
//! comments of the next element; at statement level those comments belong
//! to the statement and are left alone here.

use gds_ir::ast::{
    Annotation, BinaryOp, DictEntry, DictKeyStyle, Expr, ExprKind, Literal, LiteralKind,
    Parameter, TypeRef, UnaryOp,
};
use gds_ir::{CommentLine, ParseError, TokenKind};
use tracing::trace;

use crate::parser::Parser;

impl Parser<'_> {
    /// Parse a full expression (ternary level).
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        trace!("parse_expr");
        let then = self.parse_cast()?;
        if self.cursor.check(TokenKind::If) {
            self.cursor.advance();
            self.skip_expr_trivia();
            let cond = self.parse_cast()?;
            self.skip_expr_trivia();
            self.cursor.expect(TokenKind::Else, "`else` in ternary")?;
            self.skip_expr_trivia();
            let other = self.parse_expr()?;
            return Ok(Expr::new(ExprKind::Ternary {
                then: Box::new(then),
                cond: Box::new(cond),
                other: Box::new(other),
            }));
        }
        Ok(then)
    }

    /// `as` casts bind looser than every binary operator.
    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_binary(0)?;
        while self.cursor.check(TokenKind::As) {
            self.cursor.advance();
            let ty = self.parse_type_ref()?;
            expr = Expr::new(ExprKind::Cast {
                value: Box::new(expr),
                ty,
            });
            self.attach_inline_comment(&mut expr);
        }
        Ok(expr)
    }

    /// Precedence climbing over binary operators at `min_prec` or tighter.
    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_expr_trivia();
            let Some((op, extra_tokens)) = self.match_binary_op() else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            for _ in 0..=extra_tokens {
                self.cursor.advance();
            }
            self.skip_expr_trivia();
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::new(ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    /// Match the binary operator at the cursor.
    ///
    /// Returns the operator and how many tokens it spans beyond the
    /// first (`not in` is two tokens).
    fn match_binary_op(&self) -> Option<(BinaryOp, usize)> {
        let op = match self.cursor.kind() {
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Shl => BinaryOp::Shl,
            TokenKind::Shr => BinaryOp::Shr,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::In => BinaryOp::In,
            TokenKind::Is => BinaryOp::Is,
            TokenKind::And => BinaryOp::And,
            TokenKind::AmpAmp => BinaryOp::AndSym,
            TokenKind::Or => BinaryOp::Or,
            TokenKind::PipePipe => BinaryOp::OrSym,
            TokenKind::Not if self.cursor.peek_next_kind() == TokenKind::In => {
                return Some((BinaryOp::NotIn, 1));
            }
            _ => return None,
        };
        Some((op, 0))
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Bang => Some(UnaryOp::NotSym),
            _ => None,
        };
        if let Some(op) = op {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Unary {
                op,
                operand: Box::new(operand),
            }));
        }
        if self.cursor.check(TokenKind::Await) {
            self.cursor.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::new(ExprKind::Await(Box::new(operand))));
        }
        self.parse_postfix()
    }

    /// Postfix chain: member access, subscript, call.
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let name = self.expect_name("member name after `.`")?;
                    expr = Expr::new(ExprKind::Attribute {
                        base: Box::new(expr),
                        name,
                    });
                }
                TokenKind::LParen => {
                    let (args, dangling) = self.parse_call_args()?;
                    expr = Expr::new(ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                        dangling,
                    });
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    self.bracket_depth += 1;
                    self.skip_expr_trivia();
                    let mut index = self.parse_expr()?;
                    self.attach_inline_comment(&mut index);
                    self.skip_expr_trivia();
                    let stragglers = self.take_pending_leading();
                    index.leading.extend(stragglers);
                    self.cursor.expect(TokenKind::RBracket, "`]`")?;
                    self.bracket_depth -= 1;
                    expr = Expr::new(ExprKind::Subscript {
                        base: Box::new(expr),
                        index: Box::new(index),
                    });
                }
                _ => break,
            }
        }
        self.attach_inline_comment(&mut expr);
        Ok(expr)
    }

    /// Inside brackets, claim a same-line comment for the expression that
    /// just ended the line.
    fn attach_inline_comment(&mut self, expr: &mut Expr) {
        if self.bracket_depth > 0 && expr.trailing.is_none() {
            expr.trailing = self.take_trailing();
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_expr_trivia();
        let leading = self.take_pending_leading();

        let kind = match self.cursor.kind() {
            TokenKind::Int => self.literal(LiteralKind::Int),
            TokenKind::Float => self.literal(LiteralKind::Float),
            TokenKind::Str => self.literal(LiteralKind::Str),
            TokenKind::StringName => self.literal(LiteralKind::StringName),
            TokenKind::NodePath => self.literal(LiteralKind::NodePath),
            TokenKind::True | TokenKind::False => self.literal(LiteralKind::Bool),
            TokenKind::Null => self.literal(LiteralKind::Null),
            TokenKind::Identifier => {
                let name = self.cursor.text().to_string();
                self.cursor.advance();
                ExprKind::Identifier(name)
            }
            TokenKind::SelfKw => {
                self.cursor.advance();
                ExprKind::SelfExpr
            }
            TokenKind::Super => {
                self.cursor.advance();
                ExprKind::SuperExpr
            }
            TokenKind::GetNode => {
                let text = self.cursor.text().to_string();
                self.cursor.advance();
                ExprKind::GetNode(text)
            }
            TokenKind::Preload => {
                self.cursor.advance();
                self.cursor.expect(TokenKind::LParen, "`(` after `preload`")?;
                self.bracket_depth += 1;
                self.skip_expr_trivia();
                let mut arg = self.parse_expr()?;
                self.attach_inline_comment(&mut arg);
                self.skip_expr_trivia();
                let stragglers = self.take_pending_leading();
                arg.leading.extend(stragglers);
                self.cursor.expect(TokenKind::RParen, "`)`")?;
                self.bracket_depth -= 1;
                ExprKind::Preload(Box::new(arg))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                self.bracket_depth += 1;
                self.skip_expr_trivia();
                let mut inner = self.parse_expr()?;
                self.skip_expr_trivia();
                // Comments between the expression and `)` have nowhere
                // better to live than on the inner expression.
                let stragglers = self.take_pending_leading();
                inner.leading.extend(stragglers);
                self.cursor.expect(TokenKind::RParen, "`)`")?;
                self.bracket_depth -= 1;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::LBracket => self.parse_array()?,
            TokenKind::LBrace => self.parse_dictionary()?,
            TokenKind::Func => self.parse_lambda()?,
            _ => return Err(self.cursor.unexpected("an expression")),
        };

        let mut expr = Expr::new(kind);
        expr.leading = leading;
        Ok(expr)
    }

    fn literal(&mut self, kind: LiteralKind) -> ExprKind {
        let text = self.cursor.text().to_string();
        self.cursor.advance();
        ExprKind::Literal(Literal::new(kind, text))
    }

    /// Drain pending stand-alone comments as an element's leading block.
    fn take_pending_leading(&mut self) -> Vec<CommentLine> {
        let expected = self.depth + 1;
        self.drain_pending(expected)
    }

    fn expect_name(&mut self, context: &str) -> Result<String, ParseError> {
        if self.cursor.check(TokenKind::Identifier) {
            let name = self.cursor.text().to_string();
            self.cursor.advance();
            Ok(name)
        } else {
            Err(self.cursor.unexpected(context))
        }
    }

    /// `(args…)` of a call, including dangling-comment capture.
    pub(crate) fn parse_call_args(&mut self) -> Result<(Vec<Expr>, Vec<CommentLine>), ParseError> {
        self.cursor.expect(TokenKind::LParen, "`(`")?;
        self.bracket_depth += 1;
        let mut args = Vec::new();
        loop {
            self.skip_expr_trivia();
            if self.cursor.check(TokenKind::RParen) {
                let dangling = self.take_pending_leading();
                self.cursor.advance();
                self.bracket_depth -= 1;
                return Ok((args, dangling));
            }
            let mut arg = self.parse_expr()?;
            self.attach_inline_comment(&mut arg);
            self.skip_expr_trivia();
            let had_comma = self.cursor.eat(TokenKind::Comma);
            if arg.trailing.is_none() {
                arg.trailing = self.take_trailing();
            }
            args.push(arg);
            if !had_comma {
                self.skip_expr_trivia();
                let dangling = self.take_pending_leading();
                self.cursor.expect(TokenKind::RParen, "`,` or `)`")?;
                self.bracket_depth -= 1;
                return Ok((args, dangling));
            }
        }
    }

    fn parse_array(&mut self) -> Result<ExprKind, ParseError> {
        self.cursor.expect(TokenKind::LBracket, "`[`")?;
        self.bracket_depth += 1;
        let mut elements: Vec<Expr> = Vec::new();
        loop {
            self.skip_expr_trivia();
            if self.cursor.check(TokenKind::RBracket) {
                let dangling = self.take_pending_leading();
                self.cursor.advance();
                self.bracket_depth -= 1;
                return Ok(ExprKind::Array { elements, dangling });
            }
            let mut element = self.parse_expr()?;
            self.attach_inline_comment(&mut element);
            self.skip_expr_trivia();
            let had_comma = self.cursor.eat(TokenKind::Comma);
            if element.trailing.is_none() {
                element.trailing = self.take_trailing();
            }
            elements.push(element);
            if !had_comma {
                self.skip_expr_trivia();
                let dangling = self.take_pending_leading();
                self.cursor.expect(TokenKind::RBracket, "`,` or `]`")?;
                self.bracket_depth -= 1;
                return Ok(ExprKind::Array { elements, dangling });
            }
        }
    }

    fn parse_dictionary(&mut self) -> Result<ExprKind, ParseError> {
        self.cursor.expect(TokenKind::LBrace, "`{`")?;
        self.bracket_depth += 1;
        let mut entries: Vec<DictEntry> = Vec::new();
        loop {
            self.skip_expr_trivia();
            if self.cursor.check(TokenKind::RBrace) {
                let dangling = self.take_pending_leading();
                self.cursor.advance();
                self.bracket_depth -= 1;
                return Ok(ExprKind::Dictionary { entries, dangling });
            }
            let key = self.parse_expr()?;
            let style = if self.cursor.eat(TokenKind::Colon) {
                DictKeyStyle::Colon
            } else if self.cursor.eat(TokenKind::Eq) {
                DictKeyStyle::Lua
            } else {
                return Err(self.cursor.unexpected("`:` or `=` after dictionary key"));
            };
            self.skip_expr_trivia();
            let mut value = self.parse_expr()?;
            self.attach_inline_comment(&mut value);
            self.skip_expr_trivia();
            let had_comma = self.cursor.eat(TokenKind::Comma);
            if value.trailing.is_none() {
                value.trailing = self.take_trailing();
            }
            entries.push(DictEntry { key, value, style });
            if !had_comma {
                self.skip_expr_trivia();
                let dangling = self.take_pending_leading();
                self.cursor.expect(TokenKind::RBrace, "`,` or `}`")?;
                self.bracket_depth -= 1;
                return Ok(ExprKind::Dictionary { entries, dangling });
            }
        }
    }

    /// `func(params):` with an indented body.
    ///
    /// Outside brackets the body is an ordinary suite. Inside brackets
    /// depth tokens are suppressed, so the body is rebuilt from the tab
    /// depth each `Newline` token carries; only simple statements are
    /// supported there.
    fn parse_lambda(&mut self) -> Result<ExprKind, ParseError> {
        self.cursor.expect(TokenKind::Func, "`func`")?;
        let (params, _dangling) = if self.cursor.check(TokenKind::LParen) {
            self.parse_param_list()?
        } else {
            (Vec::new(), Vec::new())
        };
        let return_ty = if self.cursor.eat(TokenKind::Arrow) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        self.cursor.expect(TokenKind::Colon, "`:` after lambda signature")?;

        if self.bracket_depth == 0 {
            self.expect_block_start("a lambda body")?;
            self.depth += 1;
            let body = self.parse_suite()?;
            self.depth -= 1;
            return Ok(ExprKind::Lambda {
                params,
                return_ty,
                body,
            });
        }
        let body = self.parse_bracketed_lambda_body()?;
        Ok(ExprKind::Lambda {
            params,
            return_ty,
            body,
        })
    }

    /// Lambda body inside brackets, where `Indent`/`Dedent` tokens are
    /// suppressed: statements are read line by line until the enclosing
    /// bracket closes. Nested suites are not supported in this position.
    fn parse_bracketed_lambda_body(&mut self) -> Result<gds_ir::ast::Suite, ParseError> {
        use gds_ir::ast::Suite;

        let saved_depth = self.bracket_depth;
        self.bracket_depth = 0;
        let mut suite = Suite::new();
        loop {
            while matches!(self.cursor.kind(), TokenKind::Newline { .. }) {
                self.cursor.advance();
            }
            if matches!(
                self.cursor.kind(),
                TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::RBrace
                    | TokenKind::Comma
                    | TokenKind::Eof
            ) {
                break;
            }
            let stmt = self.parse_statement()?;
            suite.statements.push(stmt);
        }
        self.bracket_depth = saved_depth;
        Ok(suite)
    }

    /// `(name[: Type] [= default], …)` for functions, signals, lambdas.
    pub(crate) fn parse_param_list(
        &mut self,
    ) -> Result<(Vec<Parameter>, Vec<CommentLine>), ParseError> {
        self.cursor.expect(TokenKind::LParen, "`(`")?;
        self.bracket_depth += 1;
        let mut params = Vec::new();
        loop {
            self.skip_expr_trivia();
            if self.cursor.check(TokenKind::RParen) {
                let dangling = self.take_pending_leading();
                self.cursor.advance();
                self.bracket_depth -= 1;
                return Ok((params, dangling));
            }
            let leading = self.take_pending_leading();
            let name = self.expect_name("a parameter name")?;
            let mut param = Parameter {
                name,
                ty: None,
                infer: false,
                default: None,
                leading,
                trailing: None,
            };
            if self.cursor.eat(TokenKind::ColonEq) {
                param.infer = true;
                param.default = Some(self.parse_expr()?);
            } else {
                if self.cursor.eat(TokenKind::Colon) {
                    param.ty = Some(self.parse_type_ref()?);
                }
                if self.cursor.eat(TokenKind::Eq) {
                    param.default = Some(self.parse_expr()?);
                }
            }
            param.trailing = self.take_trailing();
            self.skip_expr_trivia();
            let had_comma = self.cursor.eat(TokenKind::Comma);
            if param.trailing.is_none() {
                param.trailing = self.take_trailing();
            }
            params.push(param);
            if !had_comma {
                self.skip_expr_trivia();
                let dangling = self.take_pending_leading();
                self.cursor.expect(TokenKind::RParen, "`,` or `)`")?;
                self.bracket_depth -= 1;
                return Ok((params, dangling));
            }
        }
    }

    /// A dotted type name with at most one generic argument.
    pub(crate) fn parse_type_ref(&mut self) -> Result<TypeRef, ParseError> {
        let mut name = match self.cursor.kind() {
            TokenKind::Void => {
                self.cursor.advance();
                "void".to_string()
            }
            TokenKind::Str => {
                // `extends "res://script.gd"`-style scripts also appear in
                // type position for subclasses.
                let text = self.cursor.text().to_string();
                self.cursor.advance();
                text
            }
            _ => self.expect_name("a type name")?,
        };
        while self.cursor.eat(TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.expect_name("a type name after `.`")?);
        }
        let generic = if self.cursor.eat(TokenKind::LBracket) {
            self.bracket_depth += 1;
            let inner = self.parse_type_ref()?;
            self.cursor.expect(TokenKind::RBracket, "`]`")?;
            self.bracket_depth -= 1;
            Some(Box::new(inner))
        } else {
            None
        };
        Ok(TypeRef { name, generic })
    }

    /// `@name` or `@name(args)`.
    pub(crate) fn parse_annotation(&mut self) -> Result<Annotation, ParseError> {
        self.cursor.expect(TokenKind::At, "`@`")?;
        let name = self.expect_name("an annotation name")?;
        let args = if self.cursor.check(TokenKind::LParen) {
            let (args, _dangling) = self.parse_call_args()?;
            Some(args)
        } else {
            None
        };
        Ok(Annotation { name, args })
    }
}
