//! Class body parsing: header lines, members, properties.

use gds_ir::ast::{
    Accessor, AccessorKind, Annotation, Class, ConstDecl, EnumDecl, EnumVariant, FuncDecl,
    HeaderKind, HeaderLine, InnerClass, Member, MemberKind, Property, SignalDecl, Trivia, VarDecl,
};
use gds_ir::{InlineComment, ParseError, ParseErrorKind, TokenKind};
use tracing::debug;

use super::stmt::make_trivia;
use crate::parser::Parser;

impl Parser<'_> {
    /// Parse a class body: the whole file, or an inner `class Name:`
    /// block (then `is_file` is false and a `Dedent` ends it).
    pub(crate) fn parse_class_body(&mut self, is_file: bool) -> Result<Class, ParseError> {
        debug!(is_file, "parse_class_body");
        let depth = self.depth;
        let mut class = Class::default();
        loop {
            self.reclaim_carried();
            let blank = self.collect_line_trivia();
            if self.truncated() {
                break;
            }
            match self.cursor.kind() {
                TokenKind::Eof => {
                    class.footer = self.split_footer(depth);
                    break;
                }
                TokenKind::Dedent if !is_file => {
                    class.footer = self.split_footer(depth);
                    self.carried_blank = self.carried_blank || blank;
                    self.cursor.advance();
                    break;
                }
                TokenKind::ClassName => {
                    let leading = self.drain_pending(depth);
                    self.cursor.advance();
                    let name = self.expect_member_name("a class name")?;
                    let mut trivia = make_trivia(leading, blank);
                    trivia.trailing = self.end_statement()?;
                    class.header.push(HeaderLine {
                        kind: HeaderKind::ClassName(name),
                        trivia,
                    });
                }
                TokenKind::Extends => {
                    let leading = self.drain_pending(depth);
                    self.cursor.advance();
                    let base = self.parse_expr()?;
                    let mut trivia = make_trivia(leading, blank);
                    trivia.trailing = self.end_statement()?;
                    class.header.push(HeaderLine {
                        kind: HeaderKind::Extends(base),
                        trivia,
                    });
                }
                TokenKind::At => {
                    let leading = self.drain_pending(depth);
                    let trivia = make_trivia(leading, blank);
                    self.parse_annotated(&mut class, trivia)?;
                }
                TokenKind::Var
                | TokenKind::Const
                | TokenKind::Signal
                | TokenKind::Enum
                | TokenKind::Func
                | TokenKind::Static
                | TokenKind::Class => {
                    let leading = self.drain_pending(depth);
                    let trivia = make_trivia(leading, blank);
                    let member = self.parse_member(Vec::new(), trivia)?;
                    class.members.push(member);
                }
                TokenKind::Pass => {
                    // Placeholder body of an otherwise empty class.
                    let leading = self.drain_pending(depth);
                    let mut trivia = make_trivia(leading, blank);
                    self.cursor.advance();
                    trivia.trailing = self.end_statement()?;
                    class.members.push(Member {
                        kind: MemberKind::Pass,
                        trivia,
                    });
                }
                _ => return Err(self.cursor.unexpected("a class member")),
            }
        }
        Ok(class)
    }

    /// An `@annotation` at class level: either a header line (`@tool`,
    /// `@icon(…)`) or the start of an annotated declaration.
    fn parse_annotated(&mut self, class: &mut Class, mut trivia: Trivia) -> Result<(), ParseError> {
        let first = self.parse_annotation()?;
        let standalone = matches!(
            self.cursor.kind(),
            TokenKind::Newline { .. } | TokenKind::Comment { own_line: false } | TokenKind::Eof
        );
        if standalone && matches!(first.name.as_str(), "tool" | "icon") {
            trivia.trailing = self.end_statement()?;
            let kind = if first.name == "tool" {
                HeaderKind::Tool(first)
            } else {
                HeaderKind::Icon(first)
            };
            class.header.push(HeaderLine { kind, trivia });
            return Ok(());
        }

        let mut annotations = vec![first];
        loop {
            match self.cursor.kind() {
                TokenKind::At => annotations.push(self.parse_annotation()?),
                TokenKind::Newline { .. } | TokenKind::Comment { own_line: true } => {
                    // Comment lines between an annotation and its
                    // declaration stay with the declaration.
                    self.collect_line_trivia();
                    let depth = self.depth;
                    trivia.leading.extend(self.drain_pending(depth));
                }
                TokenKind::Comment { own_line: false } => {
                    // A comment beside the annotation; keep it with the
                    // declaration it annotates.
                    if let Some(comment) = self.take_trailing() {
                        trivia
                            .leading
                            .push(gds_ir::CommentLine::new(comment.text, self.depth));
                    }
                }
                _ => break,
            }
        }
        let member = self.parse_member(annotations, trivia)?;
        class.members.push(member);
        Ok(())
    }

    fn parse_member(
        &mut self,
        annotations: Vec<Annotation>,
        mut trivia: Trivia,
    ) -> Result<Member, ParseError> {
        let kind = match self.cursor.kind() {
            TokenKind::Var => {
                let (decl, trailing) = self.parse_var_decl(annotations)?;
                trivia.trailing = trailing;
                MemberKind::Var(decl)
            }
            TokenKind::Const => {
                let (decl, trailing) = self.parse_const_decl(annotations)?;
                trivia.trailing = trailing;
                MemberKind::Const(decl)
            }
            TokenKind::Signal => {
                let (decl, trailing) = self.parse_signal_decl()?;
                trivia.trailing = trailing;
                MemberKind::Signal(decl)
            }
            TokenKind::Enum => {
                let (decl, trailing) = self.parse_enum_decl()?;
                trivia.trailing = trailing;
                MemberKind::Enum(decl)
            }
            TokenKind::Func | TokenKind::Static => {
                let (decl, trailing) = self.parse_func_decl(annotations)?;
                trivia.trailing = trailing;
                MemberKind::Func(decl)
            }
            TokenKind::Class => {
                let (decl, trailing) = self.parse_inner_class()?;
                trivia.trailing = trailing;
                MemberKind::Class(decl)
            }
            _ => return Err(self.cursor.unexpected("a declaration")),
        };
        Ok(Member { kind, trivia })
    }

    fn expect_member_name(&mut self, context: &str) -> Result<String, ParseError> {
        if self.cursor.check(TokenKind::Identifier) {
            let name = self.cursor.text().to_string();
            self.cursor.advance();
            Ok(name)
        } else {
            Err(self.cursor.unexpected(context))
        }
    }

    // --- var / property ---------------------------------------------------

    /// `var name[: Type] [= value][:]` — shared by members and local
    /// statements; the optional trailing `:` opens a property block.
    pub(crate) fn parse_var_decl(
        &mut self,
        annotations: Vec<Annotation>,
    ) -> Result<(VarDecl, Option<InlineComment>), ParseError> {
        self.cursor.expect(TokenKind::Var, "`var`")?;
        let name = self.expect_member_name("a variable name")?;
        let mut decl = VarDecl {
            annotations,
            name,
            ty: None,
            infer: false,
            value: None,
            property: None,
        };

        let mut property_intro = false;
        if self.cursor.eat(TokenKind::ColonEq) {
            decl.infer = true;
            decl.value = Some(self.parse_expr()?);
        } else if self.cursor.check(TokenKind::Colon) {
            if matches!(
                self.cursor.peek_next_kind(),
                TokenKind::Newline { .. } | TokenKind::Comment { own_line: false }
            ) {
                // `var name:` introducing a property with no type.
                self.cursor.advance();
                property_intro = true;
            } else {
                self.cursor.advance();
                decl.ty = Some(self.parse_type_ref()?);
                if self.cursor.eat(TokenKind::Eq) {
                    decl.value = Some(self.parse_expr()?);
                }
            }
        } else if self.cursor.eat(TokenKind::Eq) {
            decl.value = Some(self.parse_expr()?);
        }

        if !property_intro && self.cursor.eat(TokenKind::Colon) {
            property_intro = true;
        }
        if !property_intro {
            let trailing = self.end_statement()?;
            return Ok((decl, trailing));
        }

        let trailing = self.take_trailing();
        let anchor = self.cursor.span().start;
        if let Err(err) = self.expect_block_start("a property declaration") {
            if err.kind == ParseErrorKind::TruncatedConstruct {
                self.tail = Some(anchor);
                decl.property = Some(Property {
                    accessors: Vec::new(),
                });
                return Ok((decl, trailing));
            }
            return Err(err);
        }
        self.depth += 1;
        let property = self.parse_property_accessors(anchor);
        self.depth -= 1;
        decl.property = Some(property?);
        Ok((decl, trailing))
    }

    /// The `set(value):` / `get:` block of a property. A malformed
    /// accessor head switches to pass-through from `anchor`, like a
    /// malformed match arm.
    fn parse_property_accessors(&mut self, anchor: u32) -> Result<Property, ParseError> {
        let depth = self.depth;
        let mut accessors: Vec<Accessor> = Vec::new();
        loop {
            self.reclaim_carried();
            let blank = self.collect_line_trivia();
            if self.truncated() {
                break;
            }
            match self.cursor.kind() {
                TokenKind::Dedent => {
                    let footer = self.split_footer(depth);
                    if let Some(last) = accessors.last_mut() {
                        last.body.footer.extend(footer);
                    }
                    self.carried_blank = self.carried_blank || blank;
                    self.cursor.advance();
                    break;
                }
                TokenKind::Eof => {
                    let footer = self.split_footer(depth);
                    if let Some(last) = accessors.last_mut() {
                        last.body.footer.extend(footer);
                    }
                    self.carried_blank = self.carried_blank || blank;
                    break;
                }
                _ => {
                    let leading = self.drain_pending(depth);
                    match self.parse_accessor(make_trivia(leading, blank)) {
                        Ok(accessor) => accessors.push(accessor),
                        Err(err)
                            if matches!(
                                err.kind,
                                ParseErrorKind::UnexpectedToken
                                    | ParseErrorKind::TruncatedConstruct
                            ) =>
                        {
                            self.tail = Some(anchor);
                            accessors.clear();
                            break;
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }
        Ok(Property { accessors })
    }

    fn parse_accessor(&mut self, mut trivia: Trivia) -> Result<Accessor, ParseError> {
        let kind = if self.cursor.check_ident("set") {
            self.cursor.advance();
            self.cursor.expect(TokenKind::LParen, "`(` after `set`")?;
            let param = self.expect_member_name("a setter parameter name")?;
            self.cursor.expect(TokenKind::RParen, "`)`")?;
            AccessorKind::Set { param }
        } else if self.cursor.check_ident("get") {
            self.cursor.advance();
            AccessorKind::Get
        } else {
            return Err(self.cursor.unexpected("`set` or `get`"));
        };
        self.cursor.expect(TokenKind::Colon, "`:`")?;
        trivia.trailing = self.take_trailing();
        let body = self.parse_nested_suite("a property accessor")?;
        Ok(Accessor { kind, trivia, body })
    }

    // --- const / signal / enum / func / class -------------------------------

    fn parse_const_decl(
        &mut self,
        annotations: Vec<Annotation>,
    ) -> Result<(ConstDecl, Option<InlineComment>), ParseError> {
        self.cursor.expect(TokenKind::Const, "`const`")?;
        let name = self.expect_member_name("a constant name")?;
        let mut ty = None;
        let mut infer = false;
        if self.cursor.eat(TokenKind::Colon) {
            ty = Some(self.parse_type_ref()?);
        }
        if self.cursor.eat(TokenKind::ColonEq) {
            infer = true;
        } else {
            self.cursor.expect(TokenKind::Eq, "`=` in constant declaration")?;
        }
        let value = self.parse_expr()?;
        let trailing = self.end_statement()?;
        Ok((
            ConstDecl {
                annotations,
                name,
                ty,
                infer,
                value,
            },
            trailing,
        ))
    }

    fn parse_signal_decl(&mut self) -> Result<(SignalDecl, Option<InlineComment>), ParseError> {
        self.cursor.expect(TokenKind::Signal, "`signal`")?;
        let name = self.expect_member_name("a signal name")?;
        let (params, dangling) = if self.cursor.check(TokenKind::LParen) {
            let (params, dangling) = self.parse_param_list()?;
            (Some(params), dangling)
        } else {
            (None, Vec::new())
        };
        let trailing = self.end_statement()?;
        Ok((
            SignalDecl {
                name,
                params,
                dangling,
            },
            trailing,
        ))
    }

    fn parse_enum_decl(&mut self) -> Result<(EnumDecl, Option<InlineComment>), ParseError> {
        self.cursor.expect(TokenKind::Enum, "`enum`")?;
        let name = if self.cursor.check(TokenKind::Identifier) {
            let name = self.cursor.text().to_string();
            self.cursor.advance();
            Some(name)
        } else {
            None
        };
        self.cursor.expect(TokenKind::LBrace, "`{`")?;
        self.bracket_depth += 1;
        let mut variants: Vec<EnumVariant> = Vec::new();
        let dangling;
        loop {
            self.skip_expr_trivia();
            if self.cursor.check(TokenKind::RBrace) {
                dangling = self.drain_pending(self.depth + 1);
                self.cursor.advance();
                self.bracket_depth -= 1;
                break;
            }
            let leading = self.drain_pending(self.depth + 1);
            let name = self.expect_member_name("an enum variant name")?;
            let value = if self.cursor.eat(TokenKind::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let mut trailing = self.take_trailing();
            self.skip_expr_trivia();
            let had_comma = self.cursor.eat(TokenKind::Comma);
            if trailing.is_none() {
                trailing = self.take_trailing();
            }
            variants.push(EnumVariant {
                name,
                value,
                leading,
                trailing,
            });
            if !had_comma {
                self.skip_expr_trivia();
                dangling = self.drain_pending(self.depth + 1);
                self.cursor.expect(TokenKind::RBrace, "`,` or `}`")?;
                self.bracket_depth -= 1;
                break;
            }
        }
        let trailing = self.end_statement()?;
        Ok((
            EnumDecl {
                name,
                variants,
                dangling,
            },
            trailing,
        ))
    }

    fn parse_func_decl(
        &mut self,
        annotations: Vec<Annotation>,
    ) -> Result<(FuncDecl, Option<InlineComment>), ParseError> {
        let is_static = self.cursor.eat(TokenKind::Static);
        self.cursor.expect(TokenKind::Func, "`func`")?;
        let name = self.expect_member_name("a function name")?;
        let (params, dangling) = self.parse_param_list()?;
        let return_ty = if self.cursor.eat(TokenKind::Arrow) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };
        self.cursor
            .expect(TokenKind::Colon, "`:` after the function signature")?;
        let trailing = self.take_trailing();
        let body = self.parse_nested_suite("a function body")?;
        Ok((
            FuncDecl {
                annotations,
                is_static,
                name,
                params,
                return_ty,
                dangling,
                body,
            },
            trailing,
        ))
    }

    fn parse_inner_class(&mut self) -> Result<(InnerClass, Option<InlineComment>), ParseError> {
        self.cursor.expect(TokenKind::Class, "`class`")?;
        let name = self.expect_member_name("an inner class name")?;
        self.cursor
            .expect(TokenKind::Colon, "`:` after the class name")?;
        let trailing = self.take_trailing();
        self.expect_block_start("an inner class")?;
        self.depth += 1;
        let body = self.parse_class_body(false);
        self.depth -= 1;
        Ok((InnerClass { name, body: body? }, trailing))
    }
}
