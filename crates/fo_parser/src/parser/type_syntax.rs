use fo_ast::{
  ASTExpression, ASTFieldGroup, ASTFuncType, ASTIdent, ASTInterfaceType, ASTSelectorExpr, ASTStructType,
  ASTTypeArgExpr, ChanDirSyntax,
};
use fo_diagnostics::message::DiagnosticMessage;
use fo_token::token_types::TokenType;
use fo_type::source::Span;

use super::{FoParser, ParserResult};

impl FoParser {
  /// Whether a token can start a type expression.
  pub(crate) fn starts_type(
    &self,
    t: TokenType,
  ) -> bool {
    matches!(
      t,
      TokenType::Ident
        | TokenType::Asterisk
        | TokenType::LeftBrack
        | TokenType::LeftParen
        | TokenType::Map
        | TokenType::Chan
        | TokenType::Arrow
        | TokenType::Struct
        | TokenType::Interface
        | TokenType::Func
    )
  }

  /// Parse a type expression. In type position a bracket application is
  /// unambiguous, so `X[T]` becomes a `TypeArgExpr` even with a single
  /// argument.
  pub(crate) fn parse_type(&mut self) -> ParserResult<ASTExpression> {
    match self.peek_type() {
      TokenType::Ident => {
        let mut expr = ASTExpression::Ident(self.parse_ident()?);

        if self.at(TokenType::Dot) {
          self.bump();
          let sel = self.parse_ident()?;
          let span = expr.span().to(&sel.span);
          let id = self.fresh_node_id();
          expr = ASTExpression::Selector(ASTSelectorExpr {
            id,
            expr: Box::new(expr),
            sel,
            span,
          });
        }

        if self.at(TokenType::LeftBrack) {
          expr = self.parse_type_args(expr)?;
        }

        Ok(expr)
      },
      TokenType::LeftParen => {
        let start = self.bump().span.clone();
        let inner = self.with_composite(true, |p| p.parse_type())?;
        self.expect(TokenType::RightParen)?;
        let span = start.to(&self.previous().span);
        Ok(ASTExpression::Paren {
          expr: Box::new(inner),
          span,
        })
      },
      TokenType::Asterisk => {
        let start = self.bump().span.clone();
        let base = self.parse_type()?;
        let span = start.to(base.span());
        Ok(ASTExpression::Star {
          expr: Box::new(base),
          span,
        })
      },
      TokenType::LeftBrack => {
        let start = self.bump().span.clone();
        if self.eat(TokenType::RightBrack) {
          let elem = self.parse_type()?;
          let span = start.to(elem.span());
          return Ok(ASTExpression::ArrayType {
            len: None,
            elem: Box::new(elem),
            span,
          });
        }
        let len = self.with_composite(true, |p| p.parse_expression(0))?;
        self.expect(TokenType::RightBrack)?;
        let elem = self.parse_type()?;
        let span = start.to(elem.span());
        Ok(ASTExpression::ArrayType {
          len: Some(Box::new(len)),
          elem: Box::new(elem),
          span,
        })
      },
      TokenType::Map => {
        let start = self.bump().span.clone();
        self.expect(TokenType::LeftBrack)?;
        let key = self.with_composite(true, |p| p.parse_type())?;
        self.expect(TokenType::RightBrack)?;
        let value = self.parse_type()?;
        let span = start.to(value.span());
        Ok(ASTExpression::MapType {
          key: Box::new(key),
          value: Box::new(value),
          span,
        })
      },
      TokenType::Chan => {
        let start = self.bump().span.clone();
        let dir = if self.eat(TokenType::Arrow) {
          ChanDirSyntax::SendOnly
        } else {
          ChanDirSyntax::SendRecv
        };
        let value = self.parse_type()?;
        let span = start.to(value.span());
        Ok(ASTExpression::ChanType {
          dir,
          value: Box::new(value),
          span,
        })
      },
      TokenType::Arrow => {
        let start = self.bump().span.clone();
        self.expect(TokenType::Chan)?;
        let value = self.parse_type()?;
        let span = start.to(value.span());
        Ok(ASTExpression::ChanType {
          dir: ChanDirSyntax::RecvOnly,
          value: Box::new(value),
          span,
        })
      },
      TokenType::Struct => self.parse_struct_type(),
      TokenType::Interface => self.parse_interface_type(),
      TokenType::Func => {
        let start = self.bump().span.clone();
        let typ = self.parse_func_type(start)?;
        Ok(ASTExpression::FuncType(typ))
      },
      _ => Err(DiagnosticMessage::ExpectedType(self.peek().span.clone())),
    }
  }

  /// `X[T1, ..., Tn]` in type position.
  pub(crate) fn parse_type_args(
    &mut self,
    base: ASTExpression,
  ) -> ParserResult<ASTExpression> {
    self.expect(TokenType::LeftBrack)?;
    let mut types = Vec::new();
    loop {
      let arg = self.with_composite(true, |p| p.parse_type())?;
      types.push(arg);
      if !self.eat(TokenType::Comma) {
        break;
      }
    }
    self.expect(TokenType::RightBrack)?;
    let span = base.span().to(&self.previous().span);
    let id = self.fresh_node_id();
    Ok(ASTExpression::TypeArg(ASTTypeArgExpr {
      id,
      expr: Box::new(base),
      types,
      span,
    }))
  }

  fn parse_struct_type(&mut self) -> ParserResult<ASTExpression> {
    let start = self.bump().span.clone();
    self.expect(TokenType::LeftBrace)?;

    let mut fields = Vec::new();
    while !self.at(TokenType::RightBrace) && !self.at(TokenType::Eof) {
      if self.eat(TokenType::SemiColon) {
        continue;
      }
      fields.push(self.parse_field_line()?);
    }
    self.expect(TokenType::RightBrace)?;
    let span = start.to(&self.previous().span);
    Ok(ASTExpression::StructType(ASTStructType { fields, span }))
  }

  /// Whether an identifier followed by `[` opens a type-argument
  /// application rather than naming a field/parameter of array type.
  /// `List[T]` and `Tuple[T, U]` are applications; `x [5]int` is not.
  fn ident_starts_application(&self) -> bool {
    self.peek_nth(1) == TokenType::LeftBrack
      && self.peek_nth(2) == TokenType::Ident
      && matches!(self.peek_nth(3), TokenType::RightBrack | TokenType::Comma)
  }

  /// One struct-field line: `a, b T`, `name T "tag"`, or an embedded type.
  fn parse_field_line(&mut self) -> ParserResult<ASTFieldGroup> {
    let start = self.peek().span.clone();

    let mut names: Vec<ASTIdent> = Vec::new();
    let typ;
    if self.at(TokenType::Ident) && self.peek_nth(1) == TokenType::Comma {
      // several names sharing one type
      names.push(self.parse_ident()?);
      while self.eat(TokenType::Comma) {
        names.push(self.parse_ident()?);
      }
      typ = self.parse_type()?;
    } else if self.at(TokenType::Ident)
      && self.peek_nth(1) != TokenType::Dot
      && !self.ident_starts_application()
      && (self.starts_type(self.peek_nth(1)) || self.peek_nth(1) == TokenType::LeftBrack)
    {
      names.push(self.parse_ident()?);
      typ = self.parse_type()?;
    } else {
      // embedded field
      typ = self.parse_type()?;
    }

    let tag = if self.at(TokenType::String) {
      Some(unquote(&self.bump().lexeme.clone()))
    } else {
      None
    };

    let span = start.to(&self.previous().span);
    Ok(ASTFieldGroup { names, typ, tag, span })
  }

  fn parse_interface_type(&mut self) -> ParserResult<ASTExpression> {
    let start = self.bump().span.clone();
    self.expect(TokenType::LeftBrace)?;

    let mut methods = Vec::new();
    while !self.at(TokenType::RightBrace) && !self.at(TokenType::Eof) {
      if self.eat(TokenType::SemiColon) {
        continue;
      }
      let line_start = self.peek().span.clone();
      if self.at(TokenType::Ident) && self.peek_nth(1) == TokenType::LeftParen {
        let name = self.parse_ident()?;
        let sig_start = self.peek().span.clone();
        let typ = self.parse_func_type(sig_start)?;
        let span = line_start.to(&self.previous().span);
        methods.push(ASTFieldGroup {
          names: vec![name],
          typ: ASTExpression::FuncType(typ),
          tag: None,
          span,
        });
      } else {
        let typ = self.parse_type()?;
        let span = line_start.to(&self.previous().span);
        methods.push(ASTFieldGroup {
          names: Vec::new(),
          typ,
          tag: None,
          span,
        });
      }
    }
    self.expect(TokenType::RightBrace)?;
    let span = start.to(&self.previous().span);
    Ok(ASTExpression::InterfaceType(ASTInterfaceType { methods, span }))
  }

  /// Parameters and results, starting at `(`. The leading `func` keyword
  /// (if any) has already been consumed.
  pub(crate) fn parse_func_type(
    &mut self,
    start: Span,
  ) -> ParserResult<ASTFuncType> {
    let params = self.parse_param_list()?;
    let results = self.parse_results()?;
    let span = start.to(&self.previous().span);
    Ok(ASTFuncType { params, results, span })
  }

  pub(crate) fn parse_param_list(&mut self) -> ParserResult<Vec<ASTFieldGroup>> {
    self.expect(TokenType::LeftParen)?;

    let mut entries: Vec<(ASTExpression, Option<ASTExpression>)> = Vec::new();
    self.with_composite(true, |p| -> ParserResult<()> {
      while !p.at(TokenType::RightParen) && !p.at(TokenType::Eof) {
        entries.push(p.parse_param_entry()?);
        if !p.eat(TokenType::Comma) {
          break;
        }
      }
      Ok(())
    })?;

    self.expect(TokenType::RightParen)?;
    self.group_param_entries(entries)
  }

  /// One parameter entry: either an anonymous type or `name type`. The
  /// second slot is only taken when the first token is an identifier that
  /// cannot itself be a complete type here.
  fn parse_param_entry(&mut self) -> ParserResult<(ASTExpression, Option<ASTExpression>)> {
    if self.at(TokenType::Ellipsis) {
      return Ok((self.parse_ellipsis_type()?, None));
    }

    if self.at(TokenType::Ident) {
      let next = self.peek_nth(1);
      let bare = matches!(next, TokenType::Comma | TokenType::RightParen);
      let qualified = next == TokenType::Dot;
      if bare {
        return Ok((ASTExpression::Ident(self.parse_ident()?), None));
      }
      if !qualified && !self.ident_starts_application() {
        // `name type` pair
        let name = self.parse_ident()?;
        let typ = if self.at(TokenType::Ellipsis) {
          self.parse_ellipsis_type()?
        } else {
          self.parse_type()?
        };
        return Ok((ASTExpression::Ident(name), Some(typ)));
      }
    }

    Ok((self.parse_type()?, None))
  }

  fn parse_ellipsis_type(&mut self) -> ParserResult<ASTExpression> {
    let start = self.expect(TokenType::Ellipsis)?.span.clone();
    let elem = self.parse_type()?;
    let span = start.to(elem.span());
    Ok(ASTExpression::Ellipsis {
      elem: Some(Box::new(elem)),
      span,
    })
  }

  /// Resolve the name-versus-type ambiguity of a parameter list: if any
  /// entry carries an explicit type, every entry without one is a name
  /// attached to the next typed entry; otherwise all entries are
  /// anonymous types.
  fn group_param_entries(
    &mut self,
    entries: Vec<(ASTExpression, Option<ASTExpression>)>,
  ) -> ParserResult<Vec<ASTFieldGroup>> {
    let named = entries.iter().any(|(_, t)| t.is_some());
    let mut groups = Vec::new();

    if !named {
      for (typ, _) in entries {
        let span = typ.span().clone();
        groups.push(ASTFieldGroup {
          names: Vec::new(),
          typ,
          tag: None,
          span,
        });
      }
      return Ok(groups);
    }

    let mut pending: Vec<ASTIdent> = Vec::new();
    for (first, typ) in entries {
      match typ {
        None => pending.push(self.expr_as_ident(first)?),
        Some(typ) => {
          let mut names = std::mem::take(&mut pending);
          let start = first.span().clone();
          names.push(self.expr_as_ident(first)?);
          let span = start.to(typ.span());
          groups.push(ASTFieldGroup {
            names,
            typ,
            tag: None,
            span,
          });
        },
      }
    }

    if let Some(stray) = pending.first() {
      return Err(DiagnosticMessage::ExpectedType(stray.span.clone()));
    }
    Ok(groups)
  }

  fn parse_results(&mut self) -> ParserResult<Vec<ASTFieldGroup>> {
    if self.at(TokenType::LeftParen) {
      return self.parse_param_list();
    }

    if self.starts_type(self.peek_type()) && !self.at(TokenType::LeftParen) {
      let typ = self.parse_type()?;
      let span = typ.span().clone();
      return Ok(vec![ASTFieldGroup {
        names: Vec::new(),
        typ,
        tag: None,
        span,
      }]);
    }

    Ok(Vec::new())
  }

  pub(crate) fn expr_as_ident(
    &mut self,
    expr: ASTExpression,
  ) -> ParserResult<ASTIdent> {
    match expr {
      ASTExpression::Ident(ident) => Ok(ident),
      other => Err(DiagnosticMessage::ExpectedIdentifier(other.span().clone())),
    }
  }
}

pub(crate) fn unquote(lexeme: &str) -> String {
  let inner = lexeme
    .strip_prefix('"')
    .and_then(|s| s.strip_suffix('"'))
    .or_else(|| lexeme.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
    .unwrap_or(lexeme);
  inner.to_string()
}
