use fo_ast::{
  ASTBasicLit, ASTCallExpr, ASTCompositeElem, ASTCompositeLit, ASTExpression, ASTIndexExpr, ASTSelectorExpr,
  ASTTypeArgExpr, BinaryOp, LitKind, UnaryOp,
};
use fo_diagnostics::message::DiagnosticMessage;
use fo_token::token_types::TokenType;

use super::{FoParser, ParserResult};

impl FoParser {
  pub(crate) fn parse_expression(
    &mut self,
    min_bp: u16,
  ) -> ParserResult<ASTExpression> {
    let mut lhs = self.parse_unary()?;

    loop {
      let op_token = self.peek_type();
      let Some((left_bp, right_bp)) = self.binding_powers(&op_token) else {
        break;
      };
      if left_bp < min_bp {
        break;
      }

      self.bump();
      let rhs = self.parse_expression(right_bp)?;
      let span = lhs.span().to(rhs.span());
      lhs = ASTExpression::Binary {
        op: binary_op(op_token),
        left: Box::new(lhs),
        right: Box::new(rhs),
        span,
      };
    }

    Ok(lhs)
  }

  fn parse_unary(&mut self) -> ParserResult<ASTExpression> {
    let op = match self.peek_type() {
      TokenType::Plus => Some(UnaryOp::Plus),
      TokenType::Minus => Some(UnaryOp::Minus),
      TokenType::Bang => Some(UnaryOp::Not),
      TokenType::Caret => Some(UnaryOp::Xor),
      TokenType::Ampersand => Some(UnaryOp::Addr),
      TokenType::Arrow => Some(UnaryOp::Recv),
      TokenType::Asterisk => {
        let start = self.bump().span.clone();
        let expr = self.parse_unary()?;
        let span = start.to(expr.span());
        return Ok(ASTExpression::Star {
          expr: Box::new(expr),
          span,
        });
      },
      _ => None,
    };

    if let Some(op) = op {
      let start = self.bump().span.clone();
      let expr = self.parse_unary()?;
      let span = start.to(expr.span());
      return Ok(ASTExpression::Unary {
        op,
        expr: Box::new(expr),
        span,
      });
    }

    self.parse_primary()
  }

  fn parse_primary(&mut self) -> ParserResult<ASTExpression> {
    let mut expr = self.parse_operand()?;

    loop {
      match self.peek_type() {
        TokenType::Dot => {
          self.bump();
          if self.eat(TokenType::LeftParen) {
            // type assertion: x.(T) or the switch guard x.(type)
            let typ = if self.at(TokenType::Type) {
              self.bump();
              None
            } else {
              Some(Box::new(self.with_composite(true, |p| p.parse_type())?))
            };
            self.expect(TokenType::RightParen)?;
            let span = expr.span().to(&self.previous().span);
            expr = ASTExpression::TypeAssert {
              expr: Box::new(expr),
              typ,
              span,
            };
          } else {
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
        },
        TokenType::LeftParen => {
          expr = self.parse_call(expr)?;
        },
        TokenType::LeftBrack => {
          expr = self.parse_bracket(expr)?;
        },
        TokenType::LeftBrace if self.composite_allowed() && is_literal_type(&expr) => {
          expr = self.parse_composite_lit(Some(expr))?;
        },
        _ => break,
      }
    }

    Ok(expr)
  }

  fn parse_operand(&mut self) -> ParserResult<ASTExpression> {
    match self.peek_type() {
      TokenType::Ident => Ok(ASTExpression::Ident(self.parse_ident()?)),
      TokenType::Int => self.parse_basic_lit(LitKind::Int),
      TokenType::Float => self.parse_basic_lit(LitKind::Float),
      TokenType::Imag => self.parse_basic_lit(LitKind::Imag),
      TokenType::Rune => self.parse_basic_lit(LitKind::Rune),
      TokenType::String => self.parse_basic_lit(LitKind::String),
      TokenType::LeftParen => {
        let start = self.bump().span.clone();
        let inner = self.with_composite(true, |p| p.parse_expression(0))?;
        self.expect(TokenType::RightParen)?;
        let span = start.to(&self.previous().span);
        Ok(ASTExpression::Paren {
          expr: Box::new(inner),
          span,
        })
      },
      TokenType::Func => {
        let start = self.bump().span.clone();
        let typ = self.parse_func_type(start.clone())?;
        if self.at(TokenType::LeftBrace) {
          let body = self.with_composite(true, |p| p.parse_block())?;
          let span = start.to(&body.span);
          Ok(ASTExpression::FuncLit { typ, body, span })
        } else {
          Ok(ASTExpression::FuncType(typ))
        }
      },
      // type syntax in operand position: conversions like []byte(x) and
      // composite literal types like map[string]int{...}
      TokenType::LeftBrack | TokenType::Map | TokenType::Chan | TokenType::Struct | TokenType::Interface => {
        self.parse_type()
      },
      _ => Err(DiagnosticMessage::ExpectedExpression(self.peek().span.clone())),
    }
  }

  fn parse_basic_lit(
    &mut self,
    kind: LitKind,
  ) -> ParserResult<ASTExpression> {
    let token = self.bump();
    Ok(ASTExpression::BasicLit(ASTBasicLit {
      kind,
      value: token.lexeme.clone(),
      span: token.span.clone(),
    }))
  }

  fn parse_call(
    &mut self,
    func: ASTExpression,
  ) -> ParserResult<ASTExpression> {
    self.expect(TokenType::LeftParen)?;
    let mut args = Vec::new();
    let mut ellipsis = false;

    self.with_composite(true, |p| -> ParserResult<()> {
      while !p.at(TokenType::RightParen) && !p.at(TokenType::Eof) {
        let arg = p.parse_expression(0)?;
        args.push(arg);
        if p.eat(TokenType::Ellipsis) {
          ellipsis = true;
        }
        if !p.eat(TokenType::Comma) {
          break;
        }
      }
      Ok(())
    })?;

    self.expect(TokenType::RightParen)?;
    let span = func.span().to(&self.previous().span);
    Ok(ASTExpression::Call(ASTCallExpr {
      func: Box::new(func),
      args,
      ellipsis,
      span,
    }))
  }

  /// A bracket after a primary expression: an index, a slice, or a
  /// multi-element type-argument application. A single element stays an
  /// `IndexExpr` here; resolution decides later whether it was really an
  /// application.
  fn parse_bracket(
    &mut self,
    base: ASTExpression,
  ) -> ParserResult<ASTExpression> {
    self.expect(TokenType::LeftBrack)?;

    self.with_composite(true, |p| {
      // slice with absent low bound: x[:high]
      if p.eat(TokenType::Colon) {
        let high = if p.at(TokenType::RightBrack) {
          None
        } else {
          Some(Box::new(p.parse_expression(0)?))
        };
        p.expect(TokenType::RightBrack)?;
        let span = base.span().to(&p.previous().span);
        return Ok(ASTExpression::Slice {
          expr: Box::new(base),
          low: None,
          high,
          span,
        });
      }

      let first = p.parse_expression(0)?;

      if p.eat(TokenType::Colon) {
        let high = if p.at(TokenType::RightBrack) {
          None
        } else {
          Some(Box::new(p.parse_expression(0)?))
        };
        p.expect(TokenType::RightBrack)?;
        let span = base.span().to(&p.previous().span);
        return Ok(ASTExpression::Slice {
          expr: Box::new(base),
          low: Some(Box::new(first)),
          high,
          span,
        });
      }

      if p.at(TokenType::Comma) {
        let mut types = vec![first];
        while p.eat(TokenType::Comma) {
          if p.at(TokenType::RightBrack) {
            break;
          }
          types.push(p.parse_type()?);
        }
        p.expect(TokenType::RightBrack)?;
        let span = base.span().to(&p.previous().span);
        let id = p.fresh_node_id();
        return Ok(ASTExpression::TypeArg(ASTTypeArgExpr {
          id,
          expr: Box::new(base),
          types,
          span,
        }));
      }

      p.expect(TokenType::RightBrack)?;
      let span = base.span().to(&p.previous().span);
      let id = p.fresh_node_id();
      Ok(ASTExpression::Index(ASTIndexExpr {
        id,
        expr: Box::new(base),
        index: Box::new(first),
        span,
      }))
    })
  }

  pub(crate) fn parse_composite_lit(
    &mut self,
    typ: Option<ASTExpression>,
  ) -> ParserResult<ASTExpression> {
    let start = typ
      .as_ref()
      .map(|t| t.span().clone())
      .unwrap_or_else(|| self.peek().span.clone());
    self.expect(TokenType::LeftBrace)?;

    let mut elems = Vec::new();
    self.with_composite(true, |p| -> ParserResult<()> {
      while !p.at(TokenType::RightBrace) && !p.at(TokenType::Eof) {
        let first = p.parse_composite_value()?;
        let elem = if p.eat(TokenType::Colon) {
          let value = p.parse_composite_value()?;
          ASTCompositeElem {
            key: Some(first),
            value,
          }
        } else {
          ASTCompositeElem { key: None, value: first }
        };
        elems.push(elem);
        if !p.eat(TokenType::Comma) {
          break;
        }
      }
      Ok(())
    })?;

    self.expect(TokenType::RightBrace)?;
    let span = start.to(&self.previous().span);
    Ok(ASTExpression::CompositeLit(ASTCompositeLit {
      typ: typ.map(Box::new),
      elems,
      span,
    }))
  }

  /// Values inside a composite literal, where a nested brace opens a
  /// literal with an elided type.
  fn parse_composite_value(&mut self) -> ParserResult<ASTExpression> {
    if self.at(TokenType::LeftBrace) {
      return self.parse_composite_lit(None);
    }
    self.parse_expression(0)
  }
}

fn is_literal_type(expr: &ASTExpression) -> bool {
  matches!(
    expr,
    ASTExpression::Ident(_)
      | ASTExpression::Selector(_)
      | ASTExpression::Index(_)
      | ASTExpression::TypeArg(_)
      | ASTExpression::ArrayType { .. }
      | ASTExpression::MapType { .. }
      | ASTExpression::StructType(_)
  )
}

fn binary_op(token: TokenType) -> BinaryOp {
  match token {
    TokenType::Plus => BinaryOp::Add,
    TokenType::Minus => BinaryOp::Sub,
    TokenType::Asterisk => BinaryOp::Mul,
    TokenType::Slash => BinaryOp::Div,
    TokenType::Percent => BinaryOp::Rem,
    TokenType::Ampersand => BinaryOp::And,
    TokenType::Pipe => BinaryOp::Or,
    TokenType::Caret => BinaryOp::Xor,
    TokenType::AndNot => BinaryOp::AndNot,
    TokenType::LeftShift => BinaryOp::Shl,
    TokenType::RightShift => BinaryOp::Shr,
    TokenType::LogicalAnd => BinaryOp::LogicalAnd,
    TokenType::LogicalOr => BinaryOp::LogicalOr,
    TokenType::EqualEqual => BinaryOp::Eq,
    TokenType::BangEqual => BinaryOp::NotEq,
    TokenType::Less => BinaryOp::Less,
    TokenType::LessEqual => BinaryOp::LessEq,
    TokenType::Greater => BinaryOp::Greater,
    TokenType::GreaterEqual => BinaryOp::GreaterEq,
    _ => unreachable!("not a binary operator: {:?}", token),
  }
}
