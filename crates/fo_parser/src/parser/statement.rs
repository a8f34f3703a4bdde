use fo_ast::{
  ASTAssignStatement, ASTBlock, ASTCaseClause, ASTExpression, ASTForStatement, ASTIfStatement, ASTStatement,
  ASTSwitchStatement, ASTTypeSwitchGuard, AssignOp, BranchKind, ForHeader,
};
use fo_diagnostics::message::DiagnosticMessage;
use fo_token::token_types::TokenType;

use super::{FoParser, ParserResult};

impl FoParser {
  pub(crate) fn parse_block(&mut self) -> ParserResult<ASTBlock> {
    let start = self.expect(TokenType::LeftBrace)?.span.clone();
    let mut statements = Vec::new();

    while !self.at(TokenType::RightBrace) && !self.at(TokenType::Eof) {
      if self.eat(TokenType::SemiColon) {
        continue;
      }
      let stmt = self.parse_statement()?;
      statements.push(stmt);
      if !self.at(TokenType::RightBrace) {
        self.eat(TokenType::SemiColon);
      }
    }

    self.expect(TokenType::RightBrace)?;
    let span = start.to(&self.previous().span);
    Ok(ASTBlock::new(statements, span))
  }

  pub(crate) fn parse_statement(&mut self) -> ParserResult<ASTStatement> {
    match self.peek_type() {
      TokenType::Var | TokenType::Const => {
        let decl = self.parse_value_decl()?;
        Ok(ASTStatement::Decl(decl))
      },
      TokenType::Type => {
        let decl = self.parse_type_decl()?;
        Ok(ASTStatement::Decl(decl))
      },
      TokenType::Return => {
        let start = self.bump().span.clone();
        let mut results = Vec::new();
        if !self.at(TokenType::SemiColon) && !self.at(TokenType::RightBrace) {
          loop {
            results.push(self.parse_expression(0)?);
            if !self.eat(TokenType::Comma) {
              break;
            }
          }
        }
        let span = start.to(&self.previous().span);
        Ok(ASTStatement::Return { results, span })
      },
      TokenType::If => self.parse_if_statement(),
      TokenType::For => self.parse_for_statement(),
      TokenType::Switch => self.parse_switch_statement(),
      TokenType::Break | TokenType::Continue | TokenType::Fallthrough | TokenType::Goto => {
        let token = self.bump();
        let span = token.span.clone();
        let kind = match token.type_ {
          TokenType::Break => BranchKind::Break,
          TokenType::Continue => BranchKind::Continue,
          TokenType::Fallthrough => BranchKind::Fallthrough,
          _ => BranchKind::Goto,
        };
        let label = if self.at(TokenType::Ident) {
          Some(self.parse_ident()?)
        } else {
          None
        };
        let span = span.to(&self.previous().span);
        Ok(ASTStatement::Branch { kind, label, span })
      },
      TokenType::Go => {
        let start = self.bump().span.clone();
        let call = self.parse_expression(0)?;
        let span = start.to(call.span());
        Ok(ASTStatement::Go { call, span })
      },
      TokenType::Defer => {
        let start = self.bump().span.clone();
        let call = self.parse_expression(0)?;
        let span = start.to(call.span());
        Ok(ASTStatement::Defer { call, span })
      },
      TokenType::LeftBrace => {
        let block = self.parse_block()?;
        Ok(ASTStatement::Block(block))
      },
      TokenType::SemiColon => {
        let span = self.peek().span.clone();
        Ok(ASTStatement::Empty { span })
      },
      _ => self.parse_simple_statement(),
    }
  }

  /// Expression statements, assignments, short variable declarations,
  /// sends and increments/decrements.
  fn parse_simple_statement(&mut self) -> ParserResult<ASTStatement> {
    let start = self.peek().span.clone();
    let mut lhs = vec![self.parse_expression(0)?];
    while self.eat(TokenType::Comma) {
      lhs.push(self.parse_expression(0)?);
    }

    let op = match self.peek_type() {
      TokenType::Define => Some(AssignOp::Define),
      TokenType::Assign => Some(AssignOp::Assign),
      TokenType::AddAssign => Some(AssignOp::Add),
      TokenType::SubAssign => Some(AssignOp::Sub),
      TokenType::MulAssign => Some(AssignOp::Mul),
      TokenType::DivAssign => Some(AssignOp::Div),
      TokenType::ModAssign => Some(AssignOp::Rem),
      TokenType::AndAssign => Some(AssignOp::And),
      TokenType::OrAssign => Some(AssignOp::Or),
      TokenType::XorAssign => Some(AssignOp::Xor),
      TokenType::AndNotAssign => Some(AssignOp::AndNot),
      TokenType::LeftShiftAssign => Some(AssignOp::Shl),
      TokenType::RightShiftAssign => Some(AssignOp::Shr),
      _ => None,
    };

    if let Some(op) = op {
      self.bump();
      let mut rhs = vec![self.parse_expression(0)?];
      while self.eat(TokenType::Comma) {
        rhs.push(self.parse_expression(0)?);
      }
      let span = start.to(&self.previous().span);
      return Ok(ASTStatement::Assign(ASTAssignStatement { lhs, op, rhs, span }));
    }

    if lhs.len() == 1 {
      if self.eat(TokenType::Increment) {
        let span = start.to(&self.previous().span);
        return Ok(ASTStatement::IncDec {
          expr: lhs.pop().unwrap(),
          inc: true,
          span,
        });
      }
      if self.eat(TokenType::Decrement) {
        let span = start.to(&self.previous().span);
        return Ok(ASTStatement::IncDec {
          expr: lhs.pop().unwrap(),
          inc: false,
          span,
        });
      }
      if self.eat(TokenType::Arrow) {
        let value = self.parse_expression(0)?;
        let span = start.to(value.span());
        return Ok(ASTStatement::Send {
          chan: lhs.pop().unwrap(),
          value,
          span,
        });
      }
      return Ok(ASTStatement::Expr(lhs.pop().unwrap()));
    }

    Err(DiagnosticMessage::UnexpectedToken {
      at: self.peek().span.clone(),
    })
  }

  fn parse_if_statement(&mut self) -> ParserResult<ASTStatement> {
    let start = self.expect(TokenType::If)?.span.clone();

    let (init, cond) = self.with_composite(false, |p| -> ParserResult<_> {
      let first = p.parse_simple_statement()?;
      if p.eat(TokenType::SemiColon) {
        let cond = p.parse_expression(0)?;
        Ok((Some(Box::new(first)), cond))
      } else {
        match first {
          ASTStatement::Expr(cond) => Ok((None, cond)),
          other => Err(DiagnosticMessage::ExpectedExpression(other.span().clone())),
        }
      }
    })?;

    let then = self.parse_block()?;
    let else_ = if self.eat(TokenType::Else) {
      let stmt = if self.at(TokenType::If) {
        self.parse_if_statement()?
      } else {
        ASTStatement::Block(self.parse_block()?)
      };
      Some(Box::new(stmt))
    } else {
      None
    };

    let span = start.to(&self.previous().span);
    Ok(ASTStatement::If(ASTIfStatement {
      init,
      cond,
      then,
      else_,
      span,
    }))
  }

  fn parse_for_statement(&mut self) -> ParserResult<ASTStatement> {
    let start = self.expect(TokenType::For)?.span.clone();

    // `for {}`
    if self.at(TokenType::LeftBrace) {
      let body = self.parse_block()?;
      let span = start.to(&self.previous().span);
      return Ok(ASTStatement::For(ASTForStatement {
        header: ForHeader::Cond(None),
        body,
        span,
      }));
    }

    let header = self.with_composite(false, |p| -> ParserResult<ForHeader> {
      // `for range x` has no key
      if p.eat(TokenType::Range) {
        let expr = p.parse_expression(0)?;
        return Ok(ForHeader::Range {
          key: None,
          value: None,
          define: false,
          expr,
        });
      }

      if p.at(TokenType::SemiColon) {
        // `for ; cond; post {}`
        p.bump();
        return p.parse_for_clauses(None);
      }

      let first = p.parse_for_range_or_simple()?;
      match first {
        ForFirst::Range(header) => Ok(header),
        ForFirst::Stmt(stmt) => {
          if p.eat(TokenType::SemiColon) {
            p.parse_for_clauses(Some(Box::new(stmt)))
          } else {
            match stmt {
              ASTStatement::Expr(cond) => Ok(ForHeader::Cond(Some(cond))),
              other => Err(DiagnosticMessage::ExpectedExpression(other.span().clone())),
            }
          }
        },
      }
    })?;

    let body = self.parse_block()?;
    let span = start.to(&self.previous().span);
    Ok(ASTStatement::For(ASTForStatement { header, body, span }))
  }

  fn parse_for_clauses(
    &mut self,
    init: Option<Box<ASTStatement>>,
  ) -> ParserResult<ForHeader> {
    let cond = if self.at(TokenType::SemiColon) {
      None
    } else {
      Some(self.parse_expression(0)?)
    };
    self.expect(TokenType::SemiColon)?;
    let post = if self.at(TokenType::LeftBrace) {
      None
    } else {
      Some(Box::new(self.parse_simple_statement()?))
    };
    Ok(ForHeader::Clauses { init, cond, post })
  }

  fn parse_for_range_or_simple(&mut self) -> ParserResult<ForFirst> {
    let mut lhs = vec![self.parse_expression(0)?];
    while self.eat(TokenType::Comma) {
      lhs.push(self.parse_expression(0)?);
    }

    let define = if self.at(TokenType::Define) {
      true
    } else if self.at(TokenType::Assign) {
      false
    } else {
      if lhs.len() == 1 {
        // plain condition or inc/dec; re-dispatch through the simple path
        if self.eat(TokenType::Increment) {
          let expr = lhs.pop().unwrap();
          let span = expr.span().clone();
          return Ok(ForFirst::Stmt(ASTStatement::IncDec { expr, inc: true, span }));
        }
        if self.eat(TokenType::Decrement) {
          let expr = lhs.pop().unwrap();
          let span = expr.span().clone();
          return Ok(ForFirst::Stmt(ASTStatement::IncDec { expr, inc: false, span }));
        }
        return Ok(ForFirst::Stmt(ASTStatement::Expr(lhs.pop().unwrap())));
      }
      return Err(DiagnosticMessage::UnexpectedToken {
        at: self.peek().span.clone(),
      });
    };

    self.bump();
    if self.eat(TokenType::Range) {
      let expr = self.parse_expression(0)?;
      let mut iter = lhs.into_iter();
      return Ok(ForFirst::Range(ForHeader::Range {
        key: iter.next(),
        value: iter.next(),
        define,
        expr,
      }));
    }

    let mut rhs = vec![self.parse_expression(0)?];
    while self.eat(TokenType::Comma) {
      rhs.push(self.parse_expression(0)?);
    }
    let op = if define { AssignOp::Define } else { AssignOp::Assign };
    let start = lhs[0].span().clone();
    let span = start.to(&self.previous().span);
    Ok(ForFirst::Stmt(ASTStatement::Assign(ASTAssignStatement {
      lhs,
      op,
      rhs,
      span,
    })))
  }

  fn parse_switch_statement(&mut self) -> ParserResult<ASTStatement> {
    let start = self.expect(TokenType::Switch)?.span.clone();

    let (init, tag, type_guard) = self.with_composite(false, |p| -> ParserResult<_> {
      if p.at(TokenType::LeftBrace) {
        return Ok((None, None, None));
      }

      let first = p.parse_simple_statement()?;
      let (init, guard_stmt) = if p.eat(TokenType::SemiColon) {
        if p.at(TokenType::LeftBrace) {
          return Ok((Some(Box::new(first)), None, None));
        }
        (Some(Box::new(first)), p.parse_simple_statement()?)
      } else {
        (None, first)
      };

      match guard_stmt {
        ASTStatement::Expr(ASTExpression::TypeAssert {
          expr,
          typ: None,
          span,
        }) => Ok((
          init,
          None,
          Some(ASTTypeSwitchGuard {
            binding: None,
            expr: *expr,
            span,
          }),
        )),
        ASTStatement::Assign(assign)
          if assign.op == AssignOp::Define
            && assign.lhs.len() == 1
            && assign.rhs.len() == 1
            && matches!(assign.rhs[0], ASTExpression::TypeAssert { typ: None, .. }) =>
        {
          let binding = match &assign.lhs[0] {
            ASTExpression::Ident(ident) => Some(ident.clone()),
            _ => None,
          };
          let ASTExpression::TypeAssert { expr, span, .. } = assign.rhs.into_iter().next().unwrap() else {
            unreachable!()
          };
          Ok((
            init,
            None,
            Some(ASTTypeSwitchGuard {
              binding,
              expr: *expr,
              span,
            }),
          ))
        },
        ASTStatement::Expr(tag) => Ok((init, Some(tag), None)),
        other => Err(DiagnosticMessage::ExpectedExpression(other.span().clone())),
      }
    })?;

    self.expect(TokenType::LeftBrace)?;
    let mut cases = Vec::new();
    while !self.at(TokenType::RightBrace) && !self.at(TokenType::Eof) {
      if self.eat(TokenType::SemiColon) {
        continue;
      }
      cases.push(self.parse_case_clause()?);
    }
    self.expect(TokenType::RightBrace)?;

    let span = start.to(&self.previous().span);
    Ok(ASTStatement::Switch(ASTSwitchStatement {
      init,
      tag,
      type_guard,
      cases,
      span,
    }))
  }

  fn parse_case_clause(&mut self) -> ParserResult<ASTCaseClause> {
    let start = self.peek().span.clone();
    let mut exprs = Vec::new();

    if self.eat(TokenType::Case) {
      loop {
        exprs.push(self.parse_expression(0)?);
        if !self.eat(TokenType::Comma) {
          break;
        }
      }
    } else {
      self.expect(TokenType::Default)?;
    }
    self.expect(TokenType::Colon)?;

    let mut body = Vec::new();
    while !self.at(TokenType::Case) && !self.at(TokenType::Default) && !self.at(TokenType::RightBrace) {
      if self.eat(TokenType::SemiColon) {
        continue;
      }
      body.push(self.parse_statement()?);
      self.eat(TokenType::SemiColon);
    }

    let span = start.to(&self.previous().span);
    Ok(ASTCaseClause { exprs, body, span })
  }
}

enum ForFirst {
  Range(ForHeader),
  Stmt(ASTStatement),
}
