use fo_ast::{
  ASTDeclaration, ASTFuncDecl, ASTImportDecl, ASTImportSpec, ASTReceiver, ASTTypeDecl, ASTTypeParamDecl, ASTTypeSpec,
  ASTValueDecl, ASTValueSpec, ValueKind,
};
use fo_diagnostics::message::DiagnosticMessage;
use fo_token::token_types::TokenType;

use super::type_syntax::unquote;
use super::{FoParser, ParserResult};

impl FoParser {
  pub(crate) fn parse_declaration(&mut self) -> ParserResult<ASTDeclaration> {
    match self.peek_type() {
      TokenType::Import => self.parse_import_decl(),
      TokenType::Type => self.parse_type_decl(),
      TokenType::Var | TokenType::Const => self.parse_value_decl(),
      TokenType::Func => self.parse_func_decl(),
      _ => Err(DiagnosticMessage::ExpectedDeclaration(self.peek().span.clone())),
    }
  }

  fn parse_import_decl(&mut self) -> ParserResult<ASTDeclaration> {
    let start = self.expect(TokenType::Import)?.span.clone();

    let mut specs = Vec::new();
    let grouped = self.eat(TokenType::LeftParen);
    if grouped {
      while !self.at(TokenType::RightParen) && !self.at(TokenType::Eof) {
        if self.eat(TokenType::SemiColon) {
          continue;
        }
        specs.push(self.parse_import_spec()?);
      }
      self.expect(TokenType::RightParen)?;
    } else {
      specs.push(self.parse_import_spec()?);
    }

    let span = start.to(&self.previous().span);
    Ok(ASTDeclaration::Import(ASTImportDecl { specs, grouped, span }))
  }

  fn parse_import_spec(&mut self) -> ParserResult<ASTImportSpec> {
    let start = self.peek().span.clone();
    let alias = if self.at(TokenType::Ident) {
      Some(self.parse_ident()?)
    } else {
      None
    };
    let path_token = self.expect(TokenType::String)?;
    let path = unquote(&path_token.lexeme);
    let span = start.to(&self.previous().span);
    Ok(ASTImportSpec { alias, path, span })
  }

  pub(crate) fn parse_type_decl(&mut self) -> ParserResult<ASTDeclaration> {
    let start = self.expect(TokenType::Type)?.span.clone();

    let mut specs = Vec::new();
    let grouped = self.eat(TokenType::LeftParen);
    if grouped {
      while !self.at(TokenType::RightParen) && !self.at(TokenType::Eof) {
        if self.eat(TokenType::SemiColon) {
          continue;
        }
        specs.push(self.parse_type_spec()?);
      }
      self.expect(TokenType::RightParen)?;
    } else {
      specs.push(self.parse_type_spec()?);
    }

    let span = start.to(&self.previous().span);
    Ok(ASTDeclaration::Type(ASTTypeDecl { specs, grouped, span }))
  }

  /// `name body`, `name = body`, `name[T, U] body`.
  ///
  /// A single-parameter head (`name[T] body`) is indistinguishable here
  /// from an array type whose length is a constant identifier, so it is
  /// left as an `ArrayType` body; the checker reinterprets it once names
  /// resolve.
  fn parse_type_spec(&mut self) -> ParserResult<ASTTypeSpec> {
    let start = self.peek().span.clone();
    let name = self.parse_ident()?;

    let type_params = if self.at(TokenType::LeftBrack)
      && self.peek_nth(1) == TokenType::Ident
      && self.peek_nth(2) == TokenType::Comma
    {
      Some(self.parse_type_param_decl()?)
    } else {
      None
    };

    let is_alias = self.eat(TokenType::Assign);
    let typ = self.parse_type()?;
    let span = start.to(&self.previous().span);
    Ok(ASTTypeSpec {
      name,
      type_params,
      is_alias,
      typ,
      span,
    })
  }

  fn parse_type_param_decl(&mut self) -> ParserResult<ASTTypeParamDecl> {
    let start = self.expect(TokenType::LeftBrack)?.span.clone();
    let mut names = Vec::new();
    loop {
      names.push(self.parse_ident()?);
      if !self.eat(TokenType::Comma) {
        break;
      }
    }
    self.expect(TokenType::RightBrack)?;
    let span = start.to(&self.previous().span);
    Ok(ASTTypeParamDecl::new(names, span))
  }

  pub(crate) fn parse_value_decl(&mut self) -> ParserResult<ASTDeclaration> {
    let keyword = self.bump();
    let kind = match keyword.type_ {
      TokenType::Var => ValueKind::Var,
      TokenType::Const => ValueKind::Const,
      _ => unreachable!("parse_value_decl on non-var/const token"),
    };
    let start = keyword.span.clone();

    let mut specs = Vec::new();
    let grouped = self.eat(TokenType::LeftParen);
    if grouped {
      while !self.at(TokenType::RightParen) && !self.at(TokenType::Eof) {
        if self.eat(TokenType::SemiColon) {
          continue;
        }
        specs.push(self.parse_value_spec()?);
      }
      self.expect(TokenType::RightParen)?;
    } else {
      specs.push(self.parse_value_spec()?);
    }

    let span = start.to(&self.previous().span);
    Ok(ASTDeclaration::Value(ASTValueDecl {
      kind,
      specs,
      grouped,
      span,
    }))
  }

  fn parse_value_spec(&mut self) -> ParserResult<ASTValueSpec> {
    let start = self.peek().span.clone();
    let mut names = vec![self.parse_ident()?];
    while self.eat(TokenType::Comma) {
      names.push(self.parse_ident()?);
    }

    let typ = if self.at(TokenType::Assign) || self.at(TokenType::SemiColon) || self.at(TokenType::RightParen) {
      None
    } else {
      Some(self.parse_type()?)
    };

    let mut values = Vec::new();
    if self.eat(TokenType::Assign) {
      loop {
        values.push(self.parse_expression(0)?);
        if !self.eat(TokenType::Comma) {
          break;
        }
      }
    }

    let span = start.to(&self.previous().span);
    Ok(ASTValueSpec {
      names,
      typ,
      values,
      span,
    })
  }

  fn parse_func_decl(&mut self) -> ParserResult<ASTDeclaration> {
    let start = self.expect(TokenType::Func)?.span.clone();

    let recv = if self.at(TokenType::LeftParen) {
      Some(self.parse_receiver()?)
    } else {
      None
    };

    let name = self.parse_ident()?;

    let type_params = if self.at(TokenType::LeftBrack) {
      Some(self.parse_type_param_decl()?)
    } else {
      None
    };

    let sig_start = self.peek().span.clone();
    let sig = self.parse_func_type(sig_start)?;

    let body = if self.at(TokenType::LeftBrace) {
      Some(self.parse_block()?)
    } else {
      None
    };

    let span = start.to(&self.previous().span);
    Ok(ASTDeclaration::Func(ASTFuncDecl {
      recv,
      name,
      type_params,
      sig,
      body,
      span,
    }))
  }

  /// `(r T)`, `(T)`, `(r *T)`, `(*T)`, `(r T[U])`, `(T[U])`.
  fn parse_receiver(&mut self) -> ParserResult<ASTReceiver> {
    let start = self.expect(TokenType::LeftParen)?.span.clone();

    let name = if self.at(TokenType::Ident)
      && !matches!(
        self.peek_nth(1),
        TokenType::RightParen | TokenType::LeftBrack | TokenType::Dot
      ) {
      Some(self.parse_ident()?)
    } else {
      None
    };

    let typ = self.parse_type()?;
    self.expect(TokenType::RightParen)?;
    let span = start.to(&self.previous().span);
    Ok(ASTReceiver { name, typ, span })
  }
}
