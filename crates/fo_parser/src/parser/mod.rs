use std::{cell::RefCell, rc::Rc};

mod declarations;
mod expression;
mod statement;
mod type_syntax;

use fo_ast::{ASTFile, NodeId};
use fo_diagnostics::message::{DiagnosticMessage, Expected};
use fo_token::{token::Token, token_types::TokenType};
use fo_type::symbol::{SymbolId, SymbolTable};

pub type ParserResult<T> = Result<T, DiagnosticMessage>;

type BindingPower = (u16, u16);

pub struct FoParser {
  diagnostics: Vec<DiagnosticMessage>,
  tokens: Vec<Token>,
  cursor: usize,
  next_node_id: u32,
  /// Composite literals are not allowed at the top level of `if`/`for`/
  /// `switch` headers; parentheses and brackets re-enable them.
  allow_composite: bool,
  symbols: Rc<RefCell<SymbolTable>>,
}

impl FoParser {
  pub fn new(
    tokens: Vec<Token>,
    symbols: Rc<RefCell<SymbolTable>>,
  ) -> Self {
    Self {
      tokens,
      diagnostics: Vec::new(),
      cursor: 0,
      next_node_id: 1,
      allow_composite: true,
      symbols,
    }
  }

  pub fn parse(&mut self) -> Result<ASTFile, Vec<DiagnosticMessage>> {
    match self.parse_file() {
      Ok(file) if self.diagnostics.is_empty() => Ok(file),
      Ok(_) => Err(std::mem::take(&mut self.diagnostics)),
      Err(e) => {
        self.diagnostics.push(e);
        Err(std::mem::take(&mut self.diagnostics))
      },
    }
  }

  fn parse_file(&mut self) -> ParserResult<ASTFile> {
    let start = self.peek().span.clone();

    if !self.eat(TokenType::Package) {
      return Err(DiagnosticMessage::ExpectedPackageClause(self.peek().span.clone()));
    }
    let package = self.parse_ident()?;
    self.expect(TokenType::SemiColon)?;

    let mut decls = Vec::new();
    while !self.at(TokenType::Eof) {
      let decl = self.parse_declaration()?;
      decls.push(decl);
      self.eat(TokenType::SemiColon);
    }

    let span = start.to(&self.previous().span);
    Ok(ASTFile::new(package, decls, span))
  }

  pub(crate) fn fresh_node_id(&mut self) -> NodeId {
    let id = NodeId(self.next_node_id);
    self.next_node_id += 1;
    id
  }

  pub(crate) fn peek(&self) -> &Token {
    self.tokens.get(self.cursor).unwrap()
  }

  pub(crate) fn peek_type(&self) -> TokenType {
    self.peek().type_
  }

  pub(crate) fn peek_nth(
    &self,
    n: usize,
  ) -> TokenType {
    self
      .tokens
      .get(self.cursor + n)
      .map(|t| t.type_)
      .unwrap_or(TokenType::Eof)
  }

  pub(crate) fn previous(&self) -> &Token {
    self.tokens.get(self.cursor.saturating_sub(1)).unwrap()
  }

  pub(crate) fn at(
    &self,
    token_type: TokenType,
  ) -> bool {
    self.peek_type() == token_type
  }

  pub(crate) fn eat(
    &mut self,
    token_type: TokenType,
  ) -> bool {
    if self.at(token_type) {
      self.bump();
      true
    } else {
      false
    }
  }

  pub(crate) fn expect(
    &mut self,
    token_type: TokenType,
  ) -> ParserResult<&Token> {
    if self.at(token_type) {
      return Ok(self.bump());
    }

    Err(DiagnosticMessage::ExpectedToken {
      expected: Expected::Token(token_type),
      at: self.peek().span.clone(),
    })
  }

  /// Advances the cursor to the next token.
  pub(crate) fn bump(&mut self) -> &Token {
    let token = self.tokens.get(self.cursor).unwrap();
    if self.cursor < self.tokens.len() - 1 {
      self.cursor += 1;
    }
    token
  }

  #[inline]
  pub(crate) fn intern(
    &mut self,
    name: &str,
  ) -> SymbolId {
    self.symbols.borrow_mut().intern(name)
  }

  pub(crate) fn parse_ident(&mut self) -> ParserResult<fo_ast::ASTIdent> {
    if !self.at(TokenType::Ident) {
      return Err(DiagnosticMessage::ExpectedIdentifier(self.peek().span.clone()));
    }
    let token = self.bump();
    let span = token.span.clone();
    let lexeme = token.lexeme.clone();
    let name = self.intern(&lexeme);
    let id = self.fresh_node_id();
    Ok(fo_ast::ASTIdent::new(id, name, span))
  }

  pub(crate) fn with_composite<T>(
    &mut self,
    allow: bool,
    f: impl FnOnce(&mut Self) -> T,
  ) -> T {
    let saved = self.allow_composite;
    self.allow_composite = allow;
    let result = f(self);
    self.allow_composite = saved;
    result
  }

  pub(crate) fn composite_allowed(&self) -> bool {
    self.allow_composite
  }

  #[inline]
  /// Returns the binding power of an infix operator token. All binary
  /// operators of the base language are left-associative.
  pub(crate) fn binding_powers(
    &self,
    op: &TokenType,
  ) -> Option<BindingPower> {
    let p = match op {
      TokenType::LogicalOr => (1, 2),
      TokenType::LogicalAnd => (3, 4),

      TokenType::EqualEqual
      | TokenType::BangEqual
      | TokenType::Less
      | TokenType::LessEqual
      | TokenType::Greater
      | TokenType::GreaterEqual => (5, 6),

      TokenType::Plus | TokenType::Minus | TokenType::Pipe | TokenType::Caret => (7, 8),

      TokenType::Asterisk
      | TokenType::Slash
      | TokenType::Percent
      | TokenType::LeftShift
      | TokenType::RightShift
      | TokenType::Ampersand
      | TokenType::AndNot => (9, 10),

      _ => return None,
    };
    Some(p)
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use fo_ast::{ASTDeclaration, ASTExpression, ASTFile};
  use fo_type::source::SourceMap;
  use fo_type::symbol::SymbolTable;

  use crate::FoLexer;
  use super::FoParser;

  fn parse(src: &str) -> ASTFile {
    let mut sm = SourceMap::new();
    let file = sm.add_file("test.fo", src.to_string());
    let mut lexer = FoLexer::new(file, src);
    lexer.scan_tokens();
    assert!(lexer.diagnostics.is_empty(), "lexer errors: {:?}", lexer.diagnostics);

    let symbols = Rc::new(RefCell::new(SymbolTable::new()));
    let mut parser = FoParser::new(lexer.tokens, symbols);
    parser.parse().expect("parse failed")
  }

  #[test]
  fn single_param_type_spec_stays_an_array_head() {
    let file = parse("package main\n\ntype Box[T] struct {\n\tval T\n}\n");
    let ASTDeclaration::Type(decl) = &file.decls[0] else {
      panic!("expected a type declaration")
    };
    let spec = &decl.specs[0];
    // the ambiguous head is left for resolution
    assert!(spec.type_params.is_none());
    assert!(matches!(spec.typ, ASTExpression::ArrayType { len: Some(_), .. }));
  }

  #[test]
  fn multi_param_type_spec_has_explicit_params() {
    let file = parse("package main\n\ntype Tuple[T, U] struct {\n\tfirst T\n\tsecond U\n}\n");
    let ASTDeclaration::Type(decl) = &file.decls[0] else {
      panic!("expected a type declaration")
    };
    let spec = &decl.specs[0];
    assert_eq!(spec.type_params.as_ref().map(|tp| tp.len()), Some(2));
  }

  #[test]
  fn single_bracket_in_expression_position_is_an_index() {
    let file = parse("package main\n\nfunc main() {\n\tBox[int](5)\n}\n");
    let ASTDeclaration::Func(func) = &file.decls[0] else {
      panic!("expected a function")
    };
    let body = func.body.as_ref().unwrap();
    let fo_ast::ASTStatement::Expr(ASTExpression::Call(call)) = &body.statements[0] else {
      panic!("expected a call statement")
    };
    assert!(matches!(call.func.as_ref(), ASTExpression::Index(_)));
  }

  #[test]
  fn multi_bracket_in_expression_position_is_an_application() {
    let file = parse("package main\n\nfunc main() {\n\tvar _ = Tuple[int, string]{}\n}\n");
    let ASTDeclaration::Func(func) = &file.decls[0] else {
      panic!("expected a function")
    };
    let body = func.body.as_ref().unwrap();
    let fo_ast::ASTStatement::Decl(ASTDeclaration::Value(value)) = &body.statements[0] else {
      panic!("expected a var declaration")
    };
    let ASTExpression::CompositeLit(lit) = &value.specs[0].values[0] else {
      panic!("expected a composite literal")
    };
    assert!(matches!(lit.typ.as_deref(), Some(ASTExpression::TypeArg(_))));
  }

  #[test]
  fn methods_parse_receiver_and_own_params() {
    let file = parse("package main\n\nfunc (b B[T]) f0[V](f func(T) V) B[V] {\n\treturn B[V]{}\n}\n");
    let ASTDeclaration::Func(func) = &file.decls[0] else {
      panic!("expected a method")
    };
    assert!(func.recv.is_some());
    assert_eq!(func.type_params.as_ref().map(|tp| tp.len()), Some(1));
  }

  #[test]
  fn type_switch_guard_is_recognized() {
    let file = parse("package main\n\nfunc main() {\n\tswitch x.(type) {\n\tcase int:\n\t}\n}\n");
    let ASTDeclaration::Func(func) = &file.decls[0] else {
      panic!("expected a function")
    };
    let body = func.body.as_ref().unwrap();
    let fo_ast::ASTStatement::Switch(switch) = &body.statements[0] else {
      panic!("expected a switch")
    };
    assert!(switch.type_guard.is_some());
    assert_eq!(switch.cases.len(), 1);
  }
}
