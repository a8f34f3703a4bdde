use fo_diagnostics::message::DiagnosticMessage;
use fo_token::{token::Token, token_types::TokenType};
use fo_type::source::{FileId, Span};

type LexerResult = Result<TokenType, Box<DiagnosticMessage>>;

/// Hand-rolled scanner for the dialect. Newlines terminate statements the
/// way the base language defines it: a semicolon is inserted after tokens
/// that can end a statement.
pub struct FoLexer<'a> {
  file: FileId,
  source: &'a str,
  chars: std::str::Chars<'a>,
  pub tokens: Vec<Token>,
  start: usize,
  current: usize,
  pub diagnostics: Vec<DiagnosticMessage>,
}

impl<'a> FoLexer<'a> {
  pub fn new(
    file: FileId,
    source: &'a str,
  ) -> Self {
    Self {
      file,
      chars: source.chars(),
      source,
      tokens: vec![],
      start: 0,
      current: 0,
      diagnostics: vec![],
    }
  }

  fn mk_span(
    &self,
    start: usize,
    end: usize,
  ) -> Span {
    Span::new(self.file, start as u32, end as u32)
  }

  pub fn scan_tokens(&mut self) {
    loop {
      self.start = self.current;

      match self.scan_token() {
        Ok(TokenType::Whitespace) => {},
        Ok(token_type) => self.add_token(token_type),
        Err(err) => {
          self.diagnostics.push(*err);
          if self.current == self.start && !self.is_at_end() {
            self.advance();
          }
        },
      }

      if self.is_at_end() {
        break;
      }
    }

    self.insert_semicolon();
    self.tokens.push(Token::new(
      TokenType::Eof,
      String::new(),
      self.mk_span(self.current, self.current),
    ));
  }

  fn add_token(
    &mut self,
    token_type: TokenType,
  ) {
    let lexeme = self.source[self.start..self.current].to_string();
    let span = self.mk_span(self.start, self.current);
    self.tokens.push(Token::new(token_type, lexeme, span));
  }

  /// Automatic semicolon insertion: called on every newline and at end of
  /// input.
  fn insert_semicolon(&mut self) {
    let terminates = self
      .tokens
      .last()
      .map(|t| t.type_.inserts_semicolon())
      .unwrap_or(false);
    if terminates {
      let span = self.mk_span(self.start, self.start);
      self.tokens.push(Token::new(TokenType::SemiColon, "\n".to_string(), span));
    }
  }

  fn is_at_end(&self) -> bool {
    self.chars.as_str().is_empty()
  }

  fn scan_token(&mut self) -> LexerResult {
    let c: char = self.advance();

    match c {
      '(' => Ok(TokenType::LeftParen),
      ')' => Ok(TokenType::RightParen),
      '{' => Ok(TokenType::LeftBrace),
      '}' => Ok(TokenType::RightBrace),
      '[' => Ok(TokenType::LeftBrack),
      ']' => Ok(TokenType::RightBrack),
      ',' => Ok(TokenType::Comma),
      ';' => Ok(TokenType::SemiColon),
      ':' if self.match_char('=') => Ok(TokenType::Define),
      ':' => Ok(TokenType::Colon),
      '.' if self.peek() == '.' && self.peek_next() == '.' => {
        self.advance();
        self.advance();
        Ok(TokenType::Ellipsis)
      },
      '.' if self.peek().is_ascii_digit() => self.number(c),
      '.' => Ok(TokenType::Dot),
      '+' if self.match_char('=') => Ok(TokenType::AddAssign),
      '+' if self.match_char('+') => Ok(TokenType::Increment),
      '+' => Ok(TokenType::Plus),
      '-' if self.match_char('=') => Ok(TokenType::SubAssign),
      '-' if self.match_char('-') => Ok(TokenType::Decrement),
      '-' => Ok(TokenType::Minus),
      '*' if self.match_char('=') => Ok(TokenType::MulAssign),
      '*' => Ok(TokenType::Asterisk),
      '%' if self.match_char('=') => Ok(TokenType::ModAssign),
      '%' => Ok(TokenType::Percent),
      '!' if self.match_char('=') => Ok(TokenType::BangEqual),
      '!' => Ok(TokenType::Bang),
      '=' if self.match_char('=') => Ok(TokenType::EqualEqual),
      '=' => Ok(TokenType::Assign),
      '^' if self.match_char('=') => Ok(TokenType::XorAssign),
      '^' => Ok(TokenType::Caret),
      '<' if self.match_char('-') => Ok(TokenType::Arrow),
      '<' if self.match_char('<') => {
        if self.match_char('=') {
          Ok(TokenType::LeftShiftAssign)
        } else {
          Ok(TokenType::LeftShift)
        }
      },
      '<' if self.match_char('=') => Ok(TokenType::LessEqual),
      '<' => Ok(TokenType::Less),
      '>' if self.match_char('>') => {
        if self.match_char('=') {
          Ok(TokenType::RightShiftAssign)
        } else {
          Ok(TokenType::RightShift)
        }
      },
      '>' if self.match_char('=') => Ok(TokenType::GreaterEqual),
      '>' => Ok(TokenType::Greater),
      '&' if self.match_char('&') => Ok(TokenType::LogicalAnd),
      '&' if self.match_char('^') => {
        if self.match_char('=') {
          Ok(TokenType::AndNotAssign)
        } else {
          Ok(TokenType::AndNot)
        }
      },
      '&' if self.match_char('=') => Ok(TokenType::AndAssign),
      '&' => Ok(TokenType::Ampersand),
      '|' if self.match_char('|') => Ok(TokenType::LogicalOr),
      '|' if self.match_char('=') => Ok(TokenType::OrAssign),
      '|' => Ok(TokenType::Pipe),
      '/' if self.peek() == '/' || self.peek() == '*' => self.comment(),
      '/' if self.match_char('=') => Ok(TokenType::DivAssign),
      '/' => Ok(TokenType::Slash),
      '"' => self.string(),
      '`' => self.raw_string(),
      '\'' => self.rune(),
      c if c.is_ascii_digit() => self.number(c),
      ' ' | '\r' | '\t' => Ok(TokenType::Whitespace),
      '\n' => {
        self.insert_semicolon();
        Ok(TokenType::Whitespace)
      },
      n if n.is_ascii_alphabetic() || n == '_' => self.identifier(),
      _ => Err(Box::new(DiagnosticMessage::InvalidToken(
        self.mk_span(self.start, self.current),
      ))),
    }
  }

  fn peek(&self) -> char {
    self.chars.clone().next().unwrap_or('\0')
  }

  fn peek_next(&self) -> char {
    let mut lookahead = self.chars.clone();
    lookahead.next();
    lookahead.next().unwrap_or('\0')
  }

  fn match_char(
    &mut self,
    expected: char,
  ) -> bool {
    let mut lookahead = self.chars.clone();

    if let Some(next_char) = lookahead.next() {
      if next_char == expected {
        self.chars = lookahead;
        self.current += next_char.len_utf8();
        return true;
      }
    }

    false
  }

  fn advance(&mut self) -> char {
    match self.chars.next() {
      Some(c) => {
        self.current += c.len_utf8();
        c
      },
      None => '\0',
    }
  }

  fn identifier(&mut self) -> LexerResult {
    while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
      self.advance();
    }

    let lexeme = &self.source[self.start..self.current];
    Ok(TokenType::keyword(lexeme).unwrap_or(TokenType::Ident))
  }

  fn number(
    &mut self,
    first: char,
  ) -> LexerResult {
    let mut is_float = first == '.';

    if first == '0' && (self.peek() == 'x' || self.peek() == 'X') {
      self.advance();
      if !self.peek().is_ascii_hexdigit() {
        return Err(Box::new(DiagnosticMessage::MalformedNumber(
          self.mk_span(self.start, self.current),
        )));
      }
      while self.peek().is_ascii_hexdigit() {
        self.advance();
      }
      return Ok(TokenType::Int);
    }

    if first == '0' && (self.peek() == 'b' || self.peek() == 'B') {
      self.advance();
      if self.peek() != '0' && self.peek() != '1' {
        return Err(Box::new(DiagnosticMessage::MalformedNumber(
          self.mk_span(self.start, self.current),
        )));
      }
      while self.peek() == '0' || self.peek() == '1' {
        self.advance();
      }
      return Ok(TokenType::Int);
    }

    while self.peek().is_ascii_digit() {
      self.advance();
    }

    if !is_float && self.peek() == '.' && self.peek_next() != '.' {
      is_float = true;
      self.advance();
      while self.peek().is_ascii_digit() {
        self.advance();
      }
    }

    if self.peek() == 'e' || self.peek() == 'E' {
      is_float = true;
      self.advance();
      if self.peek() == '+' || self.peek() == '-' {
        self.advance();
      }
      while self.peek().is_ascii_digit() {
        self.advance();
      }
    }

    if self.peek() == 'i' {
      self.advance();
      return Ok(TokenType::Imag);
    }

    Ok(if is_float { TokenType::Float } else { TokenType::Int })
  }

  fn string(&mut self) -> LexerResult {
    while !self.is_at_end() && self.peek() != '"' && self.peek() != '\n' {
      if self.peek() == '\\' {
        self.advance();
        if self.is_at_end() {
          break;
        }
      }
      self.advance();
    }

    if self.is_at_end() || self.peek() == '\n' {
      return Err(Box::new(DiagnosticMessage::UnterminatedString(
        self.mk_span(self.start, self.current),
      )));
    }

    self.advance();
    Ok(TokenType::String)
  }

  fn raw_string(&mut self) -> LexerResult {
    while !self.is_at_end() && self.peek() != '`' {
      self.advance();
    }

    if self.is_at_end() {
      return Err(Box::new(DiagnosticMessage::UnterminatedString(
        self.mk_span(self.start, self.current),
      )));
    }

    self.advance();
    Ok(TokenType::String)
  }

  fn rune(&mut self) -> LexerResult {
    while !self.is_at_end() && self.peek() != '\'' && self.peek() != '\n' {
      if self.peek() == '\\' {
        self.advance();
        if self.is_at_end() {
          break;
        }
      }
      self.advance();
    }

    if self.is_at_end() || self.peek() == '\n' {
      return Err(Box::new(DiagnosticMessage::UnterminatedRune(
        self.mk_span(self.start, self.current),
      )));
    }

    self.advance();
    Ok(TokenType::Rune)
  }

  fn comment(&mut self) -> LexerResult {
    if self.match_char('/') {
      while !self.is_at_end() && self.peek() != '\n' {
        self.advance();
      }
      return Ok(TokenType::Whitespace);
    }

    // block comment; one spanning a newline terminates a statement like a
    // newline would
    self.advance();
    let mut has_newline = false;
    loop {
      if self.is_at_end() {
        return Err(Box::new(DiagnosticMessage::UnterminatedComment(
          self.mk_span(self.start, self.current),
        )));
      }
      if self.peek() == '\n' {
        has_newline = true;
      }
      if self.peek() == '*' && self.peek_next() == '/' {
        self.advance();
        self.advance();
        break;
      }
      self.advance();
    }

    if has_newline {
      self.insert_semicolon();
    }
    Ok(TokenType::Whitespace)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use fo_type::source::SourceMap;

  fn scan(src: &str) -> Vec<TokenType> {
    let mut sm = SourceMap::new();
    let file = sm.add_file("test.fo", src.to_string());
    let mut lexer = FoLexer::new(file, src);
    lexer.scan_tokens();
    assert!(lexer.diagnostics.is_empty(), "lexer errors: {:?}", lexer.diagnostics);
    lexer.tokens.iter().map(|t| t.type_).collect()
  }

  #[test]
  fn semicolons_are_inserted_at_newlines() {
    let tokens = scan("x := 1\ny := 2\n");
    assert_eq!(tokens, vec![
      TokenType::Ident,
      TokenType::Define,
      TokenType::Int,
      TokenType::SemiColon,
      TokenType::Ident,
      TokenType::Define,
      TokenType::Int,
      TokenType::SemiColon,
      TokenType::Eof,
    ]);
  }

  #[test]
  fn no_semicolon_after_operators() {
    let tokens = scan("x :=\n1\n");
    assert_eq!(tokens, vec![
      TokenType::Ident,
      TokenType::Define,
      TokenType::Int,
      TokenType::SemiColon,
      TokenType::Eof,
    ]);
  }

  #[test]
  fn semicolon_inserted_at_eof() {
    let tokens = scan("package main");
    assert_eq!(tokens, vec![
      TokenType::Package,
      TokenType::Ident,
      TokenType::SemiColon,
      TokenType::Eof,
    ]);
  }

  #[test]
  fn brackets_and_generic_syntax() {
    let tokens = scan("type Box[T] struct{}");
    assert_eq!(tokens, vec![
      TokenType::Type,
      TokenType::Ident,
      TokenType::LeftBrack,
      TokenType::Ident,
      TokenType::RightBrack,
      TokenType::Struct,
      TokenType::LeftBrace,
      TokenType::RightBrace,
      TokenType::SemiColon,
      TokenType::Eof,
    ]);
  }

  #[test]
  fn line_comments_act_as_newlines() {
    let tokens = scan("x // trailing\ny");
    assert_eq!(tokens, vec![
      TokenType::Ident,
      TokenType::SemiColon,
      TokenType::Ident,
      TokenType::SemiColon,
      TokenType::Eof,
    ]);
  }
}
