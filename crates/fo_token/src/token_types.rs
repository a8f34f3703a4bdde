#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
  // literals and names
  Ident,
  Int,
  Float,
  Imag,
  Rune,
  String,

  // operators and delimiters
  Plus,
  Minus,
  Asterisk,
  Slash,
  Percent,
  Ampersand,
  Pipe,
  Caret,
  LeftShift,
  RightShift,
  AndNot,
  AddAssign,
  SubAssign,
  MulAssign,
  DivAssign,
  ModAssign,
  AndAssign,
  OrAssign,
  XorAssign,
  LeftShiftAssign,
  RightShiftAssign,
  AndNotAssign,
  LogicalAnd,
  LogicalOr,
  Arrow,
  Increment,
  Decrement,
  EqualEqual,
  Less,
  Greater,
  Assign,
  Bang,
  BangEqual,
  LessEqual,
  GreaterEqual,
  Define,
  Ellipsis,
  LeftParen,
  LeftBrack,
  LeftBrace,
  Comma,
  Dot,
  RightParen,
  RightBrack,
  RightBrace,
  SemiColon,
  Colon,

  // keywords
  Break,
  Case,
  Chan,
  Const,
  Continue,
  Default,
  Defer,
  Else,
  Fallthrough,
  For,
  Func,
  Go,
  Goto,
  If,
  Import,
  Interface,
  Map,
  Package,
  Range,
  Return,
  Select,
  Struct,
  Switch,
  Type,
  Var,

  Whitespace,
  Eof,
}

impl TokenType {
  pub fn keyword(name: &str) -> Option<TokenType> {
    let t = match name {
      "break" => TokenType::Break,
      "case" => TokenType::Case,
      "chan" => TokenType::Chan,
      "const" => TokenType::Const,
      "continue" => TokenType::Continue,
      "default" => TokenType::Default,
      "defer" => TokenType::Defer,
      "else" => TokenType::Else,
      "fallthrough" => TokenType::Fallthrough,
      "for" => TokenType::For,
      "func" => TokenType::Func,
      "go" => TokenType::Go,
      "goto" => TokenType::Goto,
      "if" => TokenType::If,
      "import" => TokenType::Import,
      "interface" => TokenType::Interface,
      "map" => TokenType::Map,
      "package" => TokenType::Package,
      "range" => TokenType::Range,
      "return" => TokenType::Return,
      "select" => TokenType::Select,
      "struct" => TokenType::Struct,
      "switch" => TokenType::Switch,
      "type" => TokenType::Type,
      "var" => TokenType::Var,
      _ => return None,
    };
    Some(t)
  }

  /// Whether a newline directly after a token of this type terminates the
  /// statement (automatic semicolon insertion).
  pub fn inserts_semicolon(&self) -> bool {
    matches!(
      self,
      TokenType::Ident
        | TokenType::Int
        | TokenType::Float
        | TokenType::Imag
        | TokenType::Rune
        | TokenType::String
        | TokenType::Break
        | TokenType::Continue
        | TokenType::Fallthrough
        | TokenType::Return
        | TokenType::Increment
        | TokenType::Decrement
        | TokenType::RightParen
        | TokenType::RightBrack
        | TokenType::RightBrace
    )
  }
}

impl std::fmt::Display for TokenType {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}
