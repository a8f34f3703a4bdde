use std::fmt;

use fo_token::token_types::TokenType;
use fo_type::source::Span;

use crate::diagnostic_report::{Diagnostic, Severity};

#[derive(Clone, Debug, PartialEq)]
pub enum Expected {
  Token(TokenType),
  Keyword(&'static str),
  Thing(&'static str),
}

impl fmt::Display for Expected {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Expected::Token(t) => write!(f, "{:?}", t),
      Expected::Keyword(k) => write!(f, "keyword '{}'", k),
      Expected::Thing(t) => write!(f, "{}", t),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticMessage {
  // #region Lexer
  InvalidToken(Span),
  UnterminatedString(Span),
  UnterminatedRune(Span),
  UnterminatedComment(Span),
  InvalidEscapeSequence(Span),
  MalformedNumber(Span),
  // #endregion Lexer
  // #region Parser
  ExpectedToken {
    expected: Expected,
    at: Span,
  },
  UnexpectedToken {
    at: Span,
  },
  ExpectedExpression(Span),
  ExpectedType(Span),
  ExpectedIdentifier(Span),
  ExpectedDeclaration(Span),
  ExpectedPackageClause(Span),
  // #endregion Parser
  // #region Checker
  UndeclaredName {
    name: String,
    span: Span,
  },
  NotAType {
    name: String,
    span: Span,
  },
  NameRedeclared {
    name: String,
    span: Span,
    previous_span: Span,
  },
  /// Type arguments applied to something that is not a generic type.
  TypeArgumentsForNonGeneric {
    typ: String,
    span: Span,
  },
  /// Arity mismatch at an application site.
  WrongNumberOfTypeArguments {
    expected: usize,
    got: usize,
    span: Span,
  },
  /// A generic name used without type arguments where a type is required.
  MissingTypeArguments {
    typ: String,
    span: Span,
  },
  DuplicateTypeParam {
    name: String,
    span: Span,
  },
  CyclicDeclaration {
    name: String,
    span: Span,
    path: Vec<String>,
  },
  UnknownReceiverType {
    name: String,
    span: Span,
  },
  InvalidReceiverForm(Span),
  /// A concrete type appears in a receiver bracket where a type parameter
  /// is expected.
  ReceiverParamConcrete {
    name: String,
    span: Span,
  },
  ReceiverParamNotIdent(Span),
  AmbiguousIndex(Span),
  // #endregion Checker
  // #region Transformer
  UnsupportedTypeArgumentTarget(Span),
  // #endregion Transformer
}

impl fmt::Display for DiagnosticMessage {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      DiagnosticMessage::InvalidToken(_) => write!(f, "invalid token"),
      DiagnosticMessage::UnterminatedString(_) => write!(f, "string literal not terminated"),
      DiagnosticMessage::UnterminatedRune(_) => write!(f, "rune literal not terminated"),
      DiagnosticMessage::UnterminatedComment(_) => write!(f, "comment not terminated"),
      DiagnosticMessage::InvalidEscapeSequence(_) => write!(f, "invalid escape sequence"),
      DiagnosticMessage::MalformedNumber(_) => write!(f, "malformed number literal"),
      DiagnosticMessage::ExpectedToken { expected, .. } => write!(f, "expected {}", expected),
      DiagnosticMessage::UnexpectedToken { .. } => write!(f, "unexpected token"),
      DiagnosticMessage::ExpectedExpression(_) => write!(f, "expected expression"),
      DiagnosticMessage::ExpectedType(_) => write!(f, "expected type"),
      DiagnosticMessage::ExpectedIdentifier(_) => write!(f, "expected identifier"),
      DiagnosticMessage::ExpectedDeclaration(_) => write!(f, "expected declaration"),
      DiagnosticMessage::ExpectedPackageClause(_) => write!(f, "expected 'package' clause"),
      DiagnosticMessage::UndeclaredName { name, .. } => write!(f, "undeclared name: {}", name),
      DiagnosticMessage::NotAType { name, .. } => write!(f, "{} is not a type", name),
      DiagnosticMessage::NameRedeclared { name, .. } => write!(f, "{} redeclared in this block", name),
      DiagnosticMessage::TypeArgumentsForNonGeneric { typ, .. } => {
        write!(f, "type arguments provided for non-generic type {}", typ)
      },
      DiagnosticMessage::WrongNumberOfTypeArguments { expected, got, .. } => {
        write!(f, "wrong number of type arguments (expected {} but got {})", expected, got)
      },
      DiagnosticMessage::MissingTypeArguments { typ, .. } => {
        write!(f, "missing type arguments for generic type {}", typ)
      },
      DiagnosticMessage::DuplicateTypeParam { name, .. } => {
        write!(f, "duplicate type parameter name {}", name)
      },
      DiagnosticMessage::CyclicDeclaration { name, path, .. } => {
        write!(f, "illegal cycle in declaration of {}", name)?;
        for p in path {
          write!(f, "; {} refers to", p)?;
        }
        if !path.is_empty() {
          write!(f, "; {}", name)?;
        }
        Ok(())
      },
      DiagnosticMessage::UnknownReceiverType { name, .. } => {
        write!(f, "could not find declaration for receiver type {}", name)
      },
      DiagnosticMessage::InvalidReceiverForm(_) => {
        write!(f, "receiver type must be of the form T, T[...], *T, or *T[...] where T is a type name")
      },
      DiagnosticMessage::ReceiverParamConcrete { name, .. } => {
        write!(f, "type parameters in method receiver cannot be concrete types ({})", name)
      },
      DiagnosticMessage::ReceiverParamNotIdent(_) => {
        write!(f, "type parameters in method receiver must be identifiers")
      },
      DiagnosticMessage::AmbiguousIndex(_) => {
        write!(f, "cannot disambiguate index expression over a generic name")
      },
      DiagnosticMessage::UnsupportedTypeArgumentTarget(_) => {
        write!(f, "type arguments are not supported for an expression of this form")
      },
    }
  }
}

impl DiagnosticMessage {
  pub fn primary_span(&self) -> Span {
    match self {
      DiagnosticMessage::InvalidToken(at)
      | DiagnosticMessage::UnterminatedString(at)
      | DiagnosticMessage::UnterminatedRune(at)
      | DiagnosticMessage::UnterminatedComment(at)
      | DiagnosticMessage::InvalidEscapeSequence(at)
      | DiagnosticMessage::MalformedNumber(at)
      | DiagnosticMessage::ExpectedToken { at, .. }
      | DiagnosticMessage::UnexpectedToken { at }
      | DiagnosticMessage::ExpectedExpression(at)
      | DiagnosticMessage::ExpectedType(at)
      | DiagnosticMessage::ExpectedIdentifier(at)
      | DiagnosticMessage::ExpectedDeclaration(at)
      | DiagnosticMessage::ExpectedPackageClause(at)
      | DiagnosticMessage::InvalidReceiverForm(at)
      | DiagnosticMessage::ReceiverParamNotIdent(at)
      | DiagnosticMessage::AmbiguousIndex(at)
      | DiagnosticMessage::UnsupportedTypeArgumentTarget(at) => at.clone(),

      DiagnosticMessage::UndeclaredName { span, .. }
      | DiagnosticMessage::NotAType { span, .. }
      | DiagnosticMessage::NameRedeclared { span, .. }
      | DiagnosticMessage::TypeArgumentsForNonGeneric { span, .. }
      | DiagnosticMessage::WrongNumberOfTypeArguments { span, .. }
      | DiagnosticMessage::MissingTypeArguments { span, .. }
      | DiagnosticMessage::DuplicateTypeParam { span, .. }
      | DiagnosticMessage::CyclicDeclaration { span, .. }
      | DiagnosticMessage::UnknownReceiverType { span, .. }
      | DiagnosticMessage::ReceiverParamConcrete { span, .. } => span.clone(),
    }
  }

  pub fn code(&self) -> String {
    match self {
      DiagnosticMessage::InvalidToken(_) => "L0001",
      DiagnosticMessage::UnterminatedString(_) => "L0002",
      DiagnosticMessage::UnterminatedRune(_) => "L0003",
      DiagnosticMessage::UnterminatedComment(_) => "L0004",
      DiagnosticMessage::InvalidEscapeSequence(_) => "L0005",
      DiagnosticMessage::MalformedNumber(_) => "L0006",
      DiagnosticMessage::ExpectedToken { .. } => "P0001",
      DiagnosticMessage::UnexpectedToken { .. } => "P0002",
      DiagnosticMessage::ExpectedExpression(_) => "P0003",
      DiagnosticMessage::ExpectedType(_) => "P0004",
      DiagnosticMessage::ExpectedIdentifier(_) => "P0005",
      DiagnosticMessage::ExpectedDeclaration(_) => "P0006",
      DiagnosticMessage::ExpectedPackageClause(_) => "P0007",
      DiagnosticMessage::UndeclaredName { .. } => "C0001",
      DiagnosticMessage::NotAType { .. } => "C0002",
      DiagnosticMessage::NameRedeclared { .. } => "C0003",
      DiagnosticMessage::TypeArgumentsForNonGeneric { .. } => "C0004",
      DiagnosticMessage::WrongNumberOfTypeArguments { .. } => "C0005",
      DiagnosticMessage::MissingTypeArguments { .. } => "C0006",
      DiagnosticMessage::DuplicateTypeParam { .. } => "C0007",
      DiagnosticMessage::CyclicDeclaration { .. } => "C0008",
      DiagnosticMessage::UnknownReceiverType { .. } => "C0009",
      DiagnosticMessage::InvalidReceiverForm(_) => "C0010",
      DiagnosticMessage::ReceiverParamConcrete { .. } => "C0011",
      DiagnosticMessage::ReceiverParamNotIdent(_) => "C0012",
      DiagnosticMessage::AmbiguousIndex(_) => "C0013",
      DiagnosticMessage::UnsupportedTypeArgumentTarget(_) => "T0001",
    }
    .to_string()
  }

  fn level(&self) -> Severity {
    Severity::Error
  }

  fn secondary_labels(&self) -> Vec<(Span, String)> {
    match self {
      DiagnosticMessage::NameRedeclared { previous_span, .. } => {
        vec![(previous_span.clone(), "previous declaration here".to_string())]
      },
      _ => vec![],
    }
  }

  pub fn report(&self) -> Diagnostic {
    let mut diagnostic = Diagnostic::new(self.level(), self.to_string(), self.code(), self.primary_span());
    for (span, message) in self.secondary_labels() {
      diagnostic = diagnostic.with_label(span, message);
    }
    diagnostic
  }
}
