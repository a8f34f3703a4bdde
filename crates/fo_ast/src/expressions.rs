use fo_type::source::Span;
use fo_type::symbol::SymbolId;

use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
  Int,
  Float,
  Imag,
  Rune,
  String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  And,
  Or,
  Xor,
  AndNot,
  Shl,
  Shr,
  LogicalAnd,
  LogicalOr,
  Eq,
  NotEq,
  Less,
  LessEq,
  Greater,
  GreaterEq,
}

impl BinaryOp {
  pub fn as_str(&self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::Rem => "%",
      BinaryOp::And => "&",
      BinaryOp::Or => "|",
      BinaryOp::Xor => "^",
      BinaryOp::AndNot => "&^",
      BinaryOp::Shl => "<<",
      BinaryOp::Shr => ">>",
      BinaryOp::LogicalAnd => "&&",
      BinaryOp::LogicalOr => "||",
      BinaryOp::Eq => "==",
      BinaryOp::NotEq => "!=",
      BinaryOp::Less => "<",
      BinaryOp::LessEq => "<=",
      BinaryOp::Greater => ">",
      BinaryOp::GreaterEq => ">=",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
  Plus,
  Minus,
  Not,
  Xor,
  Addr,
  Recv,
}

impl UnaryOp {
  pub fn as_str(&self) -> &'static str {
    match self {
      UnaryOp::Plus => "+",
      UnaryOp::Minus => "-",
      UnaryOp::Not => "!",
      UnaryOp::Xor => "^",
      UnaryOp::Addr => "&",
      UnaryOp::Recv => "<-",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDirSyntax {
  SendRecv,
  SendOnly,
  RecvOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTIdent {
  pub id: NodeId,
  pub name: SymbolId,
  pub span: Span,
}

impl ASTIdent {
  pub fn new(
    id: NodeId,
    name: SymbolId,
    span: Span,
  ) -> Self {
    Self { id, name, span }
  }

  /// A synthesized identifier with no checker facts attached.
  pub fn synthetic(name: SymbolId) -> Self {
    Self {
      id: NodeId::NONE,
      name,
      span: Span::default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTBasicLit {
  pub kind: LitKind,
  pub value: String,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTSelectorExpr {
  pub id: NodeId,
  pub expr: Box<ASTExpression>,
  pub sel: ASTIdent,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTIndexExpr {
  pub id: NodeId,
  pub expr: Box<ASTExpression>,
  pub index: Box<ASTExpression>,
  pub span: Span,
}

/// Explicit type-argument application `X[T1, ..., Tn]`. The parser only
/// produces this for two or more arguments or in unambiguous type
/// position; a single-argument application in expression position comes
/// through as [`ASTIndexExpr`] and is promoted later.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTTypeArgExpr {
  pub id: NodeId,
  pub expr: Box<ASTExpression>,
  pub types: Vec<ASTExpression>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTCallExpr {
  pub func: Box<ASTExpression>,
  pub args: Vec<ASTExpression>,
  pub ellipsis: bool,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTCompositeElem {
  pub key: Option<ASTExpression>,
  pub value: ASTExpression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTCompositeLit {
  pub typ: Option<Box<ASTExpression>>,
  pub elems: Vec<ASTCompositeElem>,
  pub span: Span,
}

/// A named group in a field list: struct fields, parameters, results,
/// interface methods (one name plus a function type) or embedded types
/// (no names).
#[derive(Debug, Clone, PartialEq)]
pub struct ASTFieldGroup {
  pub names: Vec<ASTIdent>,
  pub typ: ASTExpression,
  pub tag: Option<String>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTStructType {
  pub fields: Vec<ASTFieldGroup>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTFuncType {
  pub params: Vec<ASTFieldGroup>,
  pub results: Vec<ASTFieldGroup>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ASTInterfaceType {
  pub methods: Vec<ASTFieldGroup>,
  pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ASTExpression {
  Ident(ASTIdent),
  BasicLit(ASTBasicLit),
  CompositeLit(ASTCompositeLit),
  FuncLit {
    typ: ASTFuncType,
    body: crate::statements::ASTBlock,
    span: Span,
  },
  Paren {
    expr: Box<ASTExpression>,
    span: Span,
  },
  Selector(ASTSelectorExpr),
  Index(ASTIndexExpr),
  Slice {
    expr: Box<ASTExpression>,
    low: Option<Box<ASTExpression>>,
    high: Option<Box<ASTExpression>>,
    span: Span,
  },
  /// `x.(T)`; `typ` is `None` for the `x.(type)` switch guard form.
  TypeAssert {
    expr: Box<ASTExpression>,
    typ: Option<Box<ASTExpression>>,
    span: Span,
  },
  Call(ASTCallExpr),
  Star {
    expr: Box<ASTExpression>,
    span: Span,
  },
  Unary {
    op: UnaryOp,
    expr: Box<ASTExpression>,
    span: Span,
  },
  Binary {
    op: BinaryOp,
    left: Box<ASTExpression>,
    right: Box<ASTExpression>,
    span: Span,
  },
  TypeArg(ASTTypeArgExpr),

  // type syntax shares the expression space, as in the base language
  ArrayType {
    len: Option<Box<ASTExpression>>,
    elem: Box<ASTExpression>,
    span: Span,
  },
  Ellipsis {
    elem: Option<Box<ASTExpression>>,
    span: Span,
  },
  StructType(ASTStructType),
  FuncType(ASTFuncType),
  InterfaceType(ASTInterfaceType),
  MapType {
    key: Box<ASTExpression>,
    value: Box<ASTExpression>,
    span: Span,
  },
  ChanType {
    dir: ChanDirSyntax,
    value: Box<ASTExpression>,
    span: Span,
  },

  Bad {
    span: Span,
  },
}

impl ASTExpression {
  pub fn span(&self) -> &Span {
    match self {
      ASTExpression::Ident(e) => &e.span,
      ASTExpression::BasicLit(e) => &e.span,
      ASTExpression::CompositeLit(e) => &e.span,
      ASTExpression::FuncLit { span, .. } => span,
      ASTExpression::Paren { span, .. } => span,
      ASTExpression::Selector(e) => &e.span,
      ASTExpression::Index(e) => &e.span,
      ASTExpression::Slice { span, .. } => span,
      ASTExpression::TypeAssert { span, .. } => span,
      ASTExpression::Call(e) => &e.span,
      ASTExpression::Star { span, .. } => span,
      ASTExpression::Unary { span, .. } => span,
      ASTExpression::Binary { span, .. } => span,
      ASTExpression::TypeArg(e) => &e.span,
      ASTExpression::ArrayType { span, .. } => span,
      ASTExpression::Ellipsis { span, .. } => span,
      ASTExpression::StructType(e) => &e.span,
      ASTExpression::FuncType(e) => &e.span,
      ASTExpression::InterfaceType(e) => &e.span,
      ASTExpression::MapType { span, .. } => span,
      ASTExpression::ChanType { span, .. } => span,
      ASTExpression::Bad { span } => span,
    }
  }

  pub fn as_ident(&self) -> Option<&ASTIdent> {
    match self {
      ASTExpression::Ident(ident) => Some(ident),
      _ => None,
    }
  }
}
