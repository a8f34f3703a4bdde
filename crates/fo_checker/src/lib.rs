mod expr;
pub mod scope;
mod subst;
mod typexpr;

use std::collections::{HashMap, HashSet};
use std::{cell::RefCell, rc::Rc};

use fo_ast::{ASTDeclaration, ASTFile, ASTFuncDecl, ASTTypeSpec, NodeId};
use fo_diagnostics::message::DiagnosticMessage;
use fo_type::generics::GenericRegistry;
use fo_type::source::Span;
use fo_type::symbol::{SymbolId, SymbolTable};
use fo_type::types::{BasicKind, Method, NamedGenerics, Param, SignatureGenerics, TypeId, TypeStore};
use scope::Scope;

pub use subst::Substituter;

/// Index of an object in the checker's [`Objects`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

/// Flat table of every object the checker creates, in declaration order.
#[derive(Debug, Default)]
pub struct Objects {
  table: Vec<Object>,
}

impl Objects {
  pub fn alloc(
    &mut self,
    object: Object,
  ) -> ObjectId {
    let id = ObjectId(self.table.len() as u32);
    self.table.push(object);
    id
  }

  pub fn get(
    &self,
    id: &ObjectId,
  ) -> &Object {
    &self.table[id.0 as usize]
  }

  pub fn get_mut(
    &mut self,
    id: ObjectId,
  ) -> &mut Object {
    &mut self.table[id.0 as usize]
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
  Make,
  New,
  Append,
  Len,
  Cap,
  Copy,
  Delete,
  Panic,
  Print,
  Println,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
  TypeName { is_alias: bool },
  Func,
  Var,
  Const,
  PkgName,
  Builtin(Builtin),
}

#[derive(Debug, Clone)]
pub struct Object {
  pub name: String,
  pub kind: ObjectKind,
  pub typ: TypeId,
  pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
  FieldVal,
  MethodVal,
}

/// Resolved member access, recorded per selector node so the transformer
/// can promote ambiguous index expressions over generic members.
#[derive(Debug, Clone)]
pub struct Selection {
  pub kind: SelectionKind,
  pub recv_origin: Option<String>,
  pub member: String,
}

/// Side tables produced by checking, keyed by parser node ids.
#[derive(Debug, Default)]
pub struct Info {
  pub uses: HashMap<NodeId, ObjectId>,
  pub selections: HashMap<NodeId, Selection>,
}

pub struct CheckerOutput {
  pub store: TypeStore,
  pub registry: GenericRegistry,
  pub objects: Objects,
  pub info: Info,
  pub diagnostics: Vec<DiagnosticMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveState {
  Unresolved,
  InProgress,
  Done,
}

struct PendingTypeDecl {
  spec: ASTTypeSpec,
  type_params: Vec<String>,
  object: ObjectId,
  state: ResolveState,
}

/// Type checker for one package: every file is collected against one
/// shared registry before any transformation runs.
pub struct Checker {
  pub(crate) store: TypeStore,
  pub(crate) registry: GenericRegistry,
  pub(crate) objects: Objects,
  pub(crate) info: Info,
  pub(crate) diagnostics: Vec<DiagnosticMessage>,
  pub(crate) symbols: Rc<RefCell<SymbolTable>>,
  scopes: Vec<Scope>,
  type_decls: HashMap<String, PendingTypeDecl>,
  /// Names on the active resolution path; cleared across indirections so
  /// pointer-guarded self-reference is not a cycle.
  pub(crate) resolving: Vec<String>,
  /// Registry key of the generic declaration whose signature or body is
  /// being checked; partial instantiations become its dependents.
  pub(crate) current_generic: Option<String>,
  foreign: HashMap<(String, String), TypeId>,
}

impl Checker {
  pub fn check(
    files: &[ASTFile],
    symbols: Rc<RefCell<SymbolTable>>,
  ) -> CheckerOutput {
    let mut checker = Checker {
      store: TypeStore::new(),
      registry: GenericRegistry::new(),
      objects: Objects::default(),
      info: Info::default(),
      diagnostics: Vec::new(),
      symbols,
      scopes: Vec::new(),
      type_decls: HashMap::new(),
      resolving: Vec::new(),
      current_generic: None,
      foreign: HashMap::new(),
    };

    checker.scopes.push(Scope::new());
    checker.init_universe();
    checker.scopes.push(Scope::new()); // package scope

    checker.collect(files);
    checker.resolve_all_types();
    checker.check_func_decls(files);
    checker.check_value_decl_types(files);
    checker.check_bodies(files);

    CheckerOutput {
      store: checker.store,
      registry: checker.registry,
      objects: checker.objects,
      info: checker.info,
      diagnostics: checker.diagnostics,
    }
  }

  // ── Scopes and objects ─────────────────────────────────────────────

  pub(crate) fn sym(
    &self,
    id: &SymbolId,
  ) -> String {
    self.symbols.borrow().get(id).to_string()
  }

  pub(crate) fn intern(
    &mut self,
    name: &str,
  ) -> SymbolId {
    self.symbols.borrow_mut().intern(name)
  }

  pub(crate) fn push_scope(&mut self) {
    self.scopes.push(Scope::new());
  }

  pub(crate) fn pop_scope(&mut self) {
    self.scopes.pop();
  }

  pub(crate) fn lookup(
    &self,
    name: &SymbolId,
  ) -> Option<ObjectId> {
    for scope in self.scopes.iter().rev() {
      if let Some(obj) = scope.get(name) {
        return Some(obj);
      }
    }
    None
  }

  pub(crate) fn declare(
    &mut self,
    name: SymbolId,
    object: Object,
  ) -> ObjectId {
    let text = object.name.clone();
    let span = object.span.clone();
    let id = self.objects.alloc(object);
    if text != "_" {
      let scope = self.scopes.last_mut().expect("scope stack is never empty");
      if let Some(previous) = scope.insert(name, id) {
        let previous_span = self.objects.get(&previous).span.clone();
        self.diagnostics.push(DiagnosticMessage::NameRedeclared {
          name: text,
          span,
          previous_span,
        });
      }
    }
    id
  }

  fn declare_in_package(
    &mut self,
    name: SymbolId,
    object: Object,
  ) -> ObjectId {
    let text = object.name.clone();
    let span = object.span.clone();
    let id = self.objects.alloc(object);
    if text != "_" {
      let scope = &mut self.scopes[1];
      if let Some(previous) = scope.insert(name, id) {
        let previous_span = self.objects.get(&previous).span.clone();
        self.diagnostics.push(DiagnosticMessage::NameRedeclared {
          name: text,
          span,
          previous_span,
        });
      }
    }
    id
  }

  pub(crate) fn error(
    &mut self,
    message: DiagnosticMessage,
  ) {
    self.diagnostics.push(message);
  }

  pub(crate) fn invalid(&self) -> TypeId {
    self.store.invalid()
  }

  fn init_universe(&mut self) {
    let basics = [
      ("bool", BasicKind::Bool),
      ("string", BasicKind::Str),
      ("int", BasicKind::Int),
      ("int8", BasicKind::Int8),
      ("int16", BasicKind::Int16),
      ("int32", BasicKind::Int32),
      ("int64", BasicKind::Int64),
      ("uint", BasicKind::Uint),
      ("uint8", BasicKind::Uint8),
      ("uint16", BasicKind::Uint16),
      ("uint32", BasicKind::Uint32),
      ("uint64", BasicKind::Uint64),
      ("uintptr", BasicKind::Uintptr),
      ("float32", BasicKind::Float32),
      ("float64", BasicKind::Float64),
      ("complex64", BasicKind::Complex64),
      ("complex128", BasicKind::Complex128),
    ];
    for (name, kind) in basics {
      let typ = self.store.basic(kind);
      let sym = self.intern(name);
      self.declare(sym, Object {
        name: name.to_string(),
        kind: ObjectKind::TypeName { is_alias: false },
        typ,
        span: Span::default(),
      });
    }

    // byte and rune are declared aliases, so mangling collapses them to
    // their targets
    for (name, kind) in [("byte", BasicKind::Uint8), ("rune", BasicKind::Int32)] {
      let typ = self.store.basic(kind);
      let sym = self.intern(name);
      self.declare(sym, Object {
        name: name.to_string(),
        kind: ObjectKind::TypeName { is_alias: true },
        typ,
        span: Span::default(),
      });
    }

    // error is a named interface { Error() string }
    let error_named = self.store.named("error", None, NamedGenerics::None);
    let string_t = self.store.basic(BasicKind::Str);
    let error_sig = self
      .store
      .signature(None, vec![], vec![Param::new("", string_t)], false, SignatureGenerics::None);
    let error_iface = self.store.interface(
      vec![Method {
        name: "Error".to_string(),
        sig: error_sig,
      }],
      vec![],
    );
    self.store.set_underlying(error_named, error_iface);
    let sym = self.intern("error");
    self.declare(sym, Object {
      name: "error".to_string(),
      kind: ObjectKind::TypeName { is_alias: false },
      typ: error_named,
      span: Span::default(),
    });

    let consts = [
      ("true", BasicKind::UntypedBool),
      ("false", BasicKind::UntypedBool),
      ("iota", BasicKind::UntypedInt),
      ("nil", BasicKind::UntypedNil),
    ];
    for (name, kind) in consts {
      let typ = self.store.basic(kind);
      let sym = self.intern(name);
      self.declare(sym, Object {
        name: name.to_string(),
        kind: ObjectKind::Const,
        typ,
        span: Span::default(),
      });
    }

    let builtins = [
      ("make", Builtin::Make),
      ("new", Builtin::New),
      ("append", Builtin::Append),
      ("len", Builtin::Len),
      ("cap", Builtin::Cap),
      ("copy", Builtin::Copy),
      ("delete", Builtin::Delete),
      ("panic", Builtin::Panic),
      ("print", Builtin::Print),
      ("println", Builtin::Println),
    ];
    let invalid = self.invalid();
    for (name, builtin) in builtins {
      let sym = self.intern(name);
      self.declare(sym, Object {
        name: name.to_string(),
        kind: ObjectKind::Builtin(builtin),
        typ: invalid,
        span: Span::default(),
      });
    }
  }

  // ── Collection ─────────────────────────────────────────────────────

  fn collect(
    &mut self,
    files: &[ASTFile],
  ) {
    // package-level constant names decide the ambiguous `[n] elem` head:
    // a constant length means an array, anything else a type parameter
    let mut const_names = HashSet::new();
    for file in files {
      for decl in &file.decls {
        if let ASTDeclaration::Value(value) = decl {
          if value.kind == fo_ast::ValueKind::Const {
            for spec in &value.specs {
              for name in &spec.names {
                const_names.insert(self.sym(&name.name));
              }
            }
          }
        }
      }
    }

    for file in files {
      for decl in &file.decls {
        match decl {
          ASTDeclaration::Import(import) => {
            for spec in &import.specs {
              let name = match &spec.alias {
                Some(alias) => self.sym(&alias.name),
                None => spec.path.rsplit('/').next().unwrap_or(&spec.path).to_string(),
              };
              let sym = self.intern(&name);
              let invalid = self.invalid();
              self.declare_in_package(sym, Object {
                name,
                kind: ObjectKind::PkgName,
                typ: invalid,
                span: spec.span.clone(),
              });
            }
          },
          ASTDeclaration::Type(type_decl) => {
            for spec in &type_decl.specs {
              self.collect_type_spec(spec, &const_names);
            }
          },
          ASTDeclaration::Value(value) => {
            for spec in &value.specs {
              for name in &spec.names {
                let text = self.sym(&name.name);
                let kind = match value.kind {
                  fo_ast::ValueKind::Var => ObjectKind::Var,
                  fo_ast::ValueKind::Const => ObjectKind::Const,
                };
                let invalid = self.invalid();
                self.declare_in_package(name.name, Object {
                  name: text,
                  kind,
                  typ: invalid,
                  span: name.span.clone(),
                });
              }
            }
          },
          ASTDeclaration::Func(func) if func.recv.is_none() => {
            let text = self.sym(&func.name.name);
            let invalid = self.invalid();
            self.declare_in_package(func.name.name, Object {
              name: text,
              kind: ObjectKind::Func,
              typ: invalid,
              span: func.name.span.clone(),
            });
          },
          ASTDeclaration::Func(_) => {}, // methods are handled after types resolve
        }
      }
    }
  }

  /// The effective shape of a type spec: explicit type parameters, the
  /// reinterpreted ambiguous array head, or a plain body.
  pub(crate) fn effective_type_spec(
    &self,
    spec: &ASTTypeSpec,
    const_names: &HashSet<String>,
  ) -> (Vec<String>, fo_ast::ASTExpression) {
    if let Some(tp) = &spec.type_params {
      let params = tp.names.iter().map(|n| self.sym(&n.name)).collect();
      return (params, spec.typ.clone());
    }

    if !spec.is_alias {
      if let fo_ast::ASTExpression::ArrayType {
        len: Some(len),
        elem,
        ..
      } = &spec.typ
      {
        if let fo_ast::ASTExpression::Ident(ident) = len.as_ref() {
          let name = self.sym(&ident.name);
          if !const_names.contains(&name) {
            return (vec![name], (**elem).clone());
          }
        }
      }
    }

    (Vec::new(), spec.typ.clone())
  }

  fn collect_type_spec(
    &mut self,
    spec: &ASTTypeSpec,
    const_names: &HashSet<String>,
  ) {
    let name = self.sym(&spec.name.name);
    let (mut type_params, body) = self.effective_type_spec(spec, const_names);

    // duplicate type-parameter names are a user error here, not a
    // constructor panic
    let mut seen = HashSet::new();
    type_params.retain(|p| {
      if seen.insert(p.clone()) {
        true
      } else {
        self.diagnostics.push(DiagnosticMessage::DuplicateTypeParam {
          name: p.clone(),
          span: spec.name.span.clone(),
        });
        false
      }
    });

    let typ = if spec.is_alias {
      self.invalid()
    } else if type_params.is_empty() {
      self.store.named(&name, None, NamedGenerics::None)
    } else {
      let shell = self.store.named(&name, None, NamedGenerics::Generic {
        type_params: type_params.clone(),
      });
      self.registry.register_decl(&name, shell, type_params.clone());
      shell
    };

    let object = self.declare_in_package(spec.name.name, Object {
      name: name.clone(),
      kind: ObjectKind::TypeName { is_alias: spec.is_alias },
      typ,
      span: spec.name.span.clone(),
    });

    let mut effective = spec.clone();
    effective.typ = body;
    self.type_decls.insert(name, PendingTypeDecl {
      spec: effective,
      type_params,
      object,
      state: ResolveState::Unresolved,
    });
  }

  // ── Type resolution ────────────────────────────────────────────────

  fn resolve_all_types(&mut self) {
    let mut names: Vec<String> = self.type_decls.keys().cloned().collect();
    names.sort_unstable();
    for name in names {
      self.resolve_type_decl(&name);
    }
  }

  /// Resolve a pending type declaration on demand. Re-entry through an
  /// indirection is legal self-reference; re-entry on the active path is
  /// a declaration cycle.
  pub(crate) fn resolve_type_decl(
    &mut self,
    name: &str,
  ) {
    let (state, decl_span) = match self.type_decls.get(name) {
      Some(pending) => (pending.state, pending.spec.name.span.clone()),
      None => return,
    };
    match state {
      ResolveState::Done => return,
      ResolveState::InProgress => {
        if self.resolving.iter().any(|n| n == name) {
          let path = self.resolving.clone();
          self.error(DiagnosticMessage::CyclicDeclaration {
            name: name.to_string(),
            span: decl_span,
            path,
          });
        }
        return;
      },
      ResolveState::Unresolved => {},
    }

    let spec = self.type_decls.get(name).unwrap().spec.clone();
    let type_params = self.type_decls.get(name).unwrap().type_params.clone();
    let object = self.type_decls.get(name).unwrap().object;
    self.type_decls.get_mut(name).unwrap().state = ResolveState::InProgress;
    self.resolving.push(name.to_string());

    if spec.is_alias {
      let typ = self.check_type(&spec.typ);
      self.objects.get_mut(object).typ = typ;
    } else {
      let shell = self.objects.get(&object).typ;
      if type_params.is_empty() {
        let underlying = self.check_type(&spec.typ);
        self.store.set_underlying(shell, underlying);
      } else {
        self.push_scope();
        for param in &type_params {
          let typ = self.store.type_param(param);
          let sym = self.intern(param);
          self.declare(sym, Object {
            name: param.clone(),
            kind: ObjectKind::TypeName { is_alias: false },
            typ,
            span: spec.name.span.clone(),
          });
        }
        let underlying = self.check_type(&spec.typ);
        self.store.set_underlying(shell, underlying);
        self.pop_scope();
      }
    }

    self.resolving.pop();
    self.type_decls.get_mut(name).unwrap().state = ResolveState::Done;
  }

  // ── Functions, methods, values, bodies ─────────────────────────────

  fn check_func_decls(
    &mut self,
    files: &[ASTFile],
  ) {
    for file in files {
      for decl in &file.decls {
        if let ASTDeclaration::Func(func) = decl {
          self.check_func_signature(func);
        }
      }
    }
  }

  fn check_value_decl_types(
    &mut self,
    files: &[ASTFile],
  ) {
    for file in files {
      for decl in &file.decls {
        if let ASTDeclaration::Value(value) = decl {
          for spec in &value.specs {
            if let Some(typ_expr) = &spec.typ {
              let typ = self.check_type(typ_expr);
              self.require_concrete(typ, typ_expr.span());
              for name in &spec.names {
                if let Some(obj) = self.lookup(&name.name) {
                  if self.objects.get(&obj).span == name.span {
                    self.objects.get_mut(obj).typ = typ;
                  }
                }
              }
            }
          }
        }
      }
    }
  }

  fn check_bodies(
    &mut self,
    files: &[ASTFile],
  ) {
    for file in files {
      for decl in &file.decls {
        match decl {
          ASTDeclaration::Value(value) => {
            for spec in &value.specs {
              for value_expr in &spec.values {
                self.check_expr(value_expr);
              }
            }
          },
          ASTDeclaration::Func(func) => self.check_func_body(func),
          _ => {},
        }
      }
    }
  }

  pub(crate) fn generic_func_key(
    &self,
    func: &ASTFuncDecl,
  ) -> Option<String> {
    let name = self.sym(&func.name.name);
    match &func.recv {
      Some(recv) => {
        let recv_name = self.receiver_type_name(&recv.typ)?;
        let has_own_params = func.type_params.as_ref().map(|tp| !tp.is_empty()).unwrap_or(false);
        if has_own_params {
          Some(format!("{}.{}", recv_name, name))
        } else if self.registry.contains(&recv_name) {
          // partials inside a parameter-free method ride on the
          // receiver's usages
          Some(recv_name)
        } else {
          None
        }
      },
      None => {
        if func.type_params.as_ref().map(|tp| !tp.is_empty()).unwrap_or(false) {
          Some(name)
        } else {
          None
        }
      },
    }
  }

  /// The type name under a receiver expression, stripping pointer and
  /// argument forms.
  pub(crate) fn receiver_type_name(
    &self,
    typ: &fo_ast::ASTExpression,
  ) -> Option<String> {
    let mut expr = typ;
    if let fo_ast::ASTExpression::Star { expr: inner, .. } = expr {
      expr = inner.as_ref();
    }
    if let fo_ast::ASTExpression::TypeArg(app) = expr {
      expr = app.expr.as_ref();
    }
    if let fo_ast::ASTExpression::Index(index) = expr {
      expr = index.expr.as_ref();
    }
    match expr {
      fo_ast::ASTExpression::Ident(ident) => Some(self.sym(&ident.name)),
      _ => None,
    }
  }
}
