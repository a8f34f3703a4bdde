use std::collections::HashSet;

use fo_ast::{ASTExpression, ASTFieldGroup, ASTFuncDecl, ASTFuncType, ASTIdent, ASTReceiver, ChanDirSyntax};
use fo_diagnostics::message::DiagnosticMessage;
use fo_type::source::Span;
use fo_type::types::{
  ChanDir, Field, Method, NamedGenerics, Param, SignatureGenerics, Type, TypeId, TypeMap,
};

use crate::subst::Substituter;
use crate::{Checker, Object, ObjectKind};

impl Checker {
  /// Type-check a type expression.
  pub(crate) fn check_type(
    &mut self,
    expr: &ASTExpression,
  ) -> TypeId {
    match expr {
      ASTExpression::Ident(ident) => self.type_ident(ident),
      ASTExpression::Selector(sel) => {
        if let ASTExpression::Ident(base) = sel.expr.as_ref() {
          if let Some(obj) = self.lookup(&base.name) {
            if self.objects.get(&obj).kind == ObjectKind::PkgName {
              self.info.uses.insert(base.id, obj);
              let pkg = self.objects.get(&obj).name.clone();
              let member = self.sym(&sel.sel.name);
              return self.foreign_named(&pkg, &member);
            }
          }
        }
        self.error(DiagnosticMessage::NotAType {
          name: self.sym(&sel.sel.name),
          span: sel.span.clone(),
        });
        self.invalid()
      },
      ASTExpression::Paren { expr, .. } => self.check_type(expr),
      ASTExpression::Star { expr, .. } => {
        let base = self.under_indirection(|c| c.check_type(expr));
        self.require_concrete(base, expr.span());
        self.store.pointer(base)
      },
      ASTExpression::ArrayType { len: None, elem, .. } => {
        let elem_t = self.under_indirection(|c| c.check_type(elem));
        self.require_concrete(elem_t, elem.span());
        self.store.slice(elem_t)
      },
      ASTExpression::ArrayType {
        len: Some(len),
        elem,
        ..
      } => {
        let n = self.array_length(len);
        let elem_t = self.check_type(elem);
        self.require_concrete(elem_t, elem.span());
        self.store.array(n, elem_t)
      },
      ASTExpression::MapType { key, value, .. } => {
        let key_t = self.under_indirection(|c| c.check_type(key));
        self.require_concrete(key_t, key.span());
        let value_t = self.under_indirection(|c| c.check_type(value));
        self.require_concrete(value_t, value.span());
        self.store.map(key_t, value_t)
      },
      ASTExpression::ChanType { dir, value, .. } => {
        let elem = self.under_indirection(|c| c.check_type(value));
        self.require_concrete(elem, value.span());
        let dir = match dir {
          ChanDirSyntax::SendRecv => ChanDir::SendRecv,
          ChanDirSyntax::SendOnly => ChanDir::SendOnly,
          ChanDirSyntax::RecvOnly => ChanDir::RecvOnly,
        };
        self.store.chan(dir, elem)
      },
      ASTExpression::StructType(st) => self.struct_type(&st.fields),
      ASTExpression::InterfaceType(it) => self.interface_type(&it.methods),
      ASTExpression::FuncType(ft) => {
        let (params, results, variadic) = self.under_indirection(|c| c.check_func_type_groups(ft, false));
        self.store.signature(None, params, results, variadic, SignatureGenerics::None)
      },
      ASTExpression::TypeArg(app) => {
        let target = self.check_type(&app.expr);
        self.apply_type_args(target, &app.types, &app.span, None)
      },
      ASTExpression::Index(index) => {
        // a single-argument application that reached us through
        // expression syntax
        let target = self.check_type(&index.expr);
        self.apply_type_args(target, std::slice::from_ref(index.index.as_ref()), &index.span, None)
      },
      other => {
        self.error(DiagnosticMessage::NotAType {
          name: "expression".to_string(),
          span: other.span().clone(),
        });
        self.invalid()
      },
    }
  }

  fn type_ident(
    &mut self,
    ident: &ASTIdent,
  ) -> TypeId {
    let name = self.sym(&ident.name);
    let Some(obj) = self.lookup(&ident.name) else {
      if name == "_" {
        self.error(DiagnosticMessage::NotAType {
          name,
          span: ident.span.clone(),
        });
      } else {
        self.error(DiagnosticMessage::UndeclaredName {
          name,
          span: ident.span.clone(),
        });
      }
      return self.invalid();
    };
    self.info.uses.insert(ident.id, obj);

    let kind = self.objects.get(&obj).kind.clone();
    match kind {
      ObjectKind::TypeName { .. } => {
        self.resolve_type_decl(&name);
        self.objects.get(&obj).typ
      },
      _ => {
        self.error(DiagnosticMessage::NotAType {
          name,
          span: ident.span.clone(),
        });
        self.invalid()
      },
    }
  }

  /// Pointer, slice, map, chan and function types break declaration
  /// cycles; the resolution path is suspended while checking their
  /// components.
  pub(crate) fn under_indirection<T>(
    &mut self,
    f: impl FnOnce(&mut Self) -> T,
  ) -> T {
    let saved = std::mem::take(&mut self.resolving);
    let result = f(self);
    self.resolving = saved;
    result
  }

  fn array_length(
    &mut self,
    len: &ASTExpression,
  ) -> i64 {
    match len {
      ASTExpression::BasicLit(lit) if lit.kind == fo_ast::LitKind::Int => lit.value.parse().unwrap_or(0),
      _ => {
        // constant identifiers and expressions evaluate to a length the
        // downstream compiler re-checks; the exact value is irrelevant
        // for substitution
        self.check_expr(len);
        0
      },
    }
  }

  fn struct_type(
    &mut self,
    groups: &[ASTFieldGroup],
  ) -> TypeId {
    let mut fields: Vec<Field> = Vec::new();
    let mut seen = HashSet::new();

    for group in groups {
      let typ = self.check_type(&group.typ);
      self.require_concrete(typ, group.typ.span());
      let tag = group.tag.clone().unwrap_or_default();

      if group.names.is_empty() {
        // embedded field: named by the rightmost identifier
        let Some(name) = embedded_field_name(&group.typ, self) else {
          self.error(DiagnosticMessage::NotAType {
            name: "anonymous field".to_string(),
            span: group.span.clone(),
          });
          continue;
        };
        if name != "_" && !seen.insert(name.clone()) {
          self.error(DiagnosticMessage::NameRedeclared {
            name,
            span: group.span.clone(),
            previous_span: group.span.clone(),
          });
          continue;
        }
        fields.push(Field {
          name,
          typ,
          tag: tag.clone(),
          anonymous: true,
        });
      } else {
        for name_ident in &group.names {
          let name = self.sym(&name_ident.name);
          if name != "_" && !seen.insert(name.clone()) {
            self.error(DiagnosticMessage::NameRedeclared {
              name,
              span: name_ident.span.clone(),
              previous_span: name_ident.span.clone(),
            });
            continue;
          }
          fields.push(Field {
            name,
            typ,
            tag: tag.clone(),
            anonymous: false,
          });
        }
      }
    }

    self.store.struct_type(fields)
  }

  fn interface_type(
    &mut self,
    groups: &[ASTFieldGroup],
  ) -> TypeId {
    let mut methods: Vec<Method> = Vec::new();
    let mut embeddeds = Vec::new();
    let mut seen = HashSet::new();

    for group in groups {
      if group.names.is_empty() {
        let typ = self.check_type(&group.typ);
        self.require_concrete(typ, group.typ.span());
        embeddeds.push(typ);
        continue;
      }

      let name = self.sym(&group.names[0].name);
      if !seen.insert(name.clone()) {
        self.error(DiagnosticMessage::NameRedeclared {
          name,
          span: group.names[0].span.clone(),
          previous_span: group.names[0].span.clone(),
        });
        continue;
      }
      let sig = self.under_indirection(|c| c.check_type(&group.typ));
      methods.push(Method { name, sig });
    }

    let iface = self.store.interface(methods, embeddeds);
    // completion is lazy, but running it here surfaces embedding
    // problems at the declaration
    self.store.interface_method_set(iface);
    iface
  }

  /// A generic type or function leaking into a position that needs a
  /// complete type means the arguments were omitted.
  pub(crate) fn require_concrete(
    &mut self,
    typ: TypeId,
    span: &Span,
  ) {
    let generic = match self.store.get(&typ) {
      Type::Named(named) => matches!(named.generics, NamedGenerics::Generic { .. }),
      Type::Signature(sig) => matches!(
        &sig.generics,
        SignatureGenerics::Generic { type_params, .. } if !type_params.is_empty()
      ),
      _ => false,
    };
    if generic {
      let typ_string = self.store.type_string(typ);
      self.error(DiagnosticMessage::MissingTypeArguments {
        typ: typ_string,
        span: span.clone(),
      });
    }
  }

  /// Resolve a type-argument application against a checked target type.
  /// `extra` carries receiver bindings for generic-method applications,
  /// keyed by the method's receiver-bracket parameter names.
  pub(crate) fn apply_type_args(
    &mut self,
    target: TypeId,
    args: &[ASTExpression],
    span: &Span,
    extra: Option<TypeMap>,
  ) -> TypeId {
    match self.store.get(&target).clone() {
      Type::Named(named) => match &named.generics {
        NamedGenerics::Generic { type_params } => {
          if args.len() != type_params.len() {
            self.error(DiagnosticMessage::WrongNumberOfTypeArguments {
              expected: type_params.len(),
              got: args.len(),
              span: span.clone(),
            });
            return self.invalid();
          }
          let mut map = TypeMap::new();
          for (param, arg) in type_params.iter().zip(args) {
            let arg_t = self.check_type(arg);
            self.require_concrete(arg_t, arg.span());
            map.insert(param.clone(), arg_t);
          }
          let mut sub = Substituter::new(&mut self.store, &mut self.registry);
          let result = sub.instantiate_named(target, map);
          self.note_partial(result);
          result
        },
        _ => {
          let typ_string = self.store.type_string(target);
          self.error(DiagnosticMessage::TypeArgumentsForNonGeneric {
            typ: typ_string,
            span: span.clone(),
          });
          self.invalid()
        },
      },
      Type::Signature(sig) => match &sig.generics {
        SignatureGenerics::Generic { type_params, .. } if !type_params.is_empty() => {
          if args.len() != type_params.len() {
            self.error(DiagnosticMessage::WrongNumberOfTypeArguments {
              expected: type_params.len(),
              got: args.len(),
              span: span.clone(),
            });
            return self.invalid();
          }
          let mut map = extra.unwrap_or_default();
          for (param, arg) in type_params.clone().iter().zip(args) {
            let arg_t = self.check_type(arg);
            self.require_concrete(arg_t, arg.span());
            map.insert(param.clone(), arg_t);
          }
          let mut sub = Substituter::new(&mut self.store, &mut self.registry);
          let result = sub.instantiate_signature(target, map);
          self.note_partial(result);
          result
        },
        _ => {
          let typ_string = self.store.type_string(target);
          self.error(DiagnosticMessage::TypeArgumentsForNonGeneric {
            typ: typ_string,
            span: span.clone(),
          });
          self.invalid()
        },
      },
      Type::Basic(fo_type::types::BasicKind::Invalid) => self.invalid(),
      _ => {
        let typ_string = self.store.type_string(target);
        self.error(DiagnosticMessage::TypeArgumentsForNonGeneric {
          typ: typ_string,
          span: span.clone(),
        });
        self.invalid()
      },
    }
  }

  /// A partial instantiation inside a generic declaration's body becomes
  /// a dependent of that declaration.
  fn note_partial(
    &mut self,
    typ: TypeId,
  ) {
    let partial = match self.store.get(&typ) {
      Type::Named(named) => matches!(named.generics, NamedGenerics::Partial { .. }),
      Type::Signature(sig) => matches!(sig.generics, SignatureGenerics::Partial { .. }),
      _ => false,
    };
    if partial {
      if let Some(current) = self.current_generic.clone() {
        self.registry.add_dependent(&current, typ);
      }
    }
  }

  /// An opaque named type for a member of an imported package. Cached so
  /// `bytes.Buffer` is one type everywhere.
  pub(crate) fn foreign_named(
    &mut self,
    pkg: &str,
    member: &str,
  ) -> TypeId {
    let key = (pkg.to_string(), member.to_string());
    if let Some(&typ) = self.foreign.get(&key) {
      return typ;
    }
    let shell = self.store.named(member, Some(pkg.to_string()), NamedGenerics::None);
    let underlying = self.store.struct_type(Vec::new());
    self.store.set_underlying(shell, underlying);
    self.foreign.insert(key, shell);
    shell
  }

  // ── Function and method signatures ─────────────────────────────────

  pub(crate) fn check_func_signature(
    &mut self,
    func: &ASTFuncDecl,
  ) {
    match &func.recv {
      None => self.check_plain_func_signature(func),
      Some(recv) => self.check_method_signature(func, recv),
    }
  }

  fn check_plain_func_signature(
    &mut self,
    func: &ASTFuncDecl,
  ) {
    let name = self.sym(&func.name.name);
    let own = self.collect_param_names(func);

    self.push_scope();
    self.declare_type_params(&own, &func.name.span);
    let (params, results, variadic) = self.check_func_type_groups(&func.sig, false);
    self.pop_scope();

    let generics = if own.is_empty() {
      SignatureGenerics::None
    } else {
      SignatureGenerics::Generic {
        type_params: own.clone(),
        recv_type_params: Vec::new(),
      }
    };
    let sig = self.store.signature(None, params, results, variadic, generics);

    if let Some(obj) = self.lookup(&func.name.name) {
      self.objects.get_mut(obj).typ = sig;
    }
    if !own.is_empty() {
      self.registry.register_decl(&name, sig, own);
    }
  }

  fn check_method_signature(
    &mut self,
    func: &ASTFuncDecl,
    recv: &ASTReceiver,
  ) {
    let method_name = self.sym(&func.name.name);

    let mut recv_typ_expr = &recv.typ;
    let is_star = matches!(recv_typ_expr, ASTExpression::Star { .. });
    if let ASTExpression::Star { expr, .. } = recv_typ_expr {
      recv_typ_expr = expr.as_ref();
    }

    let (base_expr, recv_args) = match recv_typ_expr {
      ASTExpression::TypeArg(app) => (app.expr.as_ref(), Some(&app.types)),
      other => (other, None),
    };
    let ASTExpression::Ident(base_ident) = base_expr else {
      self.error(DiagnosticMessage::InvalidReceiverForm(recv.span.clone()));
      return;
    };
    let recv_name = self.sym(&base_ident.name);

    let Some(base_obj) = self.lookup(&base_ident.name) else {
      self.error(DiagnosticMessage::UnknownReceiverType {
        name: recv_name,
        span: recv.span.clone(),
      });
      return;
    };
    self.info.uses.insert(base_ident.id, base_obj);
    if !matches!(self.objects.get(&base_obj).kind, ObjectKind::TypeName { .. }) {
      self.error(DiagnosticMessage::UnknownReceiverType {
        name: recv_name,
        span: recv.span.clone(),
      });
      return;
    }
    self.resolve_type_decl(&recv_name);
    let origin = self.objects.get(&base_obj).typ;

    // receiver-bracket parameters must be identifiers naming type
    // parameters, never concrete types
    let mut recv_params: Vec<String> = Vec::new();
    if let Some(args) = recv_args {
      for arg in args.iter() {
        let ASTExpression::Ident(ident) = arg else {
          self.error(DiagnosticMessage::ReceiverParamNotIdent(arg.span().clone()));
          continue;
        };
        let param = self.sym(&ident.name);
        if let Some(existing) = self.lookup(&ident.name) {
          if !self.store.is_type_param(self.objects.get(&existing).typ) {
            self.error(DiagnosticMessage::ReceiverParamConcrete {
              name: param.clone(),
              span: ident.span.clone(),
            });
            continue;
          }
        }
        if recv_params.contains(&param) {
          self.error(DiagnosticMessage::DuplicateTypeParam {
            name: param,
            span: ident.span.clone(),
          });
          continue;
        }
        recv_params.push(param);
      }
    }

    let own = self.collect_param_names(func);

    self.push_scope();
    self.declare_type_params(&recv_params, &recv.span);
    self.declare_type_params(&own, &func.name.span);

    let origin_params = self.store.generic_param_order(origin);
    let recv_base_typ = if !origin_params.is_empty() && !recv_params.is_empty() {
      if recv_params.len() != origin_params.len() {
        self.error(DiagnosticMessage::WrongNumberOfTypeArguments {
          expected: origin_params.len(),
          got: recv_params.len(),
          span: recv.span.clone(),
        });
        origin
      } else {
        let mut map = TypeMap::new();
        for (origin_param, recv_param) in origin_params.iter().zip(&recv_params) {
          let param_t = self.store.type_param(recv_param);
          map.insert(origin_param.clone(), param_t);
        }
        let mut sub = Substituter::new(&mut self.store, &mut self.registry);
        sub.instantiate_named(origin, map)
      }
    } else if origin_params.is_empty() && !recv_params.is_empty() {
      self.error(DiagnosticMessage::TypeArgumentsForNonGeneric {
        typ: self.store.type_string(origin),
        span: recv.span.clone(),
      });
      origin
    } else {
      origin
    };
    let recv_typ = if is_star {
      self.store.pointer(recv_base_typ)
    } else {
      recv_base_typ
    };

    let recv_param = Param {
      name: recv.name.as_ref().map(|n| self.sym(&n.name)).unwrap_or_default(),
      typ: recv_typ,
    };

    let (params, results, variadic) = self.check_func_type_groups(&func.sig, false);
    self.pop_scope();

    let generics = if own.is_empty() && recv_params.is_empty() {
      SignatureGenerics::None
    } else {
      SignatureGenerics::Generic {
        type_params: own.clone(),
        recv_type_params: recv_params.clone(),
      }
    };
    let sig = self.store.signature(Some(recv_param), params, results, variadic, generics);

    self.store.add_method(origin, Method {
      name: method_name.clone(),
      sig,
    });

    if !own.is_empty() {
      let key = format!("{}.{}", recv_name, method_name);
      let mut all = recv_params;
      all.extend(own);
      self.registry.register_decl(&key, sig, all);
    }
  }

  fn collect_param_names(
    &mut self,
    func: &ASTFuncDecl,
  ) -> Vec<String> {
    let mut names = Vec::new();
    if let Some(tp) = &func.type_params {
      for ident in &tp.names {
        let name = self.sym(&ident.name);
        if names.contains(&name) {
          self.error(DiagnosticMessage::DuplicateTypeParam {
            name,
            span: ident.span.clone(),
          });
          continue;
        }
        names.push(name);
      }
    }
    names
  }

  pub(crate) fn declare_type_params(
    &mut self,
    params: &[String],
    span: &Span,
  ) {
    for param in params {
      let typ = self.store.type_param(param);
      let sym = self.intern(param);
      self.declare(sym, Object {
        name: param.clone(),
        kind: ObjectKind::TypeName { is_alias: false },
        typ,
        span: span.clone(),
      });
    }
  }

  /// Resolve parameter and result groups to checked types; `declare`
  /// additionally binds parameter names in the current scope (used when
  /// setting up a body).
  pub(crate) fn check_func_type_groups(
    &mut self,
    sig: &ASTFuncType,
    declare: bool,
  ) -> (Vec<Param>, Vec<Param>, bool) {
    let mut params = Vec::new();
    let mut variadic = false;
    let group_count = sig.params.len();

    for (i, group) in sig.params.iter().enumerate() {
      let typ = match &group.typ {
        ASTExpression::Ellipsis { elem: Some(elem), .. } => {
          let elem_t = self.under_indirection(|c| c.check_type(elem));
          if i == group_count - 1 {
            variadic = true;
          }
          self.store.slice(elem_t)
        },
        other => {
          let t = self.under_indirection(|c| c.check_type(other));
          self.require_concrete(t, other.span());
          t
        },
      };

      if group.names.is_empty() {
        params.push(Param::new("", typ));
      } else {
        for name_ident in &group.names {
          let name = self.sym(&name_ident.name);
          if declare {
            self.declare(name_ident.name, Object {
              name: name.clone(),
              kind: ObjectKind::Var,
              typ,
              span: name_ident.span.clone(),
            });
          }
          params.push(Param::new(name, typ));
        }
      }
    }

    let mut results = Vec::new();
    for group in &sig.results {
      let typ = self.under_indirection(|c| c.check_type(&group.typ));
      self.require_concrete(typ, group.typ.span());
      if group.names.is_empty() {
        results.push(Param::new("", typ));
      } else {
        for name_ident in &group.names {
          let name = self.sym(&name_ident.name);
          if declare {
            self.declare(name_ident.name, Object {
              name: name.clone(),
              kind: ObjectKind::Var,
              typ,
              span: name_ident.span.clone(),
            });
          }
          results.push(Param::new(name, typ));
        }
      }
    }

    (params, results, variadic)
  }
}

fn embedded_field_name(
  expr: &ASTExpression,
  checker: &Checker,
) -> Option<String> {
  match expr {
    ASTExpression::Ident(ident) => Some(checker.sym(&ident.name)),
    ASTExpression::Star { expr, .. } => embedded_field_name(expr, checker),
    ASTExpression::Selector(sel) => Some(checker.sym(&sel.sel.name)),
    _ => None,
  }
}
