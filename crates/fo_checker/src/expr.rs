use fo_ast::{
  ASTBlock, ASTDeclaration, ASTExpression, ASTFuncDecl, ASTSelectorExpr, ASTStatement, ForHeader, LitKind,
};
use fo_diagnostics::message::DiagnosticMessage;
use fo_type::types::{BasicKind, NamedGenerics, SignatureGenerics, Type, TypeId, TypeMap};

use crate::{Builtin, Checker, Object, ObjectKind, Selection, SelectionKind};

impl Checker {
  pub(crate) fn check_func_body(
    &mut self,
    func: &ASTFuncDecl,
  ) {
    let Some(body) = &func.body else {
      return;
    };

    self.push_scope();

    // rebuild the signature environment: type parameters, receiver,
    // parameters and named results
    let mut recv_params: Vec<String> = Vec::new();
    if let Some(recv) = &func.recv {
      let mut typ_expr = &recv.typ;
      if let ASTExpression::Star { expr, .. } = typ_expr {
        typ_expr = expr.as_ref();
      }
      if let ASTExpression::TypeArg(app) = typ_expr {
        for arg in &app.types {
          if let ASTExpression::Ident(ident) = arg {
            recv_params.push(self.sym(&ident.name));
          }
        }
      }
    }
    let own: Vec<String> = func
      .type_params
      .iter()
      .flat_map(|tp| tp.names.iter())
      .map(|n| self.sym(&n.name))
      .collect();
    self.declare_type_params(&recv_params, &func.name.span);
    self.declare_type_params(&own, &func.name.span);

    if let Some(recv) = &func.recv {
      let recv_typ = self.check_receiver_binding_type(recv);
      if let Some(name_ident) = &recv.name {
        let name = self.sym(&name_ident.name);
        self.declare(name_ident.name, Object {
          name,
          kind: ObjectKind::Var,
          typ: recv_typ,
          span: name_ident.span.clone(),
        });
      }
    }

    self.check_func_type_groups(&func.sig, true);

    let previous = self.current_generic.take();
    self.current_generic = self.generic_func_key(func);
    self.check_block(body);
    self.current_generic = previous;

    self.pop_scope();
  }

  fn check_receiver_binding_type(
    &mut self,
    recv: &fo_ast::ASTReceiver,
  ) -> TypeId {
    let mut typ_expr = &recv.typ;
    let is_star = matches!(typ_expr, ASTExpression::Star { .. });
    if let ASTExpression::Star { expr, .. } = typ_expr {
      typ_expr = expr.as_ref();
    }
    let base = self.check_type(typ_expr);
    if is_star { self.store.pointer(base) } else { base }
  }

  pub(crate) fn check_block(
    &mut self,
    block: &ASTBlock,
  ) {
    self.push_scope();
    for stmt in &block.statements {
      self.check_statement(stmt);
    }
    self.pop_scope();
  }

  fn check_statement(
    &mut self,
    stmt: &ASTStatement,
  ) {
    match stmt {
      ASTStatement::Block(block) => self.check_block(block),
      ASTStatement::Decl(decl) => self.check_local_decl(decl),
      ASTStatement::Expr(expr) => {
        self.check_expr(expr);
      },
      ASTStatement::Assign(assign) => {
        let rhs_types: Vec<TypeId> = assign.rhs.iter().map(|e| self.check_expr(e)).collect();
        if assign.op == fo_ast::AssignOp::Define {
          for (i, lhs) in assign.lhs.iter().enumerate() {
            if let ASTExpression::Ident(ident) = lhs {
              let name = self.sym(&ident.name);
              let invalid = self.invalid();
              let typ = rhs_types.get(i).copied().unwrap_or(invalid);
              let obj = self.declare(ident.name, Object {
                name,
                kind: ObjectKind::Var,
                typ,
                span: ident.span.clone(),
              });
              self.info.uses.insert(ident.id, obj);
            } else {
              self.check_expr(lhs);
            }
          }
        } else {
          for lhs in &assign.lhs {
            self.check_expr(lhs);
          }
        }
      },
      ASTStatement::IncDec { expr, .. } => {
        self.check_expr(expr);
      },
      ASTStatement::Return { results, .. } => {
        for result in results {
          self.check_expr(result);
        }
      },
      ASTStatement::If(if_stmt) => {
        self.push_scope();
        if let Some(init) = &if_stmt.init {
          self.check_statement(init);
        }
        self.check_expr(&if_stmt.cond);
        self.check_block(&if_stmt.then);
        if let Some(else_) = &if_stmt.else_ {
          self.check_statement(else_);
        }
        self.pop_scope();
      },
      ASTStatement::For(for_stmt) => {
        self.push_scope();
        match &for_stmt.header {
          ForHeader::Cond(cond) => {
            if let Some(cond) = cond {
              self.check_expr(cond);
            }
          },
          ForHeader::Clauses { init, cond, post } => {
            if let Some(init) = init {
              self.check_statement(init);
            }
            if let Some(cond) = cond {
              self.check_expr(cond);
            }
            if let Some(post) = post {
              self.check_statement(post);
            }
          },
          ForHeader::Range {
            key,
            value,
            define,
            expr,
          } => {
            let container = self.check_expr(expr);
            let (key_t, value_t) = self.range_types(container);
            for (binding, typ) in [(key, key_t), (value, value_t)] {
              let Some(binding) = binding else { continue };
              if *define {
                if let ASTExpression::Ident(ident) = binding {
                  let name = self.sym(&ident.name);
                  let obj = self.declare(ident.name, Object {
                    name,
                    kind: ObjectKind::Var,
                    typ,
                    span: ident.span.clone(),
                  });
                  self.info.uses.insert(ident.id, obj);
                  continue;
                }
              }
              self.check_expr(binding);
            }
          },
        }
        self.check_block(&for_stmt.body);
        self.pop_scope();
      },
      ASTStatement::Switch(switch) => {
        self.push_scope();
        if let Some(init) = &switch.init {
          self.check_statement(init);
        }
        if let Some(tag) = &switch.tag {
          self.check_expr(tag);
        }
        if let Some(guard) = &switch.type_guard {
          self.check_expr(&guard.expr);
          if let Some(binding) = &guard.binding {
            let name = self.sym(&binding.name);
            let invalid = self.invalid();
            self.declare(binding.name, Object {
              name,
              kind: ObjectKind::Var,
              typ: invalid,
              span: binding.span.clone(),
            });
          }
        }
        let is_type_switch = switch.type_guard.is_some();
        for case in &switch.cases {
          for expr in &case.exprs {
            if is_type_switch {
              self.check_type(expr);
            } else {
              self.check_expr(expr);
            }
          }
          self.push_scope();
          for stmt in &case.body {
            self.check_statement(stmt);
          }
          self.pop_scope();
        }
        self.pop_scope();
      },
      ASTStatement::Branch { .. } | ASTStatement::Empty { .. } => {},
      ASTStatement::Go { call, .. } | ASTStatement::Defer { call, .. } => {
        self.check_expr(call);
      },
      ASTStatement::Send { chan, value, .. } => {
        self.check_expr(chan);
        self.check_expr(value);
      },
    }
  }

  fn check_local_decl(
    &mut self,
    decl: &ASTDeclaration,
  ) {
    match decl {
      ASTDeclaration::Value(value) => {
        for spec in &value.specs {
          let declared_typ = spec.typ.as_ref().map(|t| {
            let typ = self.check_type(t);
            self.require_concrete(typ, t.span());
            typ
          });
          let value_types: Vec<TypeId> = spec.values.iter().map(|v| self.check_expr(v)).collect();
          for (i, name_ident) in spec.names.iter().enumerate() {
            let name = self.sym(&name_ident.name);
            let invalid = self.invalid();
            let typ = declared_typ
              .or_else(|| value_types.get(i).copied())
              .unwrap_or(invalid);
            let kind = match value.kind {
              fo_ast::ValueKind::Var => ObjectKind::Var,
              fo_ast::ValueKind::Const => ObjectKind::Const,
            };
            let obj = self.declare(name_ident.name, Object {
              name,
              kind,
              typ,
              span: name_ident.span.clone(),
            });
            self.info.uses.insert(name_ident.id, obj);
          }
        }
      },
      ASTDeclaration::Type(type_decl) => {
        // local type declarations: resolved inline, no generics
        for spec in &type_decl.specs {
          let name = self.sym(&spec.name.name);
          if spec.is_alias {
            let typ = self.check_type(&spec.typ);
            self.declare(spec.name.name, Object {
              name,
              kind: ObjectKind::TypeName { is_alias: true },
              typ,
              span: spec.name.span.clone(),
            });
          } else {
            let shell = self.store.named(&name, None, NamedGenerics::None);
            let underlying = self.check_type(&spec.typ);
            self.store.set_underlying(shell, underlying);
            self.declare(spec.name.name, Object {
              name,
              kind: ObjectKind::TypeName { is_alias: false },
              typ: shell,
              span: spec.name.span.clone(),
            });
          }
        }
      },
      _ => {},
    }
  }

  fn range_types(
    &mut self,
    container: TypeId,
  ) -> (TypeId, TypeId) {
    let int = self.store.basic(BasicKind::Int);
    let invalid = self.invalid();
    let under = self.store.underlying(container);
    match self.store.get(&under).clone() {
      Type::Slice { elem } | Type::Array { elem, .. } => (int, elem),
      Type::Map { key, elem } => (key, elem),
      Type::Basic(BasicKind::Str) => (int, self.store.basic(BasicKind::Int32)),
      Type::Chan { elem, .. } => (elem, invalid),
      _ => (invalid, invalid),
    }
  }

  // ── Expressions ────────────────────────────────────────────────────

  /// Best-effort expression typing: enough to resolve selectors over
  /// generic instantiations and to discover every argument application
  /// inside bodies. Full assignability and operator rules belong to the
  /// downstream compiler.
  pub(crate) fn check_expr(
    &mut self,
    expr: &ASTExpression,
  ) -> TypeId {
    match expr {
      ASTExpression::Ident(ident) => {
        let name = self.sym(&ident.name);
        let Some(obj) = self.lookup(&ident.name) else {
          if name != "_" {
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
          ObjectKind::Builtin(_) | ObjectKind::PkgName => self.invalid(),
          _ => self.objects.get(&obj).typ,
        }
      },
      ASTExpression::BasicLit(lit) => {
        let kind = match lit.kind {
          LitKind::Int => BasicKind::UntypedInt,
          LitKind::Float => BasicKind::UntypedFloat,
          LitKind::Imag => BasicKind::UntypedComplex,
          LitKind::Rune => BasicKind::UntypedRune,
          LitKind::String => BasicKind::UntypedString,
        };
        self.store.basic(kind)
      },
      ASTExpression::Binary { op, left, right, .. } => {
        let lt = self.check_expr(left);
        let rt = self.check_expr(right);
        use fo_ast::BinaryOp::*;
        match op {
          Eq | NotEq | Less | LessEq | Greater | GreaterEq | LogicalAnd | LogicalOr => {
            self.store.basic(BasicKind::UntypedBool)
          },
          _ => {
            if self.store.is_invalid(lt) {
              rt
            } else {
              lt
            }
          },
        }
      },
      ASTExpression::Unary { op, expr, .. } => {
        let t = self.check_expr(expr);
        match op {
          fo_ast::UnaryOp::Addr => self.store.pointer(t),
          fo_ast::UnaryOp::Recv => match self.store.get(&t) {
            Type::Chan { elem, .. } => *elem,
            _ => self.invalid(),
          },
          _ => t,
        }
      },
      ASTExpression::Star { expr, .. } => {
        let t = self.check_expr(expr);
        match self.store.get(&t) {
          Type::Pointer { base } => *base,
          _ => self.store.pointer(t),
        }
      },
      ASTExpression::Paren { expr, .. } => self.check_expr(expr),
      ASTExpression::Selector(sel) => self.check_selector(sel),
      ASTExpression::Index(index) => {
        // an index over a generic name is an argument application in
        // disguise
        if let Some(target) = self.generic_application_target(&index.expr) {
          return self.apply_application(target, &index.expr, std::slice::from_ref(index.index.as_ref()), &index.span);
        }

        // indexing a type that is not generic is an application error
        if let ASTExpression::Ident(ident) = index.expr.as_ref() {
          if let Some(obj) = self.lookup(&ident.name) {
            if matches!(self.objects.get(&obj).kind, ObjectKind::TypeName { .. }) {
              let typ = self.objects.get(&obj).typ;
              let typ_string = self.store.type_string(typ);
              self.error(DiagnosticMessage::TypeArgumentsForNonGeneric {
                typ: typ_string,
                span: index.span.clone(),
              });
              self.check_expr(&index.index);
              return self.invalid();
            }
          }
        }

        let container = self.check_expr(&index.expr);
        self.check_expr(&index.index);
        let under = self.store.underlying(container);
        match self.store.get(&under).clone() {
          Type::Slice { elem } | Type::Array { elem, .. } | Type::Map { elem, .. } => elem,
          Type::Basic(BasicKind::Str) => self.store.basic(BasicKind::Uint8),
          _ => self.invalid(),
        }
      },
      ASTExpression::TypeArg(app) => {
        if let Some(target) = self.generic_application_target(&app.expr) {
          self.apply_application(target, &app.expr, &app.types, &app.span)
        } else {
          let typ = self.check_expr(&app.expr);
          let typ_string = self.store.type_string(typ);
          self.error(DiagnosticMessage::TypeArgumentsForNonGeneric {
            typ: typ_string,
            span: app.span.clone(),
          });
          self.invalid()
        }
      },
      ASTExpression::Call(call) => self.check_call(call),
      ASTExpression::CompositeLit(lit) => {
        let typ = match &lit.typ {
          Some(typ_expr) => self.check_type(typ_expr),
          None => self.invalid(),
        };
        for elem in &lit.elems {
          // field keys are names, not expressions
          if let Some(key) = &elem.key {
            if !matches!(key, ASTExpression::Ident(_)) {
              self.check_expr(key);
            }
          }
          self.check_expr(&elem.value);
        }
        typ
      },
      ASTExpression::FuncLit { typ, body, .. } => {
        self.push_scope();
        let (params, results, variadic) = self.check_func_type_groups(typ, true);
        self.check_block(body);
        self.pop_scope();
        self
          .store
          .signature(None, params, results, variadic, SignatureGenerics::None)
      },
      ASTExpression::TypeAssert { expr, typ, .. } => {
        self.check_expr(expr);
        match typ {
          Some(typ) => self.check_type(typ),
          None => self.invalid(),
        }
      },
      ASTExpression::Slice { expr, low, high, .. } => {
        let t = self.check_expr(expr);
        if let Some(low) = low {
          self.check_expr(low);
        }
        if let Some(high) = high {
          self.check_expr(high);
        }
        t
      },
      ASTExpression::ArrayType { .. }
      | ASTExpression::MapType { .. }
      | ASTExpression::ChanType { .. }
      | ASTExpression::StructType(_)
      | ASTExpression::InterfaceType(_)
      | ASTExpression::FuncType(_) => self.check_type(expr),
      ASTExpression::Ellipsis { .. } | ASTExpression::Bad { .. } => self.invalid(),
    }
  }

  /// The generic target of a bracketed application, when the base names
  /// one: a generic type or function identifier, or a selector that
  /// resolves to a generic method.
  fn generic_application_target(
    &mut self,
    base: &ASTExpression,
  ) -> Option<ApplicationTarget> {
    match base {
      ASTExpression::Ident(ident) => {
        let obj = self.lookup(&ident.name)?;
        let name = self.sym(&ident.name);
        let kind = self.objects.get(&obj).kind.clone();
        match kind {
          ObjectKind::TypeName { .. } => {
            self.resolve_type_decl(&name);
            let typ = self.objects.get(&obj).typ;
            if matches!(
              self.store.get(&typ),
              Type::Named(named) if matches!(named.generics, NamedGenerics::Generic { .. })
            ) {
              self.info.uses.insert(ident.id, obj);
              return Some(ApplicationTarget::Direct(typ));
            }
            None
          },
          ObjectKind::Func => {
            let typ = self.objects.get(&obj).typ;
            if matches!(
              self.store.get(&typ),
              Type::Signature(sig)
                if matches!(&sig.generics, SignatureGenerics::Generic { type_params, .. } if !type_params.is_empty())
            ) {
              self.info.uses.insert(ident.id, obj);
              return Some(ApplicationTarget::Direct(typ));
            }
            None
          },
          _ => None,
        }
      },
      ASTExpression::Selector(sel) => {
        let recv_t = self.check_expr(&sel.expr);
        let member = self.sym(&sel.sel.name);
        let mut recv_t = recv_t;
        while let Type::Pointer { base } = self.store.get(&recv_t) {
          recv_t = *base;
        }
        let named = self.store.named_type(recv_t)?.clone();
        let (origin, recv_map) = match &named.generics {
          NamedGenerics::Concrete { origin, type_map } | NamedGenerics::Partial { origin, type_map } => {
            (*origin, type_map.clone())
          },
          _ => return None,
        };
        let origin_name = self.store.named_type(origin)?.name.clone();
        let key = format!("{}.{}", origin_name, member);
        let decl = self.registry.lookup(&key)?;
        let decl_typ = decl.typ;

        self.info.selections.insert(sel.id, Selection {
          kind: SelectionKind::MethodVal,
          recv_origin: Some(origin_name),
          member,
        });

        // translate the receiver's bindings onto the method's own
        // receiver-bracket parameter names, positionally
        let recv_names = match self.store.get(&decl_typ) {
          Type::Signature(sig) => match &sig.generics {
            SignatureGenerics::Generic { recv_type_params, .. } => recv_type_params.clone(),
            _ => Vec::new(),
          },
          _ => Vec::new(),
        };
        let origin_params = self.store.generic_param_order(origin);
        let mut extra = TypeMap::new();
        for (origin_param, recv_name) in origin_params.iter().zip(&recv_names) {
          if let Some(&bound) = recv_map.get(origin_param) {
            extra.insert(recv_name.clone(), bound);
          }
        }

        Some(ApplicationTarget::Method { decl_typ, extra })
      },
      ASTExpression::Paren { expr, .. } => self.generic_application_target(expr),
      _ => None,
    }
  }

  fn apply_application(
    &mut self,
    target: ApplicationTarget,
    _base: &ASTExpression,
    args: &[ASTExpression],
    span: &fo_type::source::Span,
  ) -> TypeId {
    match target {
      ApplicationTarget::Direct(typ) => self.apply_type_args(typ, args, span, None),
      ApplicationTarget::Method { decl_typ, extra } => self.apply_type_args(decl_typ, args, span, Some(extra)),
    }
  }

  fn check_selector(
    &mut self,
    sel: &ASTSelectorExpr,
  ) -> TypeId {
    // package member in value position: an unknown foreign value
    if let ASTExpression::Ident(base) = sel.expr.as_ref() {
      if let Some(obj) = self.lookup(&base.name) {
        if self.objects.get(&obj).kind == ObjectKind::PkgName {
          self.info.uses.insert(base.id, obj);
          return self.invalid();
        }
      }
    }

    let mut t = self.check_expr(&sel.expr);
    while let Type::Pointer { base } = self.store.get(&t) {
      t = *base;
    }
    let member = self.sym(&sel.sel.name);

    if let Some(named) = self.store.named_type(t).cloned() {
      if let Some(method) = named.methods.iter().find(|m| m.name == member) {
        let recv_origin = match &named.generics {
          NamedGenerics::Concrete { origin, .. } | NamedGenerics::Partial { origin, .. } => {
            self.store.named_type(*origin).map(|n| n.name.clone())
          },
          _ => Some(named.name.clone()),
        };
        self.info.selections.insert(sel.id, Selection {
          kind: SelectionKind::MethodVal,
          recv_origin,
          member,
        });
        return method.sig;
      }
      t = named.underlying;
    }

    if let Type::Struct(st) = self.store.get(&t).clone() {
      if let Some(field) = st.fields.iter().find(|f| f.name == member) {
        self.info.selections.insert(sel.id, Selection {
          kind: SelectionKind::FieldVal,
          recv_origin: None,
          member,
        });
        return field.typ;
      }
    }

    self.invalid()
  }

  fn check_call(
    &mut self,
    call: &fo_ast::ASTCallExpr,
  ) -> TypeId {
    // builtins treat some arguments as types
    if let ASTExpression::Ident(ident) = call.func.as_ref() {
      if let Some(obj) = self.lookup(&ident.name) {
        if let ObjectKind::Builtin(builtin) = self.objects.get(&obj).kind {
          self.info.uses.insert(ident.id, obj);
          return self.check_builtin_call(builtin, call);
        }
      }
    }

    let callee = self.check_expr(&call.func);
    for arg in &call.args {
      self.check_expr(arg);
    }

    match self.store.get(&callee).clone() {
      Type::Signature(sig) => sig.results.first().map(|r| r.typ).unwrap_or_else(|| self.invalid()),
      Type::Basic(BasicKind::Invalid) => self.invalid(),
      // anything else in callee position is a conversion
      _ => callee,
    }
  }

  fn check_builtin_call(
    &mut self,
    builtin: Builtin,
    call: &fo_ast::ASTCallExpr,
  ) -> TypeId {
    match builtin {
      Builtin::Make | Builtin::New => {
        let typ = call
          .args
          .first()
          .map(|arg| self.check_type(arg))
          .unwrap_or_else(|| self.invalid());
        for arg in call.args.iter().skip(1) {
          self.check_expr(arg);
        }
        if builtin == Builtin::New {
          self.store.pointer(typ)
        } else {
          typ
        }
      },
      Builtin::Append => {
        let first = call
          .args
          .first()
          .map(|arg| self.check_expr(arg))
          .unwrap_or_else(|| self.invalid());
        for arg in call.args.iter().skip(1) {
          self.check_expr(arg);
        }
        first
      },
      Builtin::Len | Builtin::Cap | Builtin::Copy => {
        for arg in &call.args {
          self.check_expr(arg);
        }
        self.store.basic(BasicKind::Int)
      },
      Builtin::Delete | Builtin::Panic | Builtin::Print | Builtin::Println => {
        for arg in &call.args {
          self.check_expr(arg);
        }
        self.invalid()
      },
    }
  }
}

enum ApplicationTarget {
  Direct(TypeId),
  Method { decl_typ: TypeId, extra: TypeMap },
}
