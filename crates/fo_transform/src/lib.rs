//! Syntactic monomorphization: rewrites a checked file so that every
//! generic declaration is replaced by one concrete declaration per
//! recorded usage and every usage site names the concrete declaration.
//!
//! The tree is walked twice. Pass one emits concrete declarations by
//! cloning generic ones (receiver expansion, type-parameter erasure,
//! scoped identifier rewrite, deterministic ordering). Pass two rewrites
//! references: explicit argument applications and the parser's ambiguous
//! index expressions over names that resolved to generics.

mod mangle;

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use fo_ast::{
  ASTCompositeLit, ASTDeclaration, ASTExpression, ASTFieldGroup, ASTFile, ASTFuncDecl, ASTFuncType, ASTIdent,
  ASTSelectorExpr, ASTStatement, ASTTypeDecl, ASTTypeSpec, ChanDirSyntax, ForHeader, NodeId,
};
use fo_checker::{CheckerOutput, Objects, ObjectKind, SelectionKind};
use fo_type::generics::{GenericDecl, GenericRegistry};
use fo_type::symbol::SymbolTable;
use fo_type::types::{ChanDir, NamedGenerics, SignatureGenerics, Type, TypeId, TypeMap, TypeStore};

pub use mangle::NameMangler;

pub struct Transformer<'a> {
  store: &'a TypeStore,
  registry: &'a GenericRegistry,
  objects: &'a Objects,
  info: &'a fo_checker::Info,
  symbols: Rc<RefCell<SymbolTable>>,
  mangler: NameMangler,
}

impl<'a> Transformer<'a> {
  pub fn new(
    checked: &'a CheckerOutput,
    symbols: Rc<RefCell<SymbolTable>>,
  ) -> Self {
    let mut transformer = Self {
      store: &checked.store,
      registry: &checked.registry,
      objects: &checked.objects,
      info: &checked.info,
      symbols,
      mangler: NameMangler::new(),
    };
    transformer.populate_mangler();
    transformer
  }

  /// The collision map is filled before either pass runs, in the
  /// registry's deterministic order, so declaration names and usage
  /// sites always agree.
  fn populate_mangler(&mut self) {
    for name in self.registry.decl_names() {
      let decl = self.registry.lookup(name).expect("decl_names lists registered names");
      let base = base_name(&decl.name);
      let own = self.own_params(decl);
      for usage in decl.usages.values() {
        let tuple = self.semantic_tuple(&own, &usage.type_map);
        self.mangler.register(&base, &tuple);
      }
    }
  }

  /// The parameters that participate in a declaration's mangled name:
  /// all of them for types and functions, only the method's own for
  /// methods (the receiver's arguments show up in the receiver type).
  fn own_params(
    &self,
    decl: &GenericDecl,
  ) -> Vec<String> {
    match self.store.get(&decl.typ) {
      Type::Signature(sig) => match &sig.generics {
        SignatureGenerics::Generic { type_params, .. } => type_params.clone(),
        _ => decl.type_params.clone(),
      },
      _ => decl.type_params.clone(),
    }
  }

  fn semantic_tuple(
    &self,
    params: &[String],
    map: &TypeMap,
  ) -> Vec<String> {
    params
      .iter()
      .map(|p| {
        map
          .get(p)
          .map(|t| self.store.type_string(*t))
          .unwrap_or_else(|| p.clone())
      })
      .collect()
  }

  fn sym(
    &self,
    id: &fo_type::symbol::SymbolId,
  ) -> String {
    self.symbols.borrow().get(id).to_string()
  }

  fn intern(
    &self,
    name: &str,
  ) -> fo_type::symbol::SymbolId {
    self.symbols.borrow_mut().intern(name)
  }

  fn synthetic_ident(
    &self,
    name: &str,
  ) -> ASTIdent {
    ASTIdent::synthetic(self.intern(name))
  }

  /// Transform one file: emit concrete declarations, then rewrite
  /// references.
  pub fn file(
    &mut self,
    file: &ASTFile,
  ) -> ASTFile {
    let mut decls = Vec::new();
    for decl in &file.decls {
      match decl {
        ASTDeclaration::Type(type_decl) => {
          if let Some(new_decl) = self.transform_type_decl(type_decl) {
            decls.push(new_decl);
          }
        },
        ASTDeclaration::Func(func) => {
          decls.extend(self.transform_func_decl(func));
        },
        other => decls.push(other.clone()),
      }
    }

    let mut new_file = ASTFile::new(file.package.clone(), decls, file.span.clone());
    for decl in &mut new_file.decls {
      self.rewrite_decl(decl);
    }
    new_file
  }

  // ── Pass 1: emit concrete declarations ─────────────────────────────

  fn transform_type_decl(
    &mut self,
    decl: &ASTTypeDecl,
  ) -> Option<ASTDeclaration> {
    let mut specs: Vec<ASTTypeSpec> = Vec::new();

    for spec in &decl.specs {
      let name = self.sym(&spec.name.name);
      let Some(generic) = self.registry.lookup(&name) else {
        specs.push(spec.clone());
        continue;
      };
      if generic.usages.is_empty() {
        continue;
      }

      let body = self.effective_spec_body(spec);
      let params = generic.type_params.clone();
      for usage in generic.usages.values().cloned().collect::<Vec<_>>() {
        let tuple = self.semantic_tuple(&params, &usage.type_map);
        let new_name = self.mangler.mangled(&name, &tuple);
        let mut new_typ = body.clone();
        self.replace_in_expr(&mut new_typ, &usage.type_map);
        specs.push(ASTTypeSpec {
          name: self.synthetic_ident(&new_name),
          type_params: None,
          is_alias: false,
          typ: new_typ,
          span: spec.span.clone(),
        });
      }
    }

    if specs.is_empty() {
      return None;
    }
    let symbols = self.symbols.borrow();
    specs.sort_by(|a, b| symbols.get(&a.name.name).cmp(symbols.get(&b.name.name)));
    drop(symbols);

    Some(ASTDeclaration::Type(ASTTypeDecl {
      specs,
      grouped: decl.grouped,
      span: decl.span.clone(),
    }))
  }

  /// The body of a generic type spec, with the ambiguous `[len] elem`
  /// head reinterpreted: a registered generic spec without explicit
  /// parameters whose body parses as an array over a lone identifier is
  /// really a one-parameter declaration over `elem`.
  fn effective_spec_body(
    &self,
    spec: &ASTTypeSpec,
  ) -> ASTExpression {
    if spec.type_params.is_none() {
      if let ASTExpression::ArrayType {
        len: Some(len),
        elem,
        ..
      } = &spec.typ
      {
        if matches!(len.as_ref(), ASTExpression::Ident(_)) {
          return (**elem).clone();
        }
      }
    }
    spec.typ.clone()
  }

  fn transform_func_decl(
    &mut self,
    func: &ASTFuncDecl,
  ) -> Vec<ASTDeclaration> {
    let func_name = self.sym(&func.name.name);

    // receiver shape: base type name plus whether arguments are spelled
    let recv_info = func.recv.as_ref().and_then(|recv| {
      let mut typ = &recv.typ;
      if let ASTExpression::Star { expr, .. } = typ {
        typ = expr.as_ref();
      }
      let (base, arg_idents) = match typ {
        ASTExpression::TypeArg(app) => {
          let idents: Vec<String> = app
            .types
            .iter()
            .filter_map(|t| t.as_ident().map(|i| self.sym(&i.name)))
            .collect();
          (app.expr.as_ref(), Some(idents))
        },
        other => (other, None),
      };
      match base {
        ASTExpression::Ident(ident) => Some((self.sym(&ident.name), arg_idents)),
        _ => None,
      }
    });

    let recv_generic = recv_info
      .as_ref()
      .and_then(|(name, _)| self.registry.lookup(name).map(|d| (name.clone(), d.clone())));

    let own_key = match &recv_info {
      Some((recv_name, _)) => format!("{}.{}", recv_name, func_name),
      None => func_name.clone(),
    };
    let own_generic = if func.type_params.is_some() {
      self.registry.lookup(&own_key).cloned()
    } else {
      None
    };

    let mut emitted: Vec<ASTFuncDecl> = Vec::new();

    if let Some(decl) = own_generic {
      // a generic function or generic method: one clone per usage of
      // the function itself
      let own = self.own_params(&decl);
      let recv_param_count = decl.type_params.len() - own.len();
      let recv_param_names: Vec<String> = decl.type_params[..recv_param_count].to_vec();

      for usage in decl.usages.values() {
        let mut new_func = func.clone();
        if let Some((recv_name, _)) = &recv_generic {
          let args: Vec<ASTExpression> = recv_param_names
            .iter()
            .map(|p| self.binding_expr(&usage.type_map, p))
            .collect();
          self.expand_receiver_type(&mut new_func, recv_name, args);
        }
        let tuple = self.semantic_tuple(&own, &usage.type_map);
        new_func.name = self.synthetic_ident(&self.mangler.mangled(&func_name, &tuple));
        new_func.type_params = None;
        self.replace_in_func(&mut new_func, &usage.type_map);
        emitted.push(new_func);
      }
    } else if let Some((recv_name, decl)) = recv_generic {
      if func.type_params.is_some() {
        // bracketed but never registered (the check failed): a generic
        // declaration without usages is deleted
        return Vec::new();
      }
      // a method on a generic receiver with no parameters of its own:
      // one clone per usage of the receiver type
      for usage in decl.usages.values() {
        let mut new_func = func.clone();
        let args: Vec<ASTExpression> = decl
          .type_params
          .iter()
          .map(|p| self.binding_expr(&usage.type_map, p))
          .collect();
        self.expand_receiver_type(&mut new_func, &recv_name, args);

        // the method's receiver brackets may rename the declaration's
        // parameters; translate positionally for the body rewrite
        let map = match &recv_info {
          Some((_, Some(arg_idents))) if !arg_idents.is_empty() => {
            let mut translated = TypeMap::new();
            for (bracket_name, decl_param) in arg_idents.iter().zip(&decl.type_params) {
              if let Some(&bound) = usage.type_map.get(decl_param) {
                translated.insert(bracket_name.clone(), bound);
              }
            }
            translated
          },
          _ => usage.type_map.clone(),
        };
        self.replace_in_func(&mut new_func, &map);
        emitted.push(new_func);
      }
    } else if func.type_params.is_some() {
      // generic but never used: deleted outright
      return Vec::new();
    } else {
      return vec![ASTDeclaration::Func(func.clone())];
    }

    self.sort_funcs(&mut emitted);
    emitted.into_iter().map(ASTDeclaration::Func).collect()
  }

  /// Alphabetical by name; two emitted methods can share a name on
  /// different receivers, so ties fall back to the printed form of the
  /// whole declaration.
  fn sort_funcs(
    &self,
    funcs: &mut [ASTFuncDecl],
  ) {
    funcs.sort_by(|a, b| {
      let an = self.sym(&a.name.name);
      let bn = self.sym(&b.name.name);
      an.cmp(&bn).then_with(|| {
        let pa = fo_printer::print_declaration(&ASTDeclaration::Func(a.clone()), self.symbols.clone());
        let pb = fo_printer::print_declaration(&ASTDeclaration::Func(b.clone()), self.symbols.clone());
        pa.cmp(&pb)
      })
    });
  }

  /// Rewrite `func (r T) m(...)` to `func (r T[conc, ...]) m(...)` when
  /// the source omitted the receiver's type arguments; explicit argument
  /// brackets are left for the identifier rewrite.
  fn expand_receiver_type(
    &mut self,
    func: &mut ASTFuncDecl,
    recv_name: &str,
    args: Vec<ASTExpression>,
  ) {
    let Some(recv) = &mut func.recv else { return };

    let target = match &mut recv.typ {
      ASTExpression::Star { expr, .. } => expr.as_mut(),
      other => other,
    };
    if matches!(target, ASTExpression::TypeArg(_)) {
      return;
    }
    if let ASTExpression::Ident(ident) = target {
      if self.symbols.borrow().get(&ident.name) == recv_name {
        let base = ident.clone();
        let span = base.span.clone();
        *target = ASTExpression::TypeArg(fo_ast::ASTTypeArgExpr {
          id: NodeId::NONE,
          expr: Box::new(ASTExpression::Ident(base)),
          types: args,
          span,
        });
      }
    }
  }

  /// The syntactic form of a bound type, for receiver expansion and the
  /// scoped identifier rewrite.
  fn binding_expr(
    &mut self,
    map: &TypeMap,
    param: &str,
  ) -> ASTExpression {
    match map.get(param) {
      Some(&typ) => self.type_to_expr(typ),
      None => ASTExpression::Ident(self.synthetic_ident(param)),
    }
  }

  fn type_to_expr(
    &mut self,
    typ: TypeId,
  ) -> ASTExpression {
    match self.store.get(&typ) {
      Type::Basic(kind) => ASTExpression::Ident(self.synthetic_ident(kind.name())),
      Type::TypeParam(name) => {
        let name = name.clone();
        ASTExpression::Ident(self.synthetic_ident(&name))
      },
      Type::Pointer { base } => {
        let inner = self.type_to_expr(*base);
        ASTExpression::Star {
          expr: Box::new(inner),
          span: Default::default(),
        }
      },
      Type::Slice { elem } => {
        let inner = self.type_to_expr(*elem);
        ASTExpression::ArrayType {
          len: None,
          elem: Box::new(inner),
          span: Default::default(),
        }
      },
      Type::Array { len, elem } => {
        let len = *len;
        let inner = self.type_to_expr(*elem);
        ASTExpression::ArrayType {
          len: Some(Box::new(ASTExpression::BasicLit(fo_ast::ASTBasicLit {
            kind: fo_ast::LitKind::Int,
            value: len.to_string(),
            span: Default::default(),
          }))),
          elem: Box::new(inner),
          span: Default::default(),
        }
      },
      Type::Map { key, elem } => {
        let (key, elem) = (*key, *elem);
        let key = self.type_to_expr(key);
        let value = self.type_to_expr(elem);
        ASTExpression::MapType {
          key: Box::new(key),
          value: Box::new(value),
          span: Default::default(),
        }
      },
      Type::Chan { dir, elem } => {
        let dir = match dir {
          ChanDir::SendRecv => ChanDirSyntax::SendRecv,
          ChanDir::SendOnly => ChanDirSyntax::SendOnly,
          ChanDir::RecvOnly => ChanDirSyntax::RecvOnly,
        };
        let inner = self.type_to_expr(*elem);
        ASTExpression::ChanType {
          dir,
          value: Box::new(inner),
          span: Default::default(),
        }
      },
      Type::Named(named) => {
        let base = match &named.pkg {
          Some(pkg) => {
            let pkg_ident = self.synthetic_ident(pkg);
            let sel = self.synthetic_ident(&named.name);
            ASTExpression::Selector(ASTSelectorExpr {
              id: NodeId::NONE,
              expr: Box::new(ASTExpression::Ident(pkg_ident)),
              sel,
              span: Default::default(),
            })
          },
          None => ASTExpression::Ident(self.synthetic_ident(&named.name)),
        };
        match &named.generics {
          NamedGenerics::Concrete { origin, type_map } | NamedGenerics::Partial { origin, type_map } => {
            let params = self.store.generic_param_order(*origin);
            let map = type_map.clone();
            let types = params.iter().map(|p| self.binding_expr(&map, p)).collect();
            ASTExpression::TypeArg(fo_ast::ASTTypeArgExpr {
              id: NodeId::NONE,
              expr: Box::new(base),
              types,
              span: Default::default(),
            })
          },
          _ => base,
        }
      },
      Type::Signature(sig) => {
        let sig = sig.clone();
        let params = sig
          .params
          .iter()
          .map(|p| {
            let typ = self.type_to_expr(p.typ);
            ASTFieldGroup {
              names: Vec::new(),
              typ,
              tag: None,
              span: Default::default(),
            }
          })
          .collect();
        let results = sig
          .results
          .iter()
          .map(|r| {
            let typ = self.type_to_expr(r.typ);
            ASTFieldGroup {
              names: Vec::new(),
              typ,
              tag: None,
              span: Default::default(),
            }
          })
          .collect();
        ASTExpression::FuncType(ASTFuncType {
          params,
          results,
          span: Default::default(),
        })
      },
      Type::Struct(_) | Type::Interface(_) => {
        // literal struct/interface arguments keep their printed form
        let name = self.store.type_string(typ);
        ASTExpression::Ident(self.synthetic_ident(&name))
      },
    }
  }

  // ── Scoped identifier rewrite ──────────────────────────────────────

  fn replace_in_func(
    &mut self,
    func: &mut ASTFuncDecl,
    map: &TypeMap,
  ) {
    if let Some(recv) = &mut func.recv {
      let mut typ = std::mem::replace(&mut recv.typ, ASTExpression::Bad { span: Default::default() });
      self.replace_in_expr(&mut typ, map);
      recv.typ = typ;
    }
    self.replace_in_func_type(&mut func.sig, map);
    if let Some(body) = &mut func.body {
      let mut statements = std::mem::take(&mut body.statements);
      for stmt in &mut statements {
        self.replace_in_stmt(stmt, map);
      }
      body.statements = statements;
    }
  }

  fn replace_in_func_type(
    &mut self,
    sig: &mut ASTFuncType,
    map: &TypeMap,
  ) {
    for group in sig.params.iter_mut().chain(sig.results.iter_mut()) {
      self.replace_in_expr(&mut group.typ, map);
    }
  }

  fn replace_in_stmt(
    &mut self,
    stmt: &mut ASTStatement,
    map: &TypeMap,
  ) {
    match stmt {
      ASTStatement::Block(block) => {
        for s in &mut block.statements {
          self.replace_in_stmt(s, map);
        }
      },
      ASTStatement::Decl(decl) => match decl {
        ASTDeclaration::Value(value) => {
          for spec in &mut value.specs {
            if let Some(typ) = &mut spec.typ {
              self.replace_in_expr(typ, map);
            }
            for v in &mut spec.values {
              self.replace_in_expr(v, map);
            }
          }
        },
        ASTDeclaration::Type(type_decl) => {
          for spec in &mut type_decl.specs {
            self.replace_in_expr(&mut spec.typ, map);
          }
        },
        _ => {},
      },
      ASTStatement::Expr(expr) => self.replace_in_expr(expr, map),
      ASTStatement::Assign(assign) => {
        for e in assign.lhs.iter_mut().chain(assign.rhs.iter_mut()) {
          self.replace_in_expr(e, map);
        }
      },
      ASTStatement::IncDec { expr, .. } => self.replace_in_expr(expr, map),
      ASTStatement::Return { results, .. } => {
        for e in results {
          self.replace_in_expr(e, map);
        }
      },
      ASTStatement::If(if_stmt) => {
        if let Some(init) = &mut if_stmt.init {
          self.replace_in_stmt(init, map);
        }
        self.replace_in_expr(&mut if_stmt.cond, map);
        for s in &mut if_stmt.then.statements {
          self.replace_in_stmt(s, map);
        }
        if let Some(else_) = &mut if_stmt.else_ {
          self.replace_in_stmt(else_, map);
        }
      },
      ASTStatement::For(for_stmt) => {
        match &mut for_stmt.header {
          ForHeader::Cond(cond) => {
            if let Some(cond) = cond {
              self.replace_in_expr(cond, map);
            }
          },
          ForHeader::Clauses { init, cond, post } => {
            if let Some(init) = init {
              self.replace_in_stmt(init, map);
            }
            if let Some(cond) = cond {
              self.replace_in_expr(cond, map);
            }
            if let Some(post) = post {
              self.replace_in_stmt(post, map);
            }
          },
          ForHeader::Range { key, value, expr, .. } => {
            if let Some(key) = key {
              self.replace_in_expr(key, map);
            }
            if let Some(value) = value {
              self.replace_in_expr(value, map);
            }
            self.replace_in_expr(expr, map);
          },
        }
        for s in &mut for_stmt.body.statements {
          self.replace_in_stmt(s, map);
        }
      },
      ASTStatement::Switch(switch) => {
        if let Some(init) = &mut switch.init {
          self.replace_in_stmt(init, map);
        }
        if let Some(tag) = &mut switch.tag {
          self.replace_in_expr(tag, map);
        }
        if let Some(guard) = &mut switch.type_guard {
          self.replace_in_expr(&mut guard.expr, map);
        }
        for case in &mut switch.cases {
          for e in &mut case.exprs {
            self.replace_in_expr(e, map);
          }
          for s in &mut case.body {
            self.replace_in_stmt(s, map);
          }
        }
      },
      ASTStatement::Go { call, .. } | ASTStatement::Defer { call, .. } => self.replace_in_expr(call, map),
      ASTStatement::Send { chan, value, .. } => {
        self.replace_in_expr(chan, map);
        self.replace_in_expr(value, map);
      },
      ASTStatement::Branch { .. } | ASTStatement::Empty { .. } => {},
    }
  }

  /// Replace identifiers spelled like an active type parameter with the
  /// syntactic form of the bound type. Positions that can never
  /// reference a type are skipped: selector members, composite-literal
  /// field keys, and declaration names.
  fn replace_in_expr(
    &mut self,
    expr: &mut ASTExpression,
    map: &TypeMap,
  ) {
    match expr {
      ASTExpression::Ident(ident) => {
        let name = self.sym(&ident.name);
        if let Some(&bound) = map.get(&name) {
          if !self.store.is_type_param(bound) {
            *expr = self.type_to_expr(bound);
          }
        }
      },
      ASTExpression::BasicLit(_) | ASTExpression::Bad { .. } => {},
      ASTExpression::CompositeLit(ASTCompositeLit { typ, elems, .. }) => {
        if let Some(typ) = typ {
          self.replace_in_expr(typ, map);
        }
        for elem in elems {
          // keys are field names, not type references
          if let Some(key) = &mut elem.key {
            if !matches!(key, ASTExpression::Ident(_)) {
              self.replace_in_expr(key, map);
            }
          }
          self.replace_in_expr(&mut elem.value, map);
        }
      },
      ASTExpression::FuncLit { typ, body, .. } => {
        self.replace_in_func_type(typ, map);
        for s in &mut body.statements {
          self.replace_in_stmt(s, map);
        }
      },
      ASTExpression::Paren { expr, .. } => self.replace_in_expr(expr, map),
      ASTExpression::Selector(sel) => self.replace_in_expr(&mut sel.expr, map),
      ASTExpression::Index(index) => {
        self.replace_in_expr(&mut index.expr, map);
        self.replace_in_expr(&mut index.index, map);
      },
      ASTExpression::Slice { expr, low, high, .. } => {
        self.replace_in_expr(expr, map);
        if let Some(low) = low {
          self.replace_in_expr(low, map);
        }
        if let Some(high) = high {
          self.replace_in_expr(high, map);
        }
      },
      ASTExpression::TypeAssert { expr, typ, .. } => {
        self.replace_in_expr(expr, map);
        if let Some(typ) = typ {
          self.replace_in_expr(typ, map);
        }
      },
      ASTExpression::Call(call) => {
        self.replace_in_expr(&mut call.func, map);
        for arg in &mut call.args {
          self.replace_in_expr(arg, map);
        }
      },
      ASTExpression::Star { expr, .. } | ASTExpression::Unary { expr, .. } => self.replace_in_expr(expr, map),
      ASTExpression::Binary { left, right, .. } => {
        self.replace_in_expr(left, map);
        self.replace_in_expr(right, map);
      },
      ASTExpression::TypeArg(app) => {
        self.replace_in_expr(&mut app.expr, map);
        for t in &mut app.types {
          self.replace_in_expr(t, map);
        }
      },
      ASTExpression::ArrayType { len, elem, .. } => {
        if let Some(len) = len {
          self.replace_in_expr(len, map);
        }
        self.replace_in_expr(elem, map);
      },
      ASTExpression::Ellipsis { elem, .. } => {
        if let Some(elem) = elem {
          self.replace_in_expr(elem, map);
        }
      },
      ASTExpression::StructType(st) => {
        for field in &mut st.fields {
          self.replace_in_expr(&mut field.typ, map);
        }
      },
      ASTExpression::FuncType(ft) => self.replace_in_func_type(ft, map),
      ASTExpression::InterfaceType(it) => {
        for method in &mut it.methods {
          self.replace_in_expr(&mut method.typ, map);
        }
      },
      ASTExpression::MapType { key, value, .. } => {
        self.replace_in_expr(key, map);
        self.replace_in_expr(value, map);
      },
      ASTExpression::ChanType { value, .. } => self.replace_in_expr(value, map),
    }
  }

  // ── Pass 2: rewrite references ─────────────────────────────────────

  fn rewrite_decl(
    &mut self,
    decl: &mut ASTDeclaration,
  ) {
    match decl {
      ASTDeclaration::Import(_) => {},
      ASTDeclaration::Type(type_decl) => {
        for spec in &mut type_decl.specs {
          self.rewrite_expr(&mut spec.typ);
        }
      },
      ASTDeclaration::Value(value) => {
        for spec in &mut value.specs {
          if let Some(typ) = &mut spec.typ {
            self.rewrite_expr(typ);
          }
          for v in &mut spec.values {
            self.rewrite_expr(v);
          }
        }
      },
      ASTDeclaration::Func(func) => {
        if let Some(recv) = &mut func.recv {
          let mut typ = std::mem::replace(&mut recv.typ, ASTExpression::Bad { span: Default::default() });
          self.rewrite_expr(&mut typ);
          recv.typ = typ;
        }
        for group in func.sig.params.iter_mut().chain(func.sig.results.iter_mut()) {
          self.rewrite_expr(&mut group.typ);
        }
        if let Some(body) = &mut func.body {
          let mut statements = std::mem::take(&mut body.statements);
          for stmt in &mut statements {
            self.rewrite_stmt(stmt);
          }
          body.statements = statements;
        }
      },
    }
  }

  fn rewrite_stmt(
    &mut self,
    stmt: &mut ASTStatement,
  ) {
    match stmt {
      ASTStatement::Block(block) => {
        for s in &mut block.statements {
          self.rewrite_stmt(s);
        }
      },
      ASTStatement::Decl(decl) => self.rewrite_decl(decl),
      ASTStatement::Expr(expr) => self.rewrite_expr(expr),
      ASTStatement::Assign(assign) => {
        for e in assign.lhs.iter_mut().chain(assign.rhs.iter_mut()) {
          self.rewrite_expr(e);
        }
      },
      ASTStatement::IncDec { expr, .. } => self.rewrite_expr(expr),
      ASTStatement::Return { results, .. } => {
        for e in results {
          self.rewrite_expr(e);
        }
      },
      ASTStatement::If(if_stmt) => {
        if let Some(init) = &mut if_stmt.init {
          self.rewrite_stmt(init);
        }
        self.rewrite_expr(&mut if_stmt.cond);
        for s in &mut if_stmt.then.statements {
          self.rewrite_stmt(s);
        }
        if let Some(else_) = &mut if_stmt.else_ {
          self.rewrite_stmt(else_);
        }
      },
      ASTStatement::For(for_stmt) => {
        match &mut for_stmt.header {
          ForHeader::Cond(cond) => {
            if let Some(cond) = cond {
              self.rewrite_expr(cond);
            }
          },
          ForHeader::Clauses { init, cond, post } => {
            if let Some(init) = init {
              self.rewrite_stmt(init);
            }
            if let Some(cond) = cond {
              self.rewrite_expr(cond);
            }
            if let Some(post) = post {
              self.rewrite_stmt(post);
            }
          },
          ForHeader::Range { key, value, expr, .. } => {
            if let Some(key) = key {
              self.rewrite_expr(key);
            }
            if let Some(value) = value {
              self.rewrite_expr(value);
            }
            self.rewrite_expr(expr);
          },
        }
        for s in &mut for_stmt.body.statements {
          self.rewrite_stmt(s);
        }
      },
      ASTStatement::Switch(switch) => {
        if let Some(init) = &mut switch.init {
          self.rewrite_stmt(init);
        }
        if let Some(tag) = &mut switch.tag {
          self.rewrite_expr(tag);
        }
        if let Some(guard) = &mut switch.type_guard {
          self.rewrite_expr(&mut guard.expr);
        }
        for case in &mut switch.cases {
          for e in &mut case.exprs {
            self.rewrite_expr(e);
          }
          for s in &mut case.body {
            self.rewrite_stmt(s);
          }
        }
      },
      ASTStatement::Go { call, .. } | ASTStatement::Defer { call, .. } => self.rewrite_expr(call),
      ASTStatement::Send { chan, value, .. } => {
        self.rewrite_expr(chan);
        self.rewrite_expr(value);
      },
      ASTStatement::Branch { .. } | ASTStatement::Empty { .. } => {},
    }
  }

  /// Pre-order: an application computes its replacement from the not-
  /// yet-rewritten argument syntax, then only the replacement's base is
  /// descended into.
  fn rewrite_expr(
    &mut self,
    expr: &mut ASTExpression,
  ) {
    if let Some(replacement) = self.try_rewrite_application(expr) {
      *expr = replacement;
      if let ASTExpression::Selector(sel) = expr {
        let mut base = std::mem::replace(
          &mut sel.expr,
          Box::new(ASTExpression::Bad { span: Default::default() }),
        );
        self.rewrite_expr(&mut base);
        sel.expr = base;
      }
      return;
    }

    match expr {
      ASTExpression::Ident(_) | ASTExpression::BasicLit(_) | ASTExpression::Bad { .. } => {},
      ASTExpression::CompositeLit(lit) => {
        if let Some(typ) = &mut lit.typ {
          self.rewrite_expr(typ);
        }
        for elem in &mut lit.elems {
          if let Some(key) = &mut elem.key {
            self.rewrite_expr(key);
          }
          self.rewrite_expr(&mut elem.value);
        }
      },
      ASTExpression::FuncLit { typ, body, .. } => {
        for group in typ.params.iter_mut().chain(typ.results.iter_mut()) {
          self.rewrite_expr(&mut group.typ);
        }
        for s in &mut body.statements {
          self.rewrite_stmt(s);
        }
      },
      ASTExpression::Paren { expr, .. } => self.rewrite_expr(expr),
      ASTExpression::Selector(sel) => self.rewrite_expr(&mut sel.expr),
      ASTExpression::Index(index) => {
        self.rewrite_expr(&mut index.expr);
        self.rewrite_expr(&mut index.index);
      },
      ASTExpression::Slice { expr, low, high, .. } => {
        self.rewrite_expr(expr);
        if let Some(low) = low {
          self.rewrite_expr(low);
        }
        if let Some(high) = high {
          self.rewrite_expr(high);
        }
      },
      ASTExpression::TypeAssert { expr, typ, .. } => {
        self.rewrite_expr(expr);
        if let Some(typ) = typ {
          self.rewrite_expr(typ);
        }
      },
      ASTExpression::Call(call) => {
        self.rewrite_expr(&mut call.func);
        for arg in &mut call.args {
          self.rewrite_expr(arg);
        }
      },
      ASTExpression::Star { expr, .. } | ASTExpression::Unary { expr, .. } => self.rewrite_expr(expr),
      ASTExpression::Binary { left, right, .. } => {
        self.rewrite_expr(left);
        self.rewrite_expr(right);
      },
      ASTExpression::TypeArg(app) => {
        // not a registered generic: left for the downstream compiler
        self.rewrite_expr(&mut app.expr);
        for t in &mut app.types {
          self.rewrite_expr(t);
        }
      },
      ASTExpression::ArrayType { len, elem, .. } => {
        if let Some(len) = len {
          self.rewrite_expr(len);
        }
        self.rewrite_expr(elem);
      },
      ASTExpression::Ellipsis { elem, .. } => {
        if let Some(elem) = elem {
          self.rewrite_expr(elem);
        }
      },
      ASTExpression::StructType(st) => {
        for field in &mut st.fields {
          self.rewrite_expr(&mut field.typ);
        }
      },
      ASTExpression::FuncType(ft) => {
        for group in ft.params.iter_mut().chain(ft.results.iter_mut()) {
          self.rewrite_expr(&mut group.typ);
        }
      },
      ASTExpression::InterfaceType(it) => {
        for method in &mut it.methods {
          self.rewrite_expr(&mut method.typ);
        }
      },
      ASTExpression::MapType { key, value, .. } => {
        self.rewrite_expr(key);
        self.rewrite_expr(value);
      },
      ASTExpression::ChanType { value, .. } => self.rewrite_expr(value),
    }
  }

  /// If `expr` is an argument application over a known generic (either
  /// an explicit `TypeArgExpr` or an ambiguous single-element
  /// `IndexExpr`), produce its rewritten reference.
  fn try_rewrite_application(
    &mut self,
    expr: &ASTExpression,
  ) -> Option<ASTExpression> {
    let (base, args): (&ASTExpression, Vec<&ASTExpression>) = match expr {
      ASTExpression::TypeArg(app) => (app.expr.as_ref(), app.types.iter().collect()),
      ASTExpression::Index(index) => (index.expr.as_ref(), vec![index.index.as_ref()]),
      _ => return None,
    };

    match base {
      ASTExpression::Ident(ident) => {
        let name = self.sym(&ident.name);
        if !self.registry.contains(&name) {
          return None;
        }
        let tuple = self.syntactic_tuple(&args);
        let mangled = self.mangler.mangled(&name, &tuple);
        Some(ASTExpression::Ident(self.synthetic_ident(&mangled)))
      },
      ASTExpression::Selector(sel) => {
        let selection = self.info.selections.get(&sel.id)?;
        let key = match selection.kind {
          SelectionKind::MethodVal => {
            let origin = selection.recv_origin.as_ref()?;
            format!("{}.{}", origin, selection.member)
          },
          SelectionKind::FieldVal => selection.member.clone(),
        };
        if !self.registry.contains(&key) {
          return None;
        }
        let tuple = self.syntactic_tuple(&args);
        let mangled = self.mangler.mangled(&selection.member, &tuple);
        Some(ASTExpression::Selector(ASTSelectorExpr {
          id: NodeId::NONE,
          expr: sel.expr.clone(),
          sel: self.synthetic_ident(&mangled),
          span: sel.span.clone(),
        }))
      },
      _ => None,
    }
  }

  /// Render argument expressions the way the type model renders types,
  /// collapsing declared aliases to their targets.
  fn syntactic_tuple(
    &self,
    args: &[&ASTExpression],
  ) -> Vec<String> {
    args.iter().map(|arg| self.expr_arg_string(arg)).collect()
  }

  fn expr_arg_string(
    &self,
    expr: &ASTExpression,
  ) -> String {
    match expr {
      ASTExpression::Ident(ident) => {
        if let Some(obj) = self.info.uses.get(&ident.id) {
          let object = self.objects.get(obj);
          if let ObjectKind::TypeName { is_alias: true } = object.kind {
            return self.store.type_string(object.typ);
          }
        }
        self.sym(&ident.name)
      },
      ASTExpression::Selector(sel) => {
        format!("{}.{}", self.expr_arg_string(&sel.expr), self.sym(&sel.sel.name))
      },
      ASTExpression::Paren { expr, .. } => self.expr_arg_string(expr),
      ASTExpression::Star { expr, .. } => format!("*{}", self.expr_arg_string(expr)),
      ASTExpression::ArrayType { len: None, elem, .. } => format!("[]{}", self.expr_arg_string(elem)),
      ASTExpression::ArrayType {
        len: Some(len),
        elem,
        ..
      } => format!("[{}]{}", self.expr_arg_string(len), self.expr_arg_string(elem)),
      ASTExpression::BasicLit(lit) => lit.value.clone(),
      ASTExpression::MapType { key, value, .. } => {
        format!("map[{}]{}", self.expr_arg_string(key), self.expr_arg_string(value))
      },
      ASTExpression::ChanType { dir, value, .. } => match dir {
        ChanDirSyntax::SendRecv => format!("chan {}", self.expr_arg_string(value)),
        ChanDirSyntax::SendOnly => format!("chan<- {}", self.expr_arg_string(value)),
        ChanDirSyntax::RecvOnly => format!("<-chan {}", self.expr_arg_string(value)),
      },
      ASTExpression::TypeArg(app) => {
        let args: Vec<String> = app.types.iter().map(|t| self.expr_arg_string(t)).collect();
        format!("{}[{}]", self.expr_arg_string(&app.expr), args.join(","))
      },
      ASTExpression::Index(index) => {
        format!("{}[{}]", self.expr_arg_string(&index.expr), self.expr_arg_string(&index.index))
      },
      ASTExpression::FuncType(ft) => {
        let params: Vec<String> = ft.params.iter().map(|g| self.expr_arg_string(&g.typ)).collect();
        let results: Vec<String> = ft.results.iter().map(|g| self.expr_arg_string(&g.typ)).collect();
        match results.len() {
          0 => format!("func({})", params.join(", ")),
          1 => format!("func({}) {}", params.join(", "), results[0]),
          _ => format!("func({}) ({})", params.join(", "), results.join(", ")),
        }
      },
      ASTExpression::StructType(_) => "struct".to_string(),
      ASTExpression::InterfaceType(it) if it.methods.is_empty() => "interface{}".to_string(),
      other => format!("{:?}", std::mem::discriminant(other)),
    }
  }
}

fn base_name(decl_name: &str) -> String {
  decl_name.rsplit('.').next().unwrap_or(decl_name).to_string()
}

/// Post-transformation check used by tests: no type-parameter syntax and
/// no declaration from the registry may survive in the output tree.
pub fn assert_monomorphic(
  file: &ASTFile,
  registry: &GenericRegistry,
  symbols: &Rc<RefCell<SymbolTable>>,
) -> Result<(), String> {
  let generic_names: HashSet<String> = registry.decl_names().iter().map(|n| n.to_string()).collect();

  for decl in &file.decls {
    if let ASTDeclaration::Func(func) = decl {
      if func.type_params.is_some() {
        return Err(format!("type parameters survived on {}", symbols.borrow().get(&func.name.name)));
      }
    }
    if let ASTDeclaration::Type(type_decl) = decl {
      for spec in &type_decl.specs {
        if spec.type_params.is_some() {
          return Err(format!("type parameters survived on {}", symbols.borrow().get(&spec.name.name)));
        }
        let name = symbols.borrow().get(&spec.name.name).to_string();
        if generic_names.contains(&name) {
          return Err(format!("generic declaration {} survived", name));
        }
      }
    }
  }
  Ok(())
}
