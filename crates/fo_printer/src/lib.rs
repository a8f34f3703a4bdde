//! Canonical printer for the base (non-generic) language.
//!
//! Output is deterministic: tab indentation, one statement per line, a
//! blank line between top-level declarations, composite literals on one
//! line. Reproducible builds rely on this printer never consulting
//! anything but the tree itself.

use std::cell::RefCell;
use std::rc::Rc;

use fo_ast::{
  ASTBlock, ASTCompositeLit, ASTDeclaration, ASTExpression, ASTFieldGroup, ASTFile, ASTFuncDecl, ASTFuncType,
  ASTStatement, ASTTypeSpec, ASTValueSpec, ChanDirSyntax, ForHeader, ValueKind,
};
use fo_type::symbol::SymbolTable;

pub struct Printer {
  symbols: Rc<RefCell<SymbolTable>>,
  out: String,
  indent: usize,
}

/// Render one declaration on its own; used for stable sort tie-breaking
/// and for dumps.
pub fn print_declaration(
  decl: &ASTDeclaration,
  symbols: Rc<RefCell<SymbolTable>>,
) -> String {
  let mut printer = Printer::new(symbols);
  printer.print_declaration(decl);
  printer.out
}

impl Printer {
  pub fn new(symbols: Rc<RefCell<SymbolTable>>) -> Self {
    Self {
      symbols,
      out: String::new(),
      indent: 0,
    }
  }

  pub fn print_file(
    mut self,
    file: &ASTFile,
  ) -> String {
    self.push(&format!("package {}\n", self.name(&file.package.name)));
    for decl in &file.decls {
      self.push("\n");
      self.print_declaration(decl);
    }
    self.out
  }

  fn name(
    &self,
    id: &fo_type::symbol::SymbolId,
  ) -> String {
    self.symbols.borrow().get(id).to_string()
  }

  fn push(
    &mut self,
    s: &str,
  ) {
    self.out.push_str(s);
  }

  fn push_indent(&mut self) {
    for _ in 0..self.indent {
      self.out.push('\t');
    }
  }

  // ── Declarations ───────────────────────────────────────────────────

  fn print_declaration(
    &mut self,
    decl: &ASTDeclaration,
  ) {
    match decl {
      ASTDeclaration::Import(import) => {
        if import.grouped || import.specs.len() > 1 {
          self.push_indent();
          self.push("import (\n");
          self.indent += 1;
          for spec in &import.specs {
            self.push_indent();
            match &spec.alias {
              Some(alias) => {
                let alias = self.name(&alias.name);
                self.push(&format!("{} \"{}\"\n", alias, spec.path));
              },
              None => self.push(&format!("\"{}\"\n", spec.path)),
            }
          }
          self.indent -= 1;
          self.push_indent();
          self.push(")\n");
        } else if let Some(spec) = import.specs.first() {
          self.push_indent();
          match &spec.alias {
            Some(alias) => {
              let alias = self.name(&alias.name);
              self.push(&format!("import {} \"{}\"\n", alias, spec.path));
            },
            None => self.push(&format!("import \"{}\"\n", spec.path)),
          }
        }
      },
      ASTDeclaration::Type(type_decl) => {
        if type_decl.grouped || type_decl.specs.len() > 1 {
          self.push_indent();
          self.push("type (\n");
          self.indent += 1;
          for spec in &type_decl.specs {
            self.print_type_spec(spec, true);
          }
          self.indent -= 1;
          self.push_indent();
          self.push(")\n");
        } else if let Some(spec) = type_decl.specs.first() {
          self.push_indent();
          self.push("type ");
          self.print_type_spec(spec, false);
        }
      },
      ASTDeclaration::Value(value) => {
        let keyword = match value.kind {
          ValueKind::Var => "var",
          ValueKind::Const => "const",
        };
        if value.grouped || value.specs.len() > 1 {
          self.push_indent();
          self.push(keyword);
          self.push(" (\n");
          self.indent += 1;
          for spec in &value.specs {
            self.push_indent();
            self.print_value_spec(spec);
            self.push("\n");
          }
          self.indent -= 1;
          self.push_indent();
          self.push(")\n");
        } else if let Some(spec) = value.specs.first() {
          self.push_indent();
          self.push(keyword);
          self.push(" ");
          self.print_value_spec(spec);
          self.push("\n");
        }
      },
      ASTDeclaration::Func(func) => self.print_func_decl(func),
    }
  }

  fn print_type_spec(
    &mut self,
    spec: &ASTTypeSpec,
    in_group: bool,
  ) {
    if in_group {
      self.push_indent();
    }
    let name = self.name(&spec.name.name);
    self.push(&name);
    if let Some(tp) = &spec.type_params {
      let names: Vec<String> = tp.names.iter().map(|n| self.name(&n.name)).collect();
      self.push(&format!("[{}]", names.join(", ")));
    }
    if spec.is_alias {
      self.push(" = ");
    } else {
      self.push(" ");
    }
    self.print_expr(&spec.typ);
    self.push("\n");
  }

  fn print_value_spec(
    &mut self,
    spec: &ASTValueSpec,
  ) {
    let names: Vec<String> = spec.names.iter().map(|n| self.name(&n.name)).collect();
    self.push(&names.join(", "));
    if let Some(typ) = &spec.typ {
      self.push(" ");
      self.print_expr(typ);
    }
    if !spec.values.is_empty() {
      self.push(" = ");
      for (i, value) in spec.values.iter().enumerate() {
        if i > 0 {
          self.push(", ");
        }
        self.print_expr(value);
      }
    }
  }

  fn print_func_decl(
    &mut self,
    func: &ASTFuncDecl,
  ) {
    self.push_indent();
    self.push("func ");
    if let Some(recv) = &func.recv {
      self.push("(");
      if let Some(name) = &recv.name {
        let name = self.name(&name.name);
        self.push(&format!("{} ", name));
      }
      self.print_expr(&recv.typ);
      self.push(") ");
    }
    let name = self.name(&func.name.name);
    self.push(&name);
    if let Some(tp) = &func.type_params {
      let names: Vec<String> = tp.names.iter().map(|n| self.name(&n.name)).collect();
      self.push(&format!("[{}]", names.join(", ")));
    }
    self.print_signature(&func.sig);
    match &func.body {
      Some(body) => {
        self.push(" ");
        self.print_block(body);
        self.push("\n");
      },
      None => self.push("\n"),
    }
  }

  fn print_signature(
    &mut self,
    sig: &ASTFuncType,
  ) {
    self.push("(");
    self.print_field_groups(&sig.params);
    self.push(")");

    match sig.results.len() {
      0 => {},
      1 if sig.results[0].names.is_empty() => {
        self.push(" ");
        self.print_expr(&sig.results[0].typ);
      },
      _ => {
        self.push(" (");
        self.print_field_groups(&sig.results);
        self.push(")");
      },
    }
  }

  fn print_field_groups(
    &mut self,
    groups: &[ASTFieldGroup],
  ) {
    for (i, group) in groups.iter().enumerate() {
      if i > 0 {
        self.push(", ");
      }
      if !group.names.is_empty() {
        let names: Vec<String> = group.names.iter().map(|n| self.name(&n.name)).collect();
        self.push(&names.join(", "));
        self.push(" ");
      }
      self.print_expr(&group.typ);
    }
  }

  // ── Statements ─────────────────────────────────────────────────────

  fn print_block(
    &mut self,
    block: &ASTBlock,
  ) {
    if block.statements.is_empty() {
      self.push("{}");
      return;
    }
    self.push("{\n");
    self.indent += 1;
    for stmt in &block.statements {
      self.print_statement(stmt, true);
    }
    self.indent -= 1;
    self.push_indent();
    self.push("}");
  }

  fn print_statement(
    &mut self,
    stmt: &ASTStatement,
    standalone: bool,
  ) {
    if standalone {
      self.push_indent();
    }
    match stmt {
      ASTStatement::Block(block) => {
        self.print_block(block);
      },
      ASTStatement::Decl(decl) => {
        // local declarations print without the surrounding blank-line
        // logic of top-level ones
        match decl {
          ASTDeclaration::Value(value) => {
            let keyword = match value.kind {
              ValueKind::Var => "var",
              ValueKind::Const => "const",
            };
            if value.grouped || value.specs.len() > 1 {
              self.push(keyword);
              self.push(" (\n");
              self.indent += 1;
              for spec in &value.specs {
                self.push_indent();
                self.print_value_spec(spec);
                self.push("\n");
              }
              self.indent -= 1;
              self.push_indent();
              self.push(")");
            } else if let Some(spec) = value.specs.first() {
              self.push(keyword);
              self.push(" ");
              self.print_value_spec(spec);
            }
          },
          ASTDeclaration::Type(type_decl) => {
            if let Some(spec) = type_decl.specs.first() {
              self.push("type ");
              let name = self.name(&spec.name.name);
              self.push(&name);
              if spec.is_alias {
                self.push(" = ");
              } else {
                self.push(" ");
              }
              self.print_expr(&spec.typ);
            }
          },
          _ => {},
        }
      },
      ASTStatement::Expr(expr) => self.print_expr(expr),
      ASTStatement::Assign(assign) => {
        for (i, lhs) in assign.lhs.iter().enumerate() {
          if i > 0 {
            self.push(", ");
          }
          self.print_expr(lhs);
        }
        self.push(&format!(" {} ", assign.op.as_str()));
        for (i, rhs) in assign.rhs.iter().enumerate() {
          if i > 0 {
            self.push(", ");
          }
          self.print_expr(rhs);
        }
      },
      ASTStatement::IncDec { expr, inc, .. } => {
        self.print_expr(expr);
        self.push(if *inc { "++" } else { "--" });
      },
      ASTStatement::Return { results, .. } => {
        self.push("return");
        for (i, result) in results.iter().enumerate() {
          self.push(if i == 0 { " " } else { ", " });
          self.print_expr(result);
        }
      },
      ASTStatement::If(if_stmt) => {
        self.push("if ");
        if let Some(init) = &if_stmt.init {
          self.print_statement(init, false);
          self.push("; ");
        }
        self.print_expr(&if_stmt.cond);
        self.push(" ");
        self.print_block(&if_stmt.then);
        if let Some(else_) = &if_stmt.else_ {
          self.push(" else ");
          self.print_statement(else_, false);
        }
      },
      ASTStatement::For(for_stmt) => {
        self.push("for ");
        match &for_stmt.header {
          ForHeader::Cond(None) => {
            // bare loop
          },
          ForHeader::Cond(Some(cond)) => {
            self.print_expr(cond);
            self.push(" ");
          },
          ForHeader::Clauses { init, cond, post } => {
            if let Some(init) = init {
              self.print_statement(init, false);
            }
            self.push("; ");
            if let Some(cond) = cond {
              self.print_expr(cond);
            }
            self.push("; ");
            if let Some(post) = post {
              self.print_statement(post, false);
              self.push(" ");
            }
          },
          ForHeader::Range {
            key,
            value,
            define,
            expr,
          } => {
            if let Some(key) = key {
              self.print_expr(key);
              if let Some(value) = value {
                self.push(", ");
                self.print_expr(value);
              }
              self.push(if *define { " := " } else { " = " });
            }
            self.push("range ");
            self.print_expr(expr);
            self.push(" ");
          },
        }
        self.print_block(&for_stmt.body);
      },
      ASTStatement::Switch(switch) => {
        self.push("switch ");
        if let Some(init) = &switch.init {
          self.print_statement(init, false);
          self.push("; ");
        }
        if let Some(tag) = &switch.tag {
          self.print_expr(tag);
          self.push(" ");
        }
        if let Some(guard) = &switch.type_guard {
          if let Some(binding) = &guard.binding {
            let name = self.name(&binding.name);
            self.push(&format!("{} := ", name));
          }
          self.print_expr(&guard.expr);
          self.push(".(type) ");
        }
        self.push("{\n");
        for case in &switch.cases {
          self.push_indent();
          if case.exprs.is_empty() {
            self.push("default:\n");
          } else {
            self.push("case ");
            for (i, expr) in case.exprs.iter().enumerate() {
              if i > 0 {
                self.push(", ");
              }
              self.print_expr(expr);
            }
            self.push(":\n");
          }
          self.indent += 1;
          for stmt in &case.body {
            self.print_statement(stmt, true);
          }
          self.indent -= 1;
        }
        self.push_indent();
        self.push("}");
      },
      ASTStatement::Branch { kind, label, .. } => {
        self.push(kind.as_str());
        if let Some(label) = label {
          let name = self.name(&label.name);
          self.push(&format!(" {}", name));
        }
      },
      ASTStatement::Go { call, .. } => {
        self.push("go ");
        self.print_expr(call);
      },
      ASTStatement::Defer { call, .. } => {
        self.push("defer ");
        self.print_expr(call);
      },
      ASTStatement::Send { chan, value, .. } => {
        self.print_expr(chan);
        self.push(" <- ");
        self.print_expr(value);
      },
      ASTStatement::Empty { .. } => {},
    }
    if standalone {
      self.push("\n");
    }
  }

  // ── Expressions ────────────────────────────────────────────────────

  fn print_expr(
    &mut self,
    expr: &ASTExpression,
  ) {
    match expr {
      ASTExpression::Ident(ident) => {
        let name = self.name(&ident.name);
        self.push(&name);
      },
      ASTExpression::BasicLit(lit) => self.push(&lit.value),
      ASTExpression::CompositeLit(lit) => self.print_composite_lit(lit),
      ASTExpression::FuncLit { typ, body, .. } => {
        self.push("func");
        self.print_signature(typ);
        self.push(" ");
        self.print_block(body);
      },
      ASTExpression::Paren { expr, .. } => {
        self.push("(");
        self.print_expr(expr);
        self.push(")");
      },
      ASTExpression::Selector(sel) => {
        self.print_expr(&sel.expr);
        let name = self.name(&sel.sel.name);
        self.push(&format!(".{}", name));
      },
      ASTExpression::Index(index) => {
        self.print_expr(&index.expr);
        self.push("[");
        self.print_expr(&index.index);
        self.push("]");
      },
      ASTExpression::Slice { expr, low, high, .. } => {
        self.print_expr(expr);
        self.push("[");
        if let Some(low) = low {
          self.print_expr(low);
        }
        self.push(":");
        if let Some(high) = high {
          self.print_expr(high);
        }
        self.push("]");
      },
      ASTExpression::TypeAssert { expr, typ, .. } => {
        self.print_expr(expr);
        match typ {
          Some(typ) => {
            self.push(".(");
            self.print_expr(typ);
            self.push(")");
          },
          None => self.push(".(type)"),
        }
      },
      ASTExpression::Call(call) => {
        self.print_expr(&call.func);
        self.push("(");
        for (i, arg) in call.args.iter().enumerate() {
          if i > 0 {
            self.push(", ");
          }
          self.print_expr(arg);
        }
        if call.ellipsis {
          self.push("...");
        }
        self.push(")");
      },
      ASTExpression::Star { expr, .. } => {
        self.push("*");
        self.print_expr(expr);
      },
      ASTExpression::Unary { op, expr, .. } => {
        self.push(op.as_str());
        self.print_expr(expr);
      },
      ASTExpression::Binary { op, left, right, .. } => {
        self.print_expr(left);
        self.push(&format!(" {} ", op.as_str()));
        self.print_expr(right);
      },
      ASTExpression::TypeArg(app) => {
        self.print_expr(&app.expr);
        self.push("[");
        for (i, arg) in app.types.iter().enumerate() {
          if i > 0 {
            self.push(", ");
          }
          self.print_expr(arg);
        }
        self.push("]");
      },
      ASTExpression::ArrayType { len, elem, .. } => {
        self.push("[");
        if let Some(len) = len {
          self.print_expr(len);
        }
        self.push("]");
        self.print_expr(elem);
      },
      ASTExpression::Ellipsis { elem, .. } => {
        self.push("...");
        if let Some(elem) = elem {
          self.print_expr(elem);
        }
      },
      ASTExpression::StructType(st) => {
        if st.fields.is_empty() {
          self.push("struct{}");
          return;
        }
        self.push("struct {\n");
        self.indent += 1;
        for field in &st.fields {
          self.push_indent();
          if !field.names.is_empty() {
            let names: Vec<String> = field.names.iter().map(|n| self.name(&n.name)).collect();
            self.push(&names.join(", "));
            self.push(" ");
          }
          self.print_expr(&field.typ);
          if let Some(tag) = &field.tag {
            self.push(&format!(" \"{}\"", tag));
          }
          self.push("\n");
        }
        self.indent -= 1;
        self.push_indent();
        self.push("}");
      },
      ASTExpression::FuncType(ft) => {
        self.push("func");
        self.print_signature(ft);
      },
      ASTExpression::InterfaceType(it) => {
        if it.methods.is_empty() {
          self.push("interface{}");
          return;
        }
        self.push("interface {\n");
        self.indent += 1;
        for method in &it.methods {
          self.push_indent();
          if let Some(name) = method.names.first() {
            let name = self.name(&name.name);
            self.push(&name);
            if let ASTExpression::FuncType(ft) = &method.typ {
              self.print_signature(ft);
            }
          } else {
            self.print_expr(&method.typ);
          }
          self.push("\n");
        }
        self.indent -= 1;
        self.push_indent();
        self.push("}");
      },
      ASTExpression::MapType { key, value, .. } => {
        self.push("map[");
        self.print_expr(key);
        self.push("]");
        self.print_expr(value);
      },
      ASTExpression::ChanType { dir, value, .. } => {
        match dir {
          ChanDirSyntax::SendRecv => self.push("chan "),
          ChanDirSyntax::SendOnly => self.push("chan<- "),
          ChanDirSyntax::RecvOnly => self.push("<-chan "),
        }
        self.print_expr(value);
      },
      ASTExpression::Bad { .. } => self.push("/* bad expression */"),
    }
  }

  fn print_composite_lit(
    &mut self,
    lit: &ASTCompositeLit,
  ) {
    if let Some(typ) = &lit.typ {
      self.print_expr(typ);
    }
    self.push("{");
    for (i, elem) in lit.elems.iter().enumerate() {
      if i > 0 {
        self.push(", ");
      }
      if let Some(key) = &elem.key {
        self.print_expr(key);
        self.push(": ");
      }
      self.print_expr(&elem.value);
    }
    self.push("}");
  }
}
