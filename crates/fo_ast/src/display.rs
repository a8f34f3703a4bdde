//! Compact s-expression dump of the syntax tree, used by `--dump ast`.

use std::cell::RefCell;
use std::rc::Rc;

use fo_type::symbol::SymbolTable;

use crate::{ASTDeclaration, ASTExpression, ASTFile, ASTStatement};

pub fn format_ast(
  file: &ASTFile,
  symbols: Rc<RefCell<SymbolTable>>,
) -> String {
  let symbols = symbols.borrow();
  let mut out = format!("(file package: {}\n", symbols.get(&file.package.name));
  for decl in &file.decls {
    out.push_str(&format_decl(decl, &symbols, 1));
  }
  out.push(')');
  out.push('\n');
  out
}

fn indent(depth: usize) -> String {
  "  ".repeat(depth)
}

fn format_decl(
  decl: &ASTDeclaration,
  symbols: &SymbolTable,
  depth: usize,
) -> String {
  match decl {
    ASTDeclaration::Import(d) => {
      let paths: Vec<_> = d.specs.iter().map(|s| s.path.as_str()).collect();
      format!("{}(import {})\n", indent(depth), paths.join(" "))
    },
    ASTDeclaration::Type(d) => {
      let mut out = format!("{}(type\n", indent(depth));
      for spec in &d.specs {
        out.push_str(&format!(
          "{}(spec {}{} {})\n",
          indent(depth + 1),
          symbols.get(&spec.name.name),
          spec
            .type_params
            .as_ref()
            .map(|tp| {
              let names: Vec<_> = tp.names.iter().map(|n| symbols.get(&n.name)).collect();
              format!("[{}]", names.join(" "))
            })
            .unwrap_or_default(),
          format_expr(&spec.typ, symbols),
        ));
      }
      out.push_str(&format!("{})\n", indent(depth)));
      out
    },
    ASTDeclaration::Value(d) => {
      let kind = match d.kind {
        crate::ValueKind::Var => "var",
        crate::ValueKind::Const => "const",
      };
      let mut out = format!("{}({}\n", indent(depth), kind);
      for spec in &d.specs {
        let names: Vec<_> = spec.names.iter().map(|n| symbols.get(&n.name)).collect();
        out.push_str(&format!("{}(spec {})\n", indent(depth + 1), names.join(" ")));
      }
      out.push_str(&format!("{})\n", indent(depth)));
      out
    },
    ASTDeclaration::Func(d) => {
      let mut out = format!("{}(func {}", indent(depth), symbols.get(&d.name.name));
      if let Some(tp) = &d.type_params {
        let names: Vec<_> = tp.names.iter().map(|n| symbols.get(&n.name)).collect();
        out.push_str(&format!(" [{}]", names.join(" ")));
      }
      if let Some(body) = &d.body {
        out.push_str(&format!(" ({} statements)", count_statements(&body.statements)));
      }
      out.push_str(")\n");
      out
    },
  }
}

fn count_statements(statements: &[ASTStatement]) -> usize {
  statements.len()
}

fn format_expr(
  expr: &ASTExpression,
  symbols: &SymbolTable,
) -> String {
  match expr {
    ASTExpression::Ident(ident) => symbols.get(&ident.name).to_string(),
    ASTExpression::Selector(sel) => {
      format!("{}.{}", format_expr(&sel.expr, symbols), symbols.get(&sel.sel.name))
    },
    ASTExpression::Star { expr, .. } => format!("*{}", format_expr(expr, symbols)),
    ASTExpression::ArrayType { len, elem, .. } => match len {
      Some(len) => format!("[{}]{}", format_expr(len, symbols), format_expr(elem, symbols)),
      None => format!("[]{}", format_expr(elem, symbols)),
    },
    ASTExpression::MapType { key, value, .. } => {
      format!("map[{}]{}", format_expr(key, symbols), format_expr(value, symbols))
    },
    ASTExpression::TypeArg(app) => {
      let args: Vec<_> = app.types.iter().map(|t| format_expr(t, symbols)).collect();
      format!("{}[{}]", format_expr(&app.expr, symbols), args.join(" "))
    },
    ASTExpression::StructType(st) => format!("(struct {} fields)", st.fields.len()),
    ASTExpression::InterfaceType(it) => format!("(interface {} methods)", it.methods.len()),
    ASTExpression::FuncType(_) => "(func-type)".to_string(),
    other => format!("({:?})", std::mem::discriminant(other)),
  }
}
