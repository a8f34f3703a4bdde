use std::{cell::RefCell, rc::Rc};

use fo_checker::{Checker, CheckerOutput};
use fo_diagnostics::message::DiagnosticMessage;
use fo_parser::{FoLexer, FoParser};
use fo_printer::Printer;
use fo_transform::Transformer;
use fo_type::source::SourceMap;
use fo_type::symbol::SymbolTable;

pub struct TransformResult {
  pub output: String,
  pub checked: CheckerOutput,
  pub symbols: Rc<RefCell<SymbolTable>>,
}

/// Run the full pipeline: lexer -> parser -> checker -> transformer ->
/// printer. Returns the printed output plus the checker state, or the
/// accumulated diagnostics.
pub fn try_transform(src: &str) -> Result<TransformResult, Vec<DiagnosticMessage>> {
  let mut sm = SourceMap::new();
  let file_id = sm.add_file("test.fo", src.to_string());

  let text = sm.file(file_id).text.clone();
  let mut lexer = FoLexer::new(file_id, &text);
  lexer.scan_tokens();
  if !lexer.diagnostics.is_empty() {
    return Err(lexer.diagnostics);
  }

  let symbols = Rc::new(RefCell::new(SymbolTable::new()));
  let mut parser = FoParser::new(lexer.tokens, symbols.clone());
  let file = parser.parse()?;

  let checked = Checker::check(std::slice::from_ref(&file), symbols.clone());
  if !checked.diagnostics.is_empty() {
    return Err(checked.diagnostics);
  }

  let mut transformer = Transformer::new(&checked, symbols.clone());
  let transformed = transformer.file(&file);
  if let Err(e) = fo_transform::assert_monomorphic(&transformed, &checked.registry, &symbols) {
    panic!("transformer left generic syntax behind: {}", e);
  }

  let output = Printer::new(symbols.clone()).print_file(&transformed);
  Ok(TransformResult {
    output,
    checked,
    symbols,
  })
}

/// Transform and expect success.
#[allow(dead_code)]
pub fn transform(src: &str) -> String {
  match try_transform(src) {
    Ok(result) => result.output,
    Err(diags) => panic!("pipeline reported diagnostics: {:?}", diags),
  }
}

/// Diagnostics of a failing source, as `CODE: message` lines sorted by
/// position.
#[allow(dead_code)]
pub fn diagnostics(src: &str) -> Vec<String> {
  match try_transform(src) {
    Ok(_) => Vec::new(),
    Err(mut diags) => {
      diags.sort_by_key(|d| d.primary_span().lo);
      diags.iter().map(|d| format!("{}: {}", d.code(), d)).collect()
    },
  }
}
