use std::{cell::RefCell, rc::Rc};

use fo_checker::{Checker, CheckerOutput};
use fo_parser::{FoLexer, FoParser};
use fo_type::source::SourceMap;
use fo_type::symbol::SymbolTable;

pub struct CheckResult {
  pub output: CheckerOutput,
  pub source_map: SourceMap,
}

/// Run lexer -> parser -> checker over one source file.
pub fn check(src: &str) -> CheckResult {
  let mut sm = SourceMap::new();
  let file_id = sm.add_file("test.fo", src.to_string());

  let text = sm.file(file_id).text.clone();
  let mut lexer = FoLexer::new(file_id, &text);
  lexer.scan_tokens();
  assert!(lexer.diagnostics.is_empty(), "lexer errors: {:?}", lexer.diagnostics);

  let symbols = Rc::new(RefCell::new(SymbolTable::new()));
  let mut parser = FoParser::new(lexer.tokens, symbols.clone());
  let file = parser.parse().expect("parse failed");

  let output = Checker::check(std::slice::from_ref(&file), symbols);
  CheckResult { output, source_map: sm }
}

/// Diagnostics formatted for stable comparison: `CODE: message @line`,
/// sorted by position then code.
pub fn format_diagnostics(result: &CheckResult) -> String {
  let mut messages: Vec<_> = result.output.diagnostics.clone();
  messages.sort_by(|a, b| {
    a.primary_span()
      .lo
      .cmp(&b.primary_span().lo)
      .then_with(|| a.code().cmp(&b.code()))
  });

  if messages.is_empty() {
    return "(no diagnostics)".to_string();
  }

  let mut out = String::new();
  for message in &messages {
    let span = message.primary_span();
    let (line, _col) = result.source_map.line_col(&span);
    out.push_str(&format!("{}: {} @{}\n", message.code(), message, line));
  }
  out
}

#[allow(dead_code)]
pub fn assert_ok(src: &str) {
  let result = check(src);
  assert!(
    result.output.diagnostics.is_empty(),
    "expected no diagnostics, got: {}",
    format_diagnostics(&result)
  );
}

#[allow(dead_code)]
pub fn assert_codes(
  src: &str,
  expected: &[&str],
) {
  let result = check(src);
  let codes: Vec<String> = result.output.diagnostics.iter().map(|d| d.code()).collect();
  for code in expected {
    assert!(
      codes.contains(&code.to_string()),
      "expected {} in {:?}\n{}",
      code,
      codes,
      format_diagnostics(&result)
    );
  }
}
