use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{cell::RefCell, rc::Rc};

use colored::Colorize;
use fo_checker::Checker;
use fo_config::{DebugTrace, DumpKind, FoConfig};
use fo_log::{phase_log, trace_dbg};
use fo_parser::{FoLexer, FoParser};
use fo_printer::Printer;
use fo_transform::Transformer;
use fo_type::source::SourceMap;
use fo_type::symbol::SymbolTable;

/// Transform dialect source text into base-language source text,
/// rendering any diagnostics against `source_map`. The whole pipeline
/// for one file: lex, parse, check, transform, print.
pub fn transform_source(
  config: &FoConfig,
  source_map: &mut SourceMap,
  path: &str,
  text: String,
) -> Result<String, ()> {
  let file_id = source_map.add_file(path, text);
  let src = source_map.file(file_id).text.clone();

  phase_log!(config, "Scanning... {}", path);
  let mut lexer = FoLexer::new(file_id, &src);
  lexer.scan_tokens();
  trace_dbg!(config, DebugTrace::Lexer, "produced {} tokens", lexer.tokens.len());

  if !lexer.diagnostics.is_empty() {
    for message in &lexer.diagnostics {
      fo_diagnostics::render(&message.report(), source_map);
    }
    return Err(());
  }

  if config.dump_requested(DumpKind::Lexer) {
    for token in &lexer.tokens {
      println!("{}", token);
    }
  }

  phase_log!(config, "Parsing... {}", path);
  let symbols = Rc::new(RefCell::new(SymbolTable::new()));
  let mut parser = FoParser::new(lexer.tokens, symbols.clone());
  let file = match parser.parse() {
    Ok(file) => file,
    Err(messages) => {
      for message in &messages {
        fo_diagnostics::render(&message.report(), source_map);
      }
      return Err(());
    },
  };
  trace_dbg!(config, DebugTrace::Parser, "parsed {} declarations", file.decls.len());

  if config.dump_requested(DumpKind::Ast) {
    println!("{}", fo_ast::display::format_ast(&file, symbols.clone()));
  }

  phase_log!(config, "Checking... {}", path);
  let checked = Checker::check(std::slice::from_ref(&file), symbols.clone());
  trace_dbg!(
    config,
    DebugTrace::Checker,
    "registry holds {} generic declarations",
    checked.registry.decl_names().len()
  );

  if config.dump_requested(DumpKind::Registry) {
    for name in checked.registry.decl_names() {
      let decl = checked.registry.lookup(name).unwrap();
      println!("{}: {} usage(s)", name, decl.usages.len());
      for key in decl.usages.keys() {
        println!("  [{}]", key);
      }
    }
  }

  if !checked.diagnostics.is_empty() {
    for message in &checked.diagnostics {
      fo_diagnostics::render(&message.report(), source_map);
    }
    return Err(());
  }

  phase_log!(config, "Transforming... {}", path);
  let mut transformer = Transformer::new(&checked, symbols.clone());
  let transformed = transformer.file(&file);
  trace_dbg!(
    config,
    DebugTrace::Transform,
    "emitted {} declarations",
    transformed.decls.len()
  );

  let output = Printer::new(symbols).print_file(&transformed);
  if config.dump_requested(DumpKind::Output) {
    println!("{}", output);
  }
  Ok(output)
}

/// Build one `.fo` file into a sibling `.go` file. Returns the output
/// path.
pub fn build_file(
  config: &Arc<FoConfig>,
  path: &str,
) -> Result<PathBuf, ()> {
  if !path.ends_with(".fo") {
    eprintln!(
      "{} {} is not a Fo file (expected '.fo' extension)",
      "Error:".red().bold(),
      path
    );
    return Err(());
  }

  let text = match std::fs::read_to_string(path) {
    Ok(text) => text,
    Err(e) => {
      eprintln!("{} could not open file '{}': {}", "Error:".red().bold(), path, e);
      return Err(());
    },
  };

  let mut source_map = SourceMap::new();
  let output = transform_source(config, &mut source_map, path, text)?;

  let output_path = PathBuf::from(path.trim_end_matches(".fo").to_string() + ".go");
  if let Err(e) = std::fs::write(&output_path, output) {
    eprintln!(
      "{} could not write '{}': {}",
      "Error:".red().bold(),
      output_path.display(),
      e
    );
    return Err(());
  }

  fo_log::phase_ok!(config, "{} -> {}", path, output_path.display());
  Ok(output_path)
}

/// Build every `.fo` file under `path` (or `path` itself when it is a
/// file).
pub fn build_path(
  config: &Arc<FoConfig>,
  path: &str,
) -> Result<(), ()> {
  let root = Path::new(path);
  if root.is_file() {
    return build_file(config, path).map(|_| ());
  }

  let mut sources = Vec::new();
  collect_fo_files(root, &mut sources).map_err(|e| {
    eprintln!("{} failed to walk '{}': {}", "Error:".red().bold(), path, e);
  })?;
  sources.sort();

  let mut failed = false;
  for source in &sources {
    let source = source.to_string_lossy();
    if build_file(config, &source).is_err() {
      eprintln!("{} error in '{}'", "Error:".red().bold(), source);
      failed = true;
    }
  }
  if failed { Err(()) } else { Ok(()) }
}

fn collect_fo_files(
  dir: &Path,
  out: &mut Vec<PathBuf>,
) -> std::io::Result<()> {
  for entry in std::fs::read_dir(dir)? {
    let entry = entry?;
    let path = entry.path();
    if path.is_dir() {
      collect_fo_files(&path, out)?;
    } else if path.extension().and_then(|e| e.to_str()) == Some("fo") {
      out.push(path);
    }
  }
  Ok(())
}

/// Build one file, then hand the output to the base-language toolchain.
pub fn run_file(
  config: &Arc<FoConfig>,
  file: &str,
) -> Result<(), ()> {
  let output_path = build_file(config, file)?;

  let status = std::process::Command::new("go")
    .arg("run")
    .arg(&output_path)
    .stdin(std::process::Stdio::inherit())
    .stdout(std::process::Stdio::inherit())
    .stderr(std::process::Stdio::inherit())
    .status();

  match status {
    Ok(status) if status.success() => Ok(()),
    Ok(status) => {
      fo_log::phase_fail!(config, "go run exited with {}", status);
      Err(())
    },
    Err(e) => {
      eprintln!("{} could not invoke the Go toolchain: {}", "Error:".red().bold(), e);
      Err(())
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn transform(src: &str) -> Result<String, ()> {
    let config = FoConfig {
      quiet: true,
      ..FoConfig::default()
    };
    let mut sm = SourceMap::new();
    transform_source(&config, &mut sm, "test.fo", src.to_string())
  }

  #[test]
  fn plain_go_passes_through() {
    let output = transform("package main\n\nfunc main() {\n}\n").unwrap();
    assert!(output.contains("package main"));
    assert!(output.contains("func main() {}"));
  }

  #[test]
  fn lexer_errors_fail_the_build() {
    assert!(transform("package main\n\nvar x = \"unterminated\n").is_err());
  }

  #[test]
  fn checker_errors_fail_the_build() {
    assert!(transform("package main\n\nvar x undeclared_type\n").is_err());
  }

  #[test]
  fn build_file_writes_a_go_sibling() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("box.fo");
    std::fs::write(
      &source,
      "package main\n\ntype Box[T] struct {\n\tval T\n}\n\nfunc main() {\n\tvar _ = Box[int]{}\n}\n",
    )
    .unwrap();

    let config = Arc::new(FoConfig {
      quiet: true,
      ..FoConfig::default()
    });
    let output_path = build_file(&config, source.to_str().unwrap()).unwrap();
    assert_eq!(output_path, dir.path().join("box.go"));

    let output = std::fs::read_to_string(output_path).unwrap();
    assert!(output.contains("type Box__int struct"));
    assert!(!output.contains("Box[int]"));
  }
}
