pub mod diagnostic_report;
pub mod message;

use colored::Colorize;
use fo_type::source::{Span, SourceMap};

use crate::diagnostic_report::{Diagnostic, Severity};

/// Render one diagnostic to stderr:
///
/// ```text
/// Error[C0005]: wrong number of type arguments (expected 2 but got 1)
///   --> main.fo:4:10
/// 4 |     var _ = Tuple[int]{}
///   |             ^^^^^^^^^^
/// ```
pub fn render(
  diagnostic: &Diagnostic,
  source_map: &SourceMap,
) {
  let message = diagnostic.message.bold();
  let code = diagnostic.error_code.as_str();

  match diagnostic.severity {
    Severity::Info => eprintln!("{}[{}]: {}", "Info".blue().bold(), code.blue(), message),
    Severity::Warning => eprintln!("{}[{}]: {}", "Warning".yellow().bold(), code.yellow(), message),
    Severity::Error => eprintln!("{}[{}]: {}", "Error".red().bold(), code.red().bold(), message),
    Severity::Hint => eprintln!("{}[{}]: {}", "Hint".cyan().bold(), code.cyan(), message),
  }

  let span = &diagnostic.primary_span;
  let (line, col) = source_map.line_col(span);
  let name = &source_map.file(span.file).name;
  eprintln!("  {} {}:{}:{}", "-->".blue().bold(), name, line, col);
  for excerpt_line in excerpt(source_map, span) {
    eprintln!("{}", excerpt_line);
  }

  for label in &diagnostic.labels {
    let (line, col) = source_map.line_col(&label.span);
    eprintln!("  {} {} ({}:{})", "note:".blue().bold(), label.message, line, col);
  }
  for note in &diagnostic.notes {
    eprintln!("  {} {}", "note:".blue().bold(), note);
  }
  eprintln!();
}

/// The offending line plus a caret line underneath it. Tabs in the
/// source are mirrored into the caret line so the markers stay aligned
/// whatever the tab width.
fn excerpt(
  source_map: &SourceMap,
  span: &Span,
) -> Vec<String> {
  let (line, col) = source_map.line_col(span);
  let text = source_map.line_text(span.file, line);

  let mut caret = String::new();
  for c in text.chars().take(col.saturating_sub(1) as usize) {
    caret.push(if c == '\t' { '\t' } else { ' ' });
  }
  let width = (span.len() as usize).max(1);
  caret.push_str(&"^".repeat(width));

  let gutter = line.to_string();
  vec![
    format!("{} | {}", gutter, text),
    format!("{} | {}", " ".repeat(gutter.len()), caret),
  ]
}

/// Format a batch of diagnostics into a plain string, sorted by position
/// then code. Used by tests and by dump output where color is unwanted.
pub fn format_batch(
  diagnostics: &[Diagnostic],
  source_map: &SourceMap,
) -> String {
  let mut sorted = diagnostics.to_vec();
  sorted.sort_by(|a, b| {
    a.primary_span
      .lo
      .cmp(&b.primary_span.lo)
      .then_with(|| a.error_code.cmp(&b.error_code))
  });

  if sorted.is_empty() {
    return "(no diagnostics)".to_string();
  }

  let mut output = String::new();
  for diag in &sorted {
    let severity = match diag.severity {
      Severity::Error => "ERROR",
      Severity::Warning => "WARN",
      Severity::Info => "INFO",
      Severity::Hint => "HINT",
    };
    let (line, col) = source_map.line_col(&diag.primary_span);
    output.push_str(&format!("[{}] {}: {} at {}:{}\n", severity, diag.error_code, diag.message, line, col));
    for label in &diag.labels {
      let (line, col) = source_map.line_col(&label.span);
      output.push_str(&format!("  label: {} at {}:{}\n", label.message, line, col));
    }
    for note in &diag.notes {
      output.push_str(&format!("  note: {}\n", note));
    }
  }
  output
}
