//! Logging utilities for the compiler.
//!
//! Provides macros for phase logging (`phase_log!`, `phase_ok!`), debug
//! traces by category (`trace_dbg!`) and verbose logging (`log_dbg!`).
//! All output goes to stderr to avoid mixing with dumps on stdout.

use std::time::Duration;

use fo_config::{DebugTrace, FoConfig};

pub fn effective_verbose(config: &FoConfig) -> u8 {
  if config.quiet { 0 } else { config.verbose }
}

pub fn log_phase(config: &FoConfig) -> bool {
  effective_verbose(config) >= 1
}

pub fn log_debug(config: &FoConfig) -> bool {
  effective_verbose(config) >= 2
}

pub fn debug_trace_enabled(
  config: &FoConfig,
  trace: DebugTrace,
) -> bool {
  !config.quiet && config.debug_trace.contains(&trace)
}

/// Returns lowercase name of a DebugTrace variant for log output.
pub fn trace_name(trace: DebugTrace) -> &'static str {
  match trace {
    DebugTrace::Lexer => "lexer",
    DebugTrace::Parser => "parser",
    DebugTrace::Checker => "checker",
    DebugTrace::Transform => "transform",
  }
}

/// Format a duration for display (e.g., "75ms", "1.2s").
pub fn format_duration(d: Duration) -> String {
  let millis = d.as_millis();
  if millis < 1000 {
    format!("{}ms", millis)
  } else {
    format!("{:.1}s", d.as_secs_f64())
  }
}

/// Log a compiler phase message with an arrow prefix. Shown from `-v`.
#[macro_export]
macro_rules! phase_log {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use colored::Colorize;
      eprintln!("    {} {}", "-->".bright_green().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a successful completion (green check, no indent).
#[macro_export]
macro_rules! phase_ok {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if !$config.quiet {
      use colored::Colorize;
      eprintln!("{} {}", "\u{2713}".bright_green().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a failure (red cross, no indent).
#[macro_export]
macro_rules! phase_fail {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if !$config.quiet {
      use colored::Colorize;
      eprintln!("{} {}", "\u{2717}".bright_red().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a debug trace for a specific compiler component.
///
/// Output format: `debug[component]: message`
#[macro_export]
macro_rules! trace_dbg {
  ($config:expr, $trace:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::debug_trace_enabled($config, $trace) {
      eprintln!(
        "debug[{}]: {}",
        $crate::trace_name($trace),
        format!($fmt $(, $arg)*)
      );
    }
  }};
}

/// Log a verbose debug message (verbosity >= 2).
#[macro_export]
macro_rules! log_dbg {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_debug($config) {
      eprintln!("debug: {}", format!($fmt $(, $arg)*));
    }
  }};
}
