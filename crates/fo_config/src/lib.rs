//! Configuration assembled by the CLI and threaded into the driver.

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugTrace {
  Lexer,
  Parser,
  Checker,
  Transform,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DumpKind {
  Lexer,
  Ast,
  Registry,
  Output,
}

#[derive(Debug, Clone, Default)]
pub struct FoBuildConfig {
  /// File or directory to build; `.` when omitted.
  pub path: String,
  pub dump: Vec<DumpKind>,
}

impl FoBuildConfig {
  pub fn new(
    path: String,
    dump: Vec<DumpKind>,
  ) -> Self {
    Self { path, dump }
  }
}

#[derive(Debug, Clone, Default)]
pub struct FoRunConfig {
  pub file: String,
}

impl FoRunConfig {
  pub fn new(file: String) -> Self {
    Self { file }
  }
}

#[derive(Debug, Clone, Default)]
pub struct FoConfig {
  pub build_config: Option<FoBuildConfig>,
  pub run_config: Option<FoRunConfig>,
  pub quiet: bool,
  pub verbose: u8,
  pub debug_trace: Vec<DebugTrace>,
}

impl FoConfig {
  pub fn new(
    build_config: Option<FoBuildConfig>,
    run_config: Option<FoRunConfig>,
    quiet: bool,
    verbose: u8,
    debug_trace: Vec<DebugTrace>,
  ) -> Self {
    Self {
      build_config,
      run_config,
      quiet,
      verbose,
      debug_trace,
    }
  }

  pub fn dump_requested(
    &self,
    kind: DumpKind,
  ) -> bool {
    self
      .build_config
      .as_ref()
      .map(|bc| bc.dump.contains(&kind))
      .unwrap_or(false)
  }
}
