use clap::{Parser, Subcommand, ValueEnum};
use fo_config::{DebugTrace, DumpKind};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DumpKindCli {
  /// Dump the lexer output
  Lexer,
  /// Dump the parsed syntax tree
  Ast,
  /// Dump the generic registry after checking
  Registry,
  /// Dump the transformed output to stdout
  Output,
}

impl From<DumpKindCli> for DumpKind {
  fn from(value: DumpKindCli) -> DumpKind {
    match value {
      DumpKindCli::Lexer => DumpKind::Lexer,
      DumpKindCli::Ast => DumpKind::Ast,
      DumpKindCli::Registry => DumpKind::Registry,
      DumpKindCli::Output => DumpKind::Output,
    }
  }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DebugTraceCli {
  Lexer,
  Parser,
  Checker,
  Transform,
}

impl From<DebugTraceCli> for DebugTrace {
  fn from(value: DebugTraceCli) -> DebugTrace {
    match value {
      DebugTraceCli::Lexer => DebugTrace::Lexer,
      DebugTraceCli::Parser => DebugTrace::Parser,
      DebugTraceCli::Checker => DebugTrace::Checker,
      DebugTraceCli::Transform => DebugTrace::Transform,
    }
  }
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct BuildCommand {
  /// File or directory to build; every `.fo` file gets a sibling `.go`
  pub path: Option<String>,
}

#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RunCommand {
  /// The `.fo` file to build and run
  pub file: String,
}

#[derive(Subcommand, Clone, PartialEq)]
pub enum SubCommand {
  /// Build a file or a directory tree
  Build(BuildCommand),
  /// Build a single file and run it with the Go toolchain
  Run(RunCommand),
}

#[derive(Parser)]
#[command(author, version, about = "Fo: an experimental language that adds generics to Go", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
  #[command(subcommand)]
  pub subcommand: SubCommand,

  /// Dump internal compiler representations
  #[arg(long, value_enum, action = clap::ArgAction::Append, global = true)]
  pub dump: Vec<DumpKindCli>,

  /// Enable debug tracing for subsystems
  #[arg(long, value_enum, action = clap::ArgAction::Append, global = true)]
  pub debug_trace: Vec<DebugTraceCli>,

  /// Don't print any output
  #[arg(long, short, default_value = "false", global = true)]
  pub quiet: bool,

  /// Use verbose output
  #[arg(long, short, action = clap::ArgAction::Count, global = true)]
  pub verbose: u8,
}
