mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser as ClapParser;
use fo_config::{FoBuildConfig, FoConfig, FoRunConfig};

use crate::cli::{Cli, SubCommand};

fn main() -> ExitCode {
  let cli = Cli::parse();

  let dump = cli.dump.iter().map(|d| (*d).into()).collect();
  let debug_trace = cli.debug_trace.iter().map(|t| (*t).into()).collect();

  let (build_config, run_config) = match &cli.subcommand {
    SubCommand::Build(build) => {
      let path = build.path.clone().unwrap_or_else(|| ".".to_string());
      (Some(FoBuildConfig::new(path, dump)), None)
    },
    SubCommand::Run(run) => (None, Some(FoRunConfig::new(run.file.clone()))),
  };

  let config = Arc::new(FoConfig::new(
    build_config,
    run_config,
    cli.quiet,
    cli.verbose,
    debug_trace,
  ));

  let result = match &cli.subcommand {
    SubCommand::Build(_) => {
      let path = config.build_config.as_ref().map(|b| b.path.clone()).unwrap_or_default();
      fo_driver::build_path(&config, &path)
    },
    SubCommand::Run(run) => fo_driver::run_file(&config, &run.file),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(()) => ExitCode::FAILURE,
  }
}
