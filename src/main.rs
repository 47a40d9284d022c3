//! Meal benefit command-line tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use meal_benefit_engine::config::ConfigLoader;
use meal_benefit_engine::engine::compute_benefits;
use meal_benefit_engine::error::EngineResult;
use meal_benefit_engine::io::{
    FileTableLoader, FileTableWriter, SourceManifest, TableWriter, inspect_table, load_sources,
};
use meal_benefit_engine::logging::{LogConfig, LogFormat, init_logging};
use meal_benefit_engine::summary::{ErrorSummary, RunSummary};

mod cli;

use crate::cli::{Cli, Command, InspectArgs, LogFormatArg, RunArgs};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let outcome = match &cli.command {
        Command::Run(args) => run(args).map(|summary| print_json(&summary)),
        Command::Inspect(args) => inspect(args).map(|value| print_json(&value)),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            print_json(&ErrorSummary::from(&error));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RunArgs) -> EngineResult<RunSummary> {
    let rules = ConfigLoader::load(&args.rules)?.into_rule_set();
    let loader = FileTableLoader::new(&args.data);
    let manifest = match &args.sources {
        Some(path) => SourceManifest::from_file(path)?,
        None => SourceManifest::standard().present_in(&loader),
    };

    let sources = load_sources(&loader, &manifest)?;
    let run = compute_benefits(&rules, &sources)?;

    let output = FileTableWriter::new(rules.output_sheet()).save(&run.table, &args.output)?;
    info!(run_id = %run.run_id, output = %output.display(), "Wrote output table");
    Ok(RunSummary::new(&run, &output))
}

fn inspect(args: &InspectArgs) -> EngineResult<serde_json::Value> {
    inspect_table(&FileTableLoader::new(&args.data), &args.file, args.rows)
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(error) => eprintln!("error: failed to serialize summary: {error}"),
    }
}

/// Builds the logging configuration from CLI flags.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_format(format)
        .with_ansi(!cli.no_color && io::stderr().is_terminal())
}
