//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "meal-benefit",
    version,
    about = "Compute meal benefit (VR/VA) entitlements from HR spreadsheets",
    long_about = "Reconcile the active roster with termination, admission, leave and\n\
                  exclusion lists, then compute each employee's prorated days, daily\n\
                  rate and benefit value for one evaluation period."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Disable ANSI colors in log output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the benefit table for one period and write it.
    Run(RunArgs),

    /// Print the columns and first rows of a source file.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Rule set directory (rules.yaml, vocabulary.yaml, ...).
    #[arg(long, value_name = "DIR")]
    pub rules: PathBuf,

    /// Directory holding the source spreadsheets.
    #[arg(long, value_name = "DIR")]
    pub data: PathBuf,

    /// YAML manifest mapping source roles to files.
    ///
    /// Without it, the standard file names are used and missing files are
    /// treated as absent sources.
    #[arg(long, value_name = "FILE")]
    pub sources: Option<PathBuf>,

    /// Output file (.xlsx or .csv).
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Directory holding the source spreadsheets.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub data: PathBuf,

    /// File to inspect, relative to the data directory.
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Number of sample rows to print.
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
