use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    batch::{self, BatchArgs},
    run::{self, RunArgs},
    snapshot::{self, SnapshotArgs},
    validate::{self, ValidateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "des-sim", about = "DES simulation description loader CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a description and report its catalogs without building anything.
    Validate(ValidateArgs),
    /// Build a single environment, with optional variable overrides.
    Run(RunArgs),
    /// Expand declared domains and build one environment per binding set.
    Batch(BatchArgs),
    /// Emit a versioned canonical snapshot of the loader state.
    Snapshot(SnapshotArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Validate(args) => validate::run(&args),
        Command::Run(args) => run::run(&args),
        Command::Batch(args) => batch::run(&args),
        Command::Snapshot(args) => snapshot::run(&args),
    }
}
