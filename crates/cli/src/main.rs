use std::process::ExitCode;

use clap::{ArgAction, Parser};

mod commands;
mod printer;

use commands::Command;
use driftsync_runtime::logging;

#[derive(Debug, Parser)]
#[command(
    name = "driftsync",
    version,
    about = "Two-way folder synchronization",
    propagate_version = true
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose).ok();

    match cli.command {
        Command::Sync(args) => commands::sync::run(args),
        Command::Plan(args) => commands::plan::run(args),
        Command::Status(args) => commands::status::run(args),
        Command::Remote(args) => commands::remote::run(args),
        Command::History(args) => commands::history::run(args),
    }
}
