mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let args = Cli::parse();
    cli::setup_logging(args.verbose);

    let res = match &args.command {
        Commands::Links(args) => cli::links::run(args),
        Commands::Pairs(args) => cli::pairs::run(args),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
