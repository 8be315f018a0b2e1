use std::process::ExitCode;

use clap::Parser;
use hashline_tools::cli::{Cli, Commands};
use hashline_tools::error::HashlineError;

fn main() -> ExitCode {
    match run() {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn run() -> Result<String, HashlineError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Read(args) => hashline_tools::cli::read::run_read(args),
        Commands::Edit(args) => hashline_tools::cli::edit::run_edit(args),
    }
}
