mod cli;
mod commands;
mod config;
mod engine;
mod logging;
mod lookup;
mod metadata;
mod organize;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            commands::menu::run(cli.quiet)?;
        }
        Commands::Convert(args) => {
            commands::convert::run(&args, cli.quiet)?;
        }
        Commands::Show { file, json } => {
            commands::show::run(&file, json, cli.quiet)?;
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
        }
    }

    Ok(())
}
