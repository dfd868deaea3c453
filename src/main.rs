mod cli;
mod commands;
mod data;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // GRTOOL_LOG, when set, overrides the -v level.
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_env("GRTOOL_LOG")
        .init();

    match &cli.command {
        Commands::Create(args) => commands::create(args),
        Commands::Train(args) => commands::train(args),
        Commands::Predict(args) => commands::predict(args),
        Commands::Info(args) => commands::info(args),
    }
}
