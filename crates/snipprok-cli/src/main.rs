//! Snipprok CLI: code snippets to PNG cards.

use anyhow::Result;
use clap::Parser;
use snipprok_cli::cli::{Cli, Commands};
use snipprok_cli::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match &cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Preview(args) => commands::preview::run(args),
        Commands::Languages => commands::languages::run(),
    }
}

/// Initialize logging based on verbosity flag.
fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
