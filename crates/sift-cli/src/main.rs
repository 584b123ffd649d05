//! Sift CLI - selective import bundling for web packages.
//!
//! Handles command-line argument parsing, logging initialization, and
//! command dispatch. Fatal build errors surface as a non-zero exit.

use clap::Parser;

mod cli;
mod commands;
mod logger;
mod resolver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);

    match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
    }
}
