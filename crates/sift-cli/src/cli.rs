//! Command-line interface definition, using clap v4 derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Sift - selective import bundling for web packages
#[derive(Parser, Debug)]
#[command(
    name = "sift",
    version,
    about = "Selective import bundling for web packages",
    long_about = "Sift assembles dual-target (modern/legacy) build pipelines and decides,\n\
                  per import statement, whether a dependency is resolved into the bundle\n\
                  or deferred to a runtime import map."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the package's target profiles
    Build(BuildArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Package root to build (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output directory, relative to the package root
    #[arg(long, default_value = "dist")]
    pub out_dir: PathBuf,

    /// Production build: enables the minification stage
    #[arg(long)]
    pub production: bool,

    /// Emit sourcemaps
    #[arg(long)]
    pub sourcemap: bool,

    /// Profiles to execute (overrides the config's target toggles).
    /// May be given multiple times, e.g. --profile modern --profile legacy
    #[arg(long = "profile", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Print the generated pipeline descriptors as JSON and exit without
    /// building
    #[arg(long)]
    pub dry_run: bool,
}
