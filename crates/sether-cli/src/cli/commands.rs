use clap::{Args, Subcommand};

use crate::cli::validation::parse_name;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every enabled target
    ///
    /// Cleans the output directory, runs all targets concurrently and prints
    /// a size table. Exits non-zero if any target fails.
    Build(BuildArgs),

    /// Validate configuration and show the planned targets
    ///
    /// Loads the configuration, derives targets and checks that no two
    /// targets write the same output. Nothing is built.
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Project name used in output file names
    ///
    /// Defaults to `name` in the config file, then the package name.
    #[arg(short, long, value_parser = parse_name)]
    pub name: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Project name used in output file names
    #[arg(short, long, value_parser = parse_name)]
    pub name: Option<String>,

    /// Print each target's resolved configuration as JSON
    #[arg(long)]
    pub print_config: bool,
}
