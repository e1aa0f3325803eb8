//! Command-line interface definition.
//!
//! - `sether build` - clean the output directory and run every enabled target
//! - `sether check` - resolve configuration and plan tasks without building

mod commands;
mod validation;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command};
pub use validation::parse_name;

/// sether - build JavaScript libraries with webpack and rollup
#[derive(Parser, Debug)]
#[command(
    name = "sether",
    version,
    about = "Build JavaScript libraries with webpack and rollup from one configuration",
    long_about = "sether derives CommonJS, UMD and ES module builds (plus any extra targets you\n\
                  declare) from one project configuration, runs them concurrently and reports\n\
                  output sizes."
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

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}
