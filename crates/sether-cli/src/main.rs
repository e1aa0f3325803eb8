//! sether - build JavaScript libraries from one configuration.
//!
//! Parses the command line, sets up logging and dispatches to the command.

use clap::Parser;
use miette::Result;
use sether_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let ctx = commands::CommandContext::from_cli(&args).map_err(error::cli_error_to_miette)?;

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args, &ctx).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args, &ctx).await,
    };

    result.map_err(error::cli_error_to_miette)
}
