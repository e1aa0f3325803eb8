//! Command implementations.
//!
//! - [`build`] - run every enabled target and report sizes
//! - [`check`] - resolve configuration and plan targets without building

pub mod build;
pub mod check;
pub(crate) mod utils;

use std::path::PathBuf;

pub use build::execute as build_execute;
pub use check::execute as check_execute;

use crate::cli::Cli;
use crate::error::Result;

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root the configuration is discovered from.
    pub cwd: PathBuf,
    pub quiet: bool,
}

impl CommandContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self {
            cwd: utils::project_root(cli.cwd.as_deref())?,
            quiet: cli.quiet,
        })
    }
}
