//! sether CLI.
//!
//! Builds a JavaScript library with two bundlers from a single project
//! configuration: a streaming bundler for the ES module build and a
//! callback bundler for the CommonJS, UMD and any extra builds.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - `build` and `check`
//! - [`error`] - error types and miette conversion
//! - [`logger`] - tracing setup
//! - [`ui`] - progress, tables and status lines

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, Result, ResultExt};
