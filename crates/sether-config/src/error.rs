//! Error types for configuration loading and target derivation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Path resolution errors
    #[error("project root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    // Config parsing/loading errors
    #[error("invalid configuration: {0}")]
    Invalid(Box<figment::Error>),

    #[error("invalid package manifest {}: {message}", .path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("invalid env file {}: {message}", .path.display())]
    InvalidEnvFile { path: PathBuf, message: String },

    #[error("project name is not set (use --name, the `name` config field, or package.json)")]
    MissingName,

    // Override shape errors
    #[error("invalid override `{section}.{key}`: expected an object")]
    InvalidOverride { section: String, key: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Invalid(Box::new(err))
    }
}
