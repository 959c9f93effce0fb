//! Error types for the CLI

use std::path::PathBuf;

use convconf::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("LM has {} error(s)", .0.len())]
    InvalidLm(Vec<String>),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl CliError {
    /// Process exit code: 2 for invalid input models, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidLm(_) | CliError::Service(ServiceError::SemanticErrors(_)) => 2,
            _ => 1,
        }
    }
}
