//! CLI error types.

use std::path::PathBuf;

use preview_config::ConfigError;
use preview_reload::ClientError;
use preview_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("readme not found at {}", .0.display())]
    ReadmeNotFound(PathBuf),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Client(#[from] ClientError),
}
