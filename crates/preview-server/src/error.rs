//! Error types for the preview server.

use std::io;
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::live_reload::WatchError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// README file is missing.
    #[error("readme not found at {}", .0.display())]
    ReadmeNotFound(PathBuf),

    /// Failed to bind the listening socket.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Selected theme failed to load.
    #[error("Theme error: {0}")]
    Theme(#[from] preview_theme::ThemeError),

    /// File watcher failed to start.
    #[error("Live reload error: {0}")]
    Watch(#[from] WatchError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::ReadmeNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Readme not found", "path": path.display().to_string()}),
            ),
            Self::Bind { .. } | Self::Theme(_) | Self::Watch(_) | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
