//! Error types shared across vPTZ crates.

use std::path::PathBuf;

/// Top-level error type for vPTZ operations.
///
/// The controller itself never fails once constructed; these variants cover
/// construction-time validation and the stream/CLI layers around it.
#[derive(Debug, thiserror::Error)]
pub enum VptzError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid frame geometry: {message}")]
    Geometry { message: String },

    #[error("Detection stream error: {message}")]
    Detection { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using VptzError.
pub type VptzResult<T> = Result<T, VptzError>;

impl VptzError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }
}
