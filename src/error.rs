//! Error types for the lighting core

use std::path::PathBuf;

use thiserror::Error;

/// Lighting errors
#[derive(Debug, Error)]
pub enum LightError {
    /// Ray count below what the mesh topology needs
    #[error("light needs at least {min} rays, got {requested}")]
    TooFewRays { requested: usize, min: usize },

    /// Config file could not be read
    #[error("failed to read lighting config {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for `LightingConfig`
    #[error("invalid lighting config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Shader compile or link failure
    #[error("{0}")]
    Shader(String),
}

/// Result type for lighting operations
pub type Result<T> = std::result::Result<T, LightError>;
