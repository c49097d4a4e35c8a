//! Crate error type
//!
//! Import-time structural errors abort the whole import. Placement errors
//! that concern a single region are reported in the placement report
//! instead; only simulator faults and I/O problems surface here.

use thiserror::Error;

/// Result alias used across the crate
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors produced by the scene model, the importer and the planner
#[derive(Error, Debug)]
pub enum SceneError {
    /// Missing file, archive entry, room or object reference
    #[error("Not found: {0}")]
    NotFound(String),

    /// Schema violation, wrong array shape or broken relation graph
    #[error("Malformed data: {0}")]
    Malformed(String),

    /// The simulator answered with a non-"ok" status
    #[error("Simulator rejected `{command}`: {status}")]
    CollaboratorFault {
        /// Command that was issued
        command: String,
        /// Status text returned by the simulator
        status: String,
    },

    /// Array archive could not be read or written
    #[error("Archive error: {0}")]
    Archive(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl SceneError {
    /// Shorthand for a malformed-data error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Shorthand for a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}
