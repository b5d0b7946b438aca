//! Core error types for brewguide-core.
//!
//! The step compiler and the countdown engine are total and never fail.
//! Errors only surface at the edges: loading a recipe file, reading or
//! writing configuration, and driving an audio output.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for brewguide-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recipe loading errors
    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    /// Audio cue errors
    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the config directory
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-separated key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Recipe loading errors.
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Failed to read recipe from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed recipe JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Audio output errors. These never leave the cue player.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    #[error("Audio output could not be created: {0}")]
    Unavailable(String),

    #[error("Audio output could not be resumed: {0}")]
    ResumeFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Invalid tone: {0}")]
    InvalidTone(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
