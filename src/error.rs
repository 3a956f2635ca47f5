//! Error types for linking-number evaluation.

use thiserror::Error;

/// Failures of the linking-number engine for a single chain pair.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine program could not be started.
    #[error("Failed to launch linking engine '{program}': {source}")]
    Spawn {
        /// Program that was launched
        program: String,
        /// Underlying OS error
        source: std::io::Error,
    },

    /// Talking to the engine over its pipes failed.
    #[error("I/O error while talking to the linking engine: {0}")]
    Io(#[from] std::io::Error),

    /// The engine exited unsuccessfully.
    #[error("Linking engine exited with {status}: {stderr}")]
    Status {
        /// Exit status as reported by the OS
        status: String,
        /// Captured standard error of the engine
        stderr: String,
    },

    /// The engine output was not a valid response.
    #[error("Could not decode linking engine output: {0}")]
    Decode(#[from] serde_json::Error),

    /// The engine answered, but the matrix does not fit the curves it was given.
    #[error("Malformed linking matrix: {0}")]
    Malformed(String),
}

/// Failures that stop a whole structure from being analyzed.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The structure file could not be read.
    #[error("Failed to read structure {path}: {messages}")]
    Structure {
        /// Path that was read
        path: String,
        /// Parser messages joined by `; `
        messages: String,
    },

    /// The structure has no models.
    #[error("Structure contains no models")]
    EmptyStructure,

    /// Writing results failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building or writing a results table failed.
    #[error("Failed to write results table: {0}")]
    Table(#[from] polars::prelude::PolarsError),
}
