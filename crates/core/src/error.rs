// Central Error Type for the Launcher

use std::path::PathBuf;
use thiserror::Error;

/// Launcher error type
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Invalid process pattern: {0}")]
    InvalidPattern(String),

    #[error("Scratch directory error at {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write startup script {path}: {source}")]
    Materialize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to hand off to {program}: {source}")]
    Handoff {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Signal delivery to pid {pid} failed: {message}")]
    Signal { pid: u32, message: String },

    #[error("Process probe failed: {0}")]
    Probe(String),
}

/// Result type alias using LaunchError
pub type Result<T> = std::result::Result<T, LaunchError>;
