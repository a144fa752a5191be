//! Error types for command execution

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for shell operations
pub type Result<T> = std::result::Result<T, ShellError>;

/// Errors the orchestrating process can observe while running one line.
///
/// Failures that happen inside a forked child never show up here: the child
/// reports them on its own standard error and exits non-zero.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to create a pipe: {0}")]
    Channel(String),

    #[error("Failed to open '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create a new process: {0}")]
    Spawn(String),

    #[error("Failed to collect process {pid}: {reason}")]
    Collect { pid: i32, reason: String },

    #[error("Failed to change signal handling: {0}")]
    Signal(String),

    #[error("Invalid command line: {0}")]
    InvalidLine(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ShellError {
    /// Build an [`ShellError::Open`] from a path and the underlying errno.
    pub fn open(path: impl Into<PathBuf>, errno: impl Into<io::Error>) -> Self {
        ShellError::Open {
            path: path.into(),
            source: errno.into(),
        }
    }
}
