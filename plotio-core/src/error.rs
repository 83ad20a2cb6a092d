//! Error types for plotio

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for plotio operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot find file: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Video error: {0}")]
    Video(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Shorthand for a parse error at a 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for plotio operations
pub type Result<T> = std::result::Result<T, Error>;
