//! Error types for the levels crate

use gridhunt_core::GridError;

/// Map loading and query errors
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    /// Layout file could not be read
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),

    /// Layout text is malformed
    #[error("Invalid map format: {0}")]
    InvalidFormat(String),

    /// Parse error on a specific row
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Every cell is blocked or holds an item
    #[error("No free cell available for spawning")]
    NoFreeCell,
}

impl From<LevelError> for GridError {
    fn from(err: LevelError) -> Self {
        match err {
            LevelError::FileError(e) => GridError::Io(e),
            other => GridError::InvalidData(other.to_string()),
        }
    }
}

/// Result type for level operations
pub type Result<T> = std::result::Result<T, LevelError>;
