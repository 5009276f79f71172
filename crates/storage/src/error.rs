//! Storage-related errors

use gridhunt_core::GridError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed player record on line {line}: {message}")]
    Malformed { line: usize, message: String },
}

impl From<StorageError> for GridError {
    fn from(err: StorageError) -> Self {
        GridError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
