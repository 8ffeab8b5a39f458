//! Byte-level file storage used by the `/files` route.
//!
//! Handlers talk to a [`Storage`] trait object so the confinement policy lives
//! in one place. [`FileStore`] is the on-disk implementation.

pub mod file_store;

use std::io;

use async_trait::async_trait;
use thiserror::Error;

pub use file_store::{FileStore, MAX_FILE_SIZE};

/// Outcome of a failed storage operation.
///
/// The variant decides the HTTP status; the carried detail is for server logs
/// only and never reaches the client.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file not found")]
    NotFound,
    #[error("storage policy violation: {0}")]
    SecurityViolation(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    pub(crate) fn violation(reason: impl Into<String>) -> Self {
        StorageError::SecurityViolation(reason.into())
    }

    /// Sorts a raw I/O failure into the variant callers match on.
    pub(crate) fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound,
            io::ErrorKind::PermissionDenied => StorageError::violation("permission denied"),
            _ => StorageError::Io(err),
        }
    }
}

/// Read and write whole files by name, relative to a confined root.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError>;

    async fn write(&self, name: &str, content: &[u8]) -> Result<(), StorageError>;
}
