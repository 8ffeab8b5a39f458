//! Directory-confined file storage.
//!
//! Every call resolves the requested name against the root again: `..`
//! segments are folded, the deepest existing ancestor is canonicalized to
//! follow symlinks, and the result must still sit under the root.

use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use crate::storage::{Storage, StorageError};

/// Largest file the store will read or write (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    max_file_size: u64,
}

impl FileStore {
    /// Opens a store rooted at `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::with_max_file_size(root, MAX_FILE_SIZE)
    }

    pub fn with_max_file_size(root: impl AsRef<Path>, max_file_size: u64) -> anyhow::Result<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .with_context(|| format!("Storage root does not exist: {}", root.display()))?;

        if !root.is_dir() {
            anyhow::bail!("Storage root is not a directory: {}", root.display());
        }

        Ok(Self {
            root,
            max_file_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps `name` to an absolute path that is guaranteed to stay under the
    /// root, or fails with a security violation.
    async fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if name.contains('\0') {
            return Err(StorageError::violation("null byte in file name"));
        }

        let mut lexical = self.root.clone();
        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => lexical.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    lexical.pop();
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(StorageError::violation(format!("absolute path: {name}")));
                }
            }
        }

        if lexical == self.root || !lexical.starts_with(&self.root) {
            return Err(StorageError::violation(format!("path escapes root: {name}")));
        }

        // Symlinks can still point outside, so check the real location of
        // whatever part of the path already exists.
        let mut existing = lexical.as_path();
        let canonical = loop {
            match tokio::fs::canonicalize(existing).await {
                Ok(path) => break path,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    existing = existing
                        .parent()
                        .ok_or_else(|| StorageError::violation("no existing ancestor"))?;
                }
                Err(e) => return Err(StorageError::from_io(e)),
            }
        };

        if !canonical.starts_with(&self.root) {
            return Err(StorageError::violation(format!("path escapes root: {name}")));
        }

        let rest = lexical
            .strip_prefix(existing)
            .map_err(|_| StorageError::violation("unresolvable path"))?;

        // Joining an empty remainder would append a trailing separator.
        if rest.as_os_str().is_empty() {
            Ok(canonical)
        } else {
            Ok(canonical.join(rest))
        }
    }
}

#[async_trait]
impl Storage for FileStore {
    async fn read(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name).await?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(StorageError::from_io)?;

        if !metadata.is_file() {
            return Err(StorageError::violation(format!("not a regular file: {name}")));
        }
        if metadata.len() > self.max_file_size {
            return Err(StorageError::violation(format!(
                "file too large: {} bytes (max {})",
                metadata.len(),
                self.max_file_size
            )));
        }

        tracing::debug!(path = %path.display(), "Reading file");
        tokio::fs::read(&path).await.map_err(StorageError::from_io)
    }

    async fn write(&self, name: &str, content: &[u8]) -> Result<(), StorageError> {
        if content.len() as u64 > self.max_file_size {
            return Err(StorageError::violation(format!(
                "content too large: {} bytes (max {})",
                content.len(),
                self.max_file_size
            )));
        }

        let path = self.resolve(name).await?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::from_io)?;
        }

        tracing::debug!(path = %path.display(), bytes = content.len(), "Writing file");
        tokio::fs::write(&path, content)
            .await
            .map_err(StorageError::from_io)
    }
}
