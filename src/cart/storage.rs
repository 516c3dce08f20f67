//! Durable storage for the serialized cart.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Errors raised by a [`CartStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error reading or writing the blob.
    #[error("cart storage io error: {0}")]
    Io(#[from] io::Error),

    /// The cart could not be encoded or decoded.
    #[error("cart encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A single slot holding the serialized cart.
pub trait CartStorage {
    /// Read the stored blob, or `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn read(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored blob.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn write(&mut self, blob: &str) -> Result<(), StorageError>;
}

/// Stores the cart as a file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a storage backed by the file at `path`; the file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStorage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&mut self, blob: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, blob)?;

        Ok(())
    }
}

/// Keeps the cart blob in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Option<String>,
}

impl MemoryStorage {
    /// Create a storage pre-populated with `blob`.
    pub fn with_contents(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }

    /// The stored blob.
    pub fn contents(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.blob.clone())
    }

    fn write(&mut self, blob: &str) -> Result<(), StorageError> {
        self.blob = Some(blob.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn file_storage_reads_none_when_missing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path().join("cart.json"));

        assert_eq!(storage.read()?, None);

        Ok(())
    }

    #[test]
    fn file_storage_creates_parent_directories() -> TestResult {
        let dir = tempfile::tempdir()?;
        let mut storage = FileStorage::new(dir.path().join("nested").join("cart.json"));

        storage.write("[]")?;

        assert_eq!(storage.read()?.as_deref(), Some("[]"));

        Ok(())
    }

    #[test]
    fn memory_storage_replaces_blob() -> TestResult {
        let mut storage = MemoryStorage::with_contents("old");

        storage.write("new")?;

        assert_eq!(storage.contents(), Some("new"));
        assert_eq!(storage.read()?.as_deref(), Some("new"));

        Ok(())
    }
}
