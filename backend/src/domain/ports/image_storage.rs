//! Driven port for the files backing listing images.

use async_trait::async_trait;

use crate::domain::ImagePath;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image storage adapters.
    pub enum ImageStorageError {
        /// The storage root could not be opened.
        Unavailable { message: String } => "image storage unavailable: {message}",
        /// A file could not be removed.
        Delete { path: String, message: String } => "failed to delete {path}: {message}",
    }
}

/// File store for uploaded images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Remove every file in `paths`. Missing files are not an error.
    async fn delete_files(&self, paths: &[ImagePath]) -> Result<(), ImageStorageError>;
}

/// Storage that keeps no files; deletions always succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopImageStorage;

#[async_trait]
impl ImageStorage for NoopImageStorage {
    async fn delete_files(&self, paths: &[ImagePath]) -> Result<(), ImageStorageError> {
        tracing::debug!(count = paths.len(), "skipping image file deletion");
        Ok(())
    }
}
