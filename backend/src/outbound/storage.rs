//! Image files on local disk, confined to one root directory.
//!
//! The root is opened once through `cap-std`; every path is resolved inside
//! it, so stored paths cannot reach the rest of the filesystem.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::domain::ImagePath;
use crate::domain::ports::{ImageStorage, ImageStorageError};

/// [`ImageStorage`] rooted at a directory.
#[derive(Debug, Clone)]
pub struct CapImageStorage {
    root: Arc<Dir>,
}

impl CapImageStorage {
    /// Open `root`, creating it when missing.
    pub fn open(root: &Path) -> Result<Self, ImageStorageError> {
        let unavailable = |err: io::Error| {
            ImageStorageError::unavailable(format!("{}: {err}", root.display()))
        };
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(unavailable)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(unavailable)?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }
}

fn remove_all(root: &Dir, paths: &[String]) -> Result<(), ImageStorageError> {
    let mut first_failure = None;
    for path in paths {
        match root.remove_file(path) {
            Ok(()) => debug!(%path, "image file deleted"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                first_failure.get_or_insert_with(|| ImageStorageError::delete(path, err.to_string()));
            }
        }
    }
    first_failure.map_or(Ok(()), Err)
}

#[async_trait]
impl ImageStorage for CapImageStorage {
    async fn delete_files(&self, paths: &[ImagePath]) -> Result<(), ImageStorageError> {
        let root = Arc::clone(&self.root);
        let owned: Vec<String> = paths.iter().map(|p| p.as_str().to_owned()).collect();
        tokio::task::spawn_blocking(move || remove_all(&root, &owned))
            .await
            .map_err(|err| ImageStorageError::unavailable(err.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn path(raw: &str) -> ImagePath {
        ImagePath::new(raw).expect("valid image path")
    }

    #[rstest]
    #[tokio::test]
    async fn deletes_files_and_ignores_missing_ones() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = CapImageStorage::open(temp.path()).expect("open");
        storage.root.create_dir_all("listings").expect("mkdir");
        storage.root.write("listings/a.jpg", b"jpeg").expect("write");

        storage
            .delete_files(&[path("listings/a.jpg"), path("listings/gone.jpg")])
            .await
            .expect("delete");

        assert!(!storage.root.exists("listings/a.jpg"));
    }

    #[rstest]
    #[tokio::test]
    async fn removing_a_directory_path_reports_the_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let storage = CapImageStorage::open(temp.path()).expect("open");
        storage.root.create_dir_all("listings").expect("mkdir");

        let err = storage
            .delete_files(&[path("listings")])
            .await
            .expect_err("directory");

        assert!(matches!(err, ImageStorageError::Delete { .. }));
    }

    #[rstest]
    fn open_creates_the_root() {
        let temp = tempfile::tempdir().expect("tempdir");
        let nested = temp.path().join("uploads/images");

        CapImageStorage::open(&nested).expect("open");

        assert!(Dir::open_ambient_dir(&nested, ambient_authority()).is_ok());
    }
}
