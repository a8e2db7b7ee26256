//! Local-disk storage for poster images

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};
use tracing::info;

/// Errors raised by the file store
#[derive(Error, Debug)]
pub enum FileStoreError {
    /// A file with this name is already stored
    #[error("File already exists! Please enter another file name: {0}")]
    AlreadyExists(String),

    /// The name is empty or tries to escape the store directory
    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    /// No file with this name is stored
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FileStoreResult<T> = Result<T, FileStoreError>;

/// Taken by the `/file/upload` route, so a file under it could never be served
const RESERVED_NAME: &str = "upload";

/// Flat directory of uploaded files, addressed by file name
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the storage directory if it does not exist yet
    pub async fn init(&self) -> FileStoreResult<()> {
        fs::create_dir_all(&self.root).await?;
        info!("Poster store ready at {}", self.root().display());
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reduce a client-supplied name to a bare file name
    pub fn sanitize(name: &str) -> FileStoreResult<String> {
        let base = Path::new(name.trim())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");

        if base.is_empty()
            || base == "."
            || base == ".."
            || base == RESERVED_NAME
            || base.contains(['/', '\\'])
        {
            return Err(FileStoreError::InvalidName(name.to_string()));
        }
        Ok(base.to_string())
    }

    fn path_of(&self, name: &str) -> FileStoreResult<PathBuf> {
        Ok(self.root.join(Self::sanitize(name)?))
    }

    pub async fn exists(&self, name: &str) -> FileStoreResult<bool> {
        Ok(fs::try_exists(self.path_of(name)?).await?)
    }

    /// Store `bytes` under `name` and return the stored name.
    ///
    /// Never overwrites: an existing file yields [`FileStoreError::AlreadyExists`].
    pub async fn upload(&self, name: &str, bytes: &[u8]) -> FileStoreResult<String> {
        let file_name = Self::sanitize(name)?;
        let path = self.root.join(&file_name);

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(FileStoreError::AlreadyExists(file_name));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(bytes).await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(e.into());
        }
        file.flush().await?;

        info!("Stored file {} ({} bytes)", file_name, bytes.len());
        Ok(file_name)
    }

    /// Delete a stored file; a missing file is an error
    pub async fn delete(&self, name: &str) -> FileStoreResult<()> {
        match fs::remove_file(self.path_of(name)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a stored file, returning whether it was present
    pub async fn delete_if_exists(&self, name: &str) -> FileStoreResult<bool> {
        match self.delete(name).await {
            Ok(()) => Ok(true),
            Err(FileStoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn read(&self, name: &str) -> FileStoreResult<Vec<u8>> {
        match fs::read(self.path_of(name)?).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Content type for a stored poster, guessed from its extension
pub fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn upload_then_read_back() {
        let (_dir, store) = store();

        let name = store.upload("poster.png", b"png-bytes").await.unwrap();
        assert_eq!(name, "poster.png");
        assert!(store.exists("poster.png").await.unwrap());
        assert_eq!(store.read("poster.png").await.unwrap(), b"png-bytes");
    }

    #[tokio::test]
    async fn upload_refuses_to_overwrite() {
        let (_dir, store) = store();
        store.upload("poster.png", b"first").await.unwrap();

        let err = store.upload("poster.png", b"second").await.unwrap_err();
        assert!(matches!(err, FileStoreError::AlreadyExists(ref n) if n == "poster.png"));
        assert_eq!(store.read("poster.png").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn upload_strips_directories_from_the_name() {
        let (dir, store) = store();

        let name = store.upload("../../etc/poster.png", b"x").await.unwrap();
        assert_eq!(name, "poster.png");
        assert!(dir.path().join("poster.png").exists());
    }

    #[tokio::test]
    async fn delete_is_strict_and_delete_if_exists_is_not() {
        let (_dir, store) = store();
        store.upload("a.jpg", b"x").await.unwrap();

        store.delete("a.jpg").await.unwrap();
        assert!(!store.exists("a.jpg").await.unwrap());
        assert!(matches!(
            store.delete("a.jpg").await,
            Err(FileStoreError::NotFound(_))
        ));
        assert!(!store.delete_if_exists("a.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn init_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("posters"));

        store.init().await.unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn sanitize_rejects_empty_and_dot_names() {
        assert!(FileStore::sanitize("").is_err());
        assert!(FileStore::sanitize("   ").is_err());
        assert!(FileStore::sanitize("..").is_err());
        assert_eq!(FileStore::sanitize("dir/x.png").unwrap(), "x.png");
    }

    #[tokio::test]
    async fn name_of_the_upload_route_is_refused() {
        let (_dir, store) = store();

        assert!(matches!(
            store.upload("upload", b"x").await,
            Err(FileStoreError::InvalidName(_))
        ));
        assert!(matches!(
            FileStore::sanitize("posters/upload"),
            Err(FileStoreError::InvalidName(_))
        ));
        assert_eq!(FileStore::sanitize("upload.png").unwrap(), "upload.png");
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for("a.PNG"), "image/png");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }
}
