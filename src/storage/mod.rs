//! Blob storage for product image bytes.

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub type DynFileStorage = Arc<dyn FileStorage + Send + Sync>;

/// Public URL prefix the stored files are served under.
pub const USER_CONTENT_PREFIX: &str = "/user-content";

#[async_trait]
pub trait FileStorage {
    async fn save_file(&self, bytes: &[u8], file_name: &str) -> io::Result<()>;
    async fn delete_file(&self, file_name: &str) -> io::Result<()>;
    fn file_url(&self, file_name: &str) -> String { format!("{USER_CONTENT_PREFIX}/{file_name}") }
}

/// Stores files flat under a root directory.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub async fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path { &self.root }

    fn resolve(&self, file_name: &str) -> io::Result<PathBuf> {
        let mut components = Path::new(file_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(file_name)),
            _ => Err(io::Error::new(io::ErrorKind::InvalidInput, format!("invalid storage key: {file_name}"))),
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save_file(&self, bytes: &[u8], file_name: &str) -> io::Result<()> {
        let path = self.resolve(file_name)?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "stored file");
        Ok(())
    }

    /// Deleting a file that is already gone is not an error.
    async fn delete_file(&self, file_name: &str) -> io::Result<()> {
        let path = self.resolve(file_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "file already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
