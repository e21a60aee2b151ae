use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::entities;
use crate::ports::FileStore;

/// Local-disk store for uploaded documents.
#[derive(Debug, Clone)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create uploads dir {}", root.display()))?;
        Ok(Self { root })
    }
}

#[async_trait]
impl FileStore for DiskFileStore {
    async fn save(&self, src: &Path, key: &entities::FileKey) -> anyhow::Result<String> {
        let dest = self.root.join(key.as_str());
        // Copy rather than rename: the source is a temp file that may sit on
        // another filesystem.
        tokio::fs::copy(src, &dest)
            .await
            .with_context(|| format!("store upload at {}", dest.display()))?;
        Ok(dest.to_string_lossy().into_owned())
    }

    async fn remove(&self, path: &str) -> anyhow::Result<()> {
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("remove stored file {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FileStore;

    fn pdf_key() -> entities::FileKey {
        let mime = entities::MimeType::try_from("application/pdf".to_string()).unwrap();
        entities::FileKey::generate(chrono::Utc::now(), &mime)
    }

    #[tokio::test]
    async fn saves_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskFileStore::new(dir.path().join("uploads")).unwrap();

        let src = dir.path().join("incoming.pdf");
        tokio::fs::write(&src, b"%PDF-1.4").await.unwrap();

        let stored = store.save(&src, &pdf_key()).await.unwrap();
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), b"%PDF-1.4");

        store.remove(&stored).await.unwrap();
        assert!(tokio::fs::metadata(&stored).await.is_err());
    }

    #[tokio::test]
    async fn remove_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskFileStore::new(dir.path().join("uploads")).unwrap();
        assert!(store.remove("/nonexistent/file.pdf").await.is_err());
    }
}
