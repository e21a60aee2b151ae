use crate::entities;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait FileStore {
    /// Moves an uploaded payload into the store under `key`; returns the
    /// stored location recorded on the verification.
    async fn save(&self, src: &Path, key: &entities::FileKey) -> anyhow::Result<String>;

    /// Removes a stored payload. Callers treat failures as best-effort.
    async fn remove(&self, path: &str) -> anyhow::Result<()>;
}
