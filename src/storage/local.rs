//! Local filesystem storage implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{CrawlStats, MergedProduct, ProductRecord};
use crate::storage::{CatalogStorage, WriteSummary};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CatalogStorage for LocalStorage {
    async fn write_catalog(
        &self,
        file_name: &str,
        records: &[ProductRecord],
    ) -> Result<WriteSummary> {
        self.write_json(file_name, records).await?;
        Ok(WriteSummary {
            location: self.path(file_name).display().to_string(),
            count: records.len(),
        })
    }

    async fn read_catalog(&self, file_name: &str) -> Result<Option<Vec<ProductRecord>>> {
        self.read_json(file_name).await
    }

    async fn write_merged(
        &self,
        file_name: &str,
        products: &[MergedProduct],
    ) -> Result<WriteSummary> {
        self.write_json(file_name, products).await?;
        Ok(WriteSummary {
            location: self.path(file_name).display().to_string(),
            count: products.len(),
        })
    }

    async fn read_merged(&self, file_name: &str) -> Result<Option<Vec<MergedProduct>>> {
        self.read_json(file_name).await
    }

    async fn write_document(&self, rel_path: &str, value: &serde_json::Value) -> Result<()> {
        self.write_json(rel_path, value).await
    }

    async fn write_stats(&self, stats: &CrawlStats) -> Result<()> {
        self.write_json("stats.json", stats).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> ProductRecord {
        let mut record = ProductRecord::new("Tinta Preta", "Tintas");
        record.add_option("30ml");
        record.add_price("R$ 89,90");
        record
    }

    #[tokio::test]
    async fn test_write_and_read_catalog() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let summary = storage
            .write_catalog("lista_tatuagem.json", &[sample_record()])
            .await
            .unwrap();
        assert_eq!(summary.count, 1);

        let loaded = storage
            .read_catalog("lista_tatuagem.json")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, vec![sample_record()]);
    }

    #[tokio::test]
    async fn test_read_missing_catalog() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        assert!(storage.read_catalog("nope.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_catalog_serializes_wire_shape() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .write_catalog("catalog.json", &[sample_record()])
            .await
            .unwrap();

        let raw = tokio::fs::read_to_string(storage.path("catalog.json"))
            .await
            .unwrap();
        assert!(raw.contains("\"availableOptions\""));
        assert!(raw.contains("\"availablePrice\""));
        assert!(raw.contains("\"materialType\""));
    }

    #[tokio::test]
    async fn test_write_document_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .write_document(
                "structured_by_type/tintas.json",
                &serde_json::json!({"total_products": 0}),
            )
            .await
            .unwrap();

        assert!(storage.path("structured_by_type/tintas.json").exists());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .write_catalog("catalog.json", &[sample_record()])
            .await
            .unwrap();
        assert!(!storage.path("catalog.tmp").exists());
    }
}
