//! Storage abstractions for catalog persistence.
//!
//! The crawl output is one JSON array per target plus a stats file; the
//! merge and structure stages read those arrays back and write their own
//! documents next to them.
//!
//! ```text
//! {root}/
//! ├── lista_tatuagem.json          # per-target catalogs
//! ├── lista_cosmeticos.json
//! ├── lista_final_mesclada.json    # merge stage output
//! ├── structured_by_type/          # structure stage output
//! │   └── tintas.json
//! └── stats.json                   # crawl run statistics
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CrawlStats, MergedProduct, ProductRecord};

// Re-export for convenience
pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Where the document landed
    pub location: String,
    /// Number of entries written
    pub count: usize,
}

/// Trait for catalog storage backends.
#[async_trait]
pub trait CatalogStorage: Send + Sync {
    /// Write one target's catalog as a JSON array.
    async fn write_catalog(
        &self,
        file_name: &str,
        records: &[ProductRecord],
    ) -> Result<WriteSummary>;

    /// Load a previously written catalog, `None` if it does not exist.
    async fn read_catalog(&self, file_name: &str) -> Result<Option<Vec<ProductRecord>>>;

    /// Write the merged catalog.
    async fn write_merged(
        &self,
        file_name: &str,
        products: &[MergedProduct],
    ) -> Result<WriteSummary>;

    /// Load the merged catalog, `None` if it does not exist.
    async fn read_merged(&self, file_name: &str) -> Result<Option<Vec<MergedProduct>>>;

    /// Write an arbitrary JSON document at a relative path.
    async fn write_document(&self, rel_path: &str, value: &serde_json::Value) -> Result<()>;

    /// Write crawl run statistics.
    async fn write_stats(&self, stats: &CrawlStats) -> Result<()>;
}
