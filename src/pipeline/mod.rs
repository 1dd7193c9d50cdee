//! Pipeline entry points for crawler operations.
//!
//! - `run_crawler`: Crawl configured listing targets into catalogs
//! - `CatalogMerger`: Merge per-target catalogs into one branded list
//! - `CatalogStructurer`: Split a merged catalog into per-category documents

pub mod crawl;
pub mod dedupe;
pub mod merge;
pub mod paginate;
pub mod structure;

pub use crawl::{TargetOutcome, run_crawler, run_target};
pub use dedupe::{Deduplicator, dedupe_catalog};
pub use merge::CatalogMerger;
pub use paginate::{PaginationController, PaginationRun};
pub use structure::{CatalogStructurer, CategoryGroup, StructuredProduct, category_slug};
