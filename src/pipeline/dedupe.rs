//! Final catalog deduplication.
//!
//! A product can legitimately reappear across pages, e.g. when pagination
//! overlaps after a tolerated advance timeout. This pass is coarser than
//! the per-page reconciliation: it drops exact repeats over the whole run
//! while preserving first-occurrence order.

use std::collections::HashSet;

use crate::models::ProductRecord;

/// Removes exact repeats from an accumulated catalog.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    include_prices: bool,
}

impl Deduplicator {
    /// Identity is name + options + prices.
    pub fn new() -> Self {
        Self {
            include_prices: true,
        }
    }

    /// Identity is name + options only. Useful for listings whose prices
    /// fluctuate between pages of the same run.
    pub fn names_and_options() -> Self {
        Self {
            include_prices: false,
        }
    }

    /// Produce a new catalog keeping the first occurrence of each identity.
    pub fn dedupe(&self, all: &[ProductRecord]) -> Vec<ProductRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut unique = Vec::new();

        for record in all {
            if seen.insert(self.identity(record)) {
                unique.push(record.clone());
            }
        }

        unique
    }

    /// Composite identity of a record. Options and prices are serialized so
    /// list boundaries cannot be confused with name content.
    fn identity(&self, record: &ProductRecord) -> String {
        let options = serde_json::to_string(&record.available_options).unwrap_or_default();
        if self.include_prices {
            let prices = serde_json::to_string(&record.available_price).unwrap_or_default();
            format!("{}-{}-{}", record.name, options, prices)
        } else {
            format!("{}-{}", record.name, options)
        }
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function using the full composite identity.
pub fn dedupe_catalog(all: &[ProductRecord]) -> Vec<ProductRecord> {
    Deduplicator::new().dedupe(all)
}
