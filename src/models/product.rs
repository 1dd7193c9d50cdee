//! Product record data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized catalog product.
///
/// This is the unit of catalog output. The serialized field names are fixed:
/// downstream consumers read `{name, availableOptions, availablePrice,
/// materialType}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Product name, the merge identity within a page
    pub name: String,

    /// Size/quantity/SKU labels, unique, sorted lexicographically on output
    #[serde(default)]
    pub available_options: Vec<String>,

    /// Currency-formatted price strings, sorted ascending by numeric value
    #[serde(default)]
    pub available_price: Vec<String>,

    /// Category label assigned by the classifier
    pub material_type: String,
}

impl ProductRecord {
    /// Create a record with no options or prices yet.
    pub fn new(name: impl Into<String>, material_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available_options: Vec::new(),
            available_price: Vec::new(),
            material_type: material_type.into(),
        }
    }

    /// Add an option label if not already present. Returns whether it was added.
    pub fn add_option(&mut self, option: &str) -> bool {
        if self.available_options.iter().any(|o| o == option) {
            return false;
        }
        self.available_options.push(option.to_string());
        true
    }

    /// Add a price string if not already present. Returns whether it was added.
    pub fn add_price(&mut self, price: &str) -> bool {
        if self.available_price.iter().any(|p| p == price) {
            return false;
        }
        self.available_price.push(price.to_string());
        true
    }

    /// Sort options into their final lexicographic order.
    pub fn sort_options(&mut self) {
        self.available_options.sort();
    }
}

/// A merged catalog product with an inferred brand.
///
/// Output of the merge stage, which combines several per-target catalogs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MergedProduct {
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub available_options: Vec<String>,
    #[serde(default)]
    pub available_price: Vec<String>,
    pub material_type: String,
}

/// Statistics for one crawled target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetStats {
    /// Target name (e.g. "tatuagem")
    pub target: String,

    /// Listing pages visited before the run ended
    pub pages_visited: usize,

    /// Records accumulated across all pages, before deduplication
    pub raw_count: usize,

    /// Records remaining after deduplication
    pub unique_count: usize,
}

/// Statistics for a whole crawl run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub targets: Vec<TargetStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_option_is_unique() {
        let mut record = ProductRecord::new("Tinta Preta", "Tintas");
        assert!(record.add_option("30ml"));
        assert!(!record.add_option("30ml"));
        assert!(record.add_option("60ml"));
        assert_eq!(record.available_options, vec!["30ml", "60ml"]);
    }

    #[test]
    fn test_add_price_is_unique() {
        let mut record = ProductRecord::new("Tinta Preta", "Tintas");
        assert!(record.add_price("R$ 29,90"));
        assert!(!record.add_price("R$ 29,90"));
        assert_eq!(record.available_price.len(), 1);
    }

    #[test]
    fn test_sort_options() {
        let mut record = ProductRecord::new("Batoque", "Batoques");
        record.add_option("caixa com 10");
        record.add_option("15mm");
        record.sort_options();
        assert_eq!(record.available_options, vec!["15mm", "caixa com 10"]);
    }

    #[test]
    fn test_wire_field_names() {
        let record = ProductRecord::new("Luva Nitrílica", "Luvas");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("availableOptions").is_some());
        assert!(json.get("availablePrice").is_some());
        assert!(json.get("materialType").is_some());
        assert!(json.get("available_options").is_none());
    }
}
