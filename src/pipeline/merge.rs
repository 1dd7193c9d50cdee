//! Catalog merge stage.
//!
//! Combines several per-target catalogs into one list keyed by product
//! name. The first catalog primes the result, later catalogs fill fields
//! the earlier ones left empty and contribute products the earlier ones
//! never saw. A priority-ordered brand-rule table assigns each product a
//! brand from tokens in its name.

use std::collections::HashMap;

use crate::models::{MergeConfig, MergedProduct, ProductRecord};

/// Merges per-target catalogs into a single branded list.
#[derive(Debug, Clone, Default)]
pub struct CatalogMerger {
    config: MergeConfig,
}

impl CatalogMerger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    /// Merge catalogs in the given order.
    ///
    /// For a name already present, later catalogs only fill empty options
    /// and empty prices, but their category label wins: a later catalog is
    /// assumed to have classified its own domain more precisely. The
    /// result is sorted by name.
    pub fn merge(&self, catalogs: &[Vec<ProductRecord>]) -> Vec<MergedProduct> {
        let mut by_name: HashMap<String, MergedProduct> = HashMap::new();

        for catalog in catalogs {
            for record in catalog {
                let name = record.name.trim().to_string();

                match by_name.get_mut(&name) {
                    Some(existing) => {
                        if existing.available_options.is_empty()
                            && !record.available_options.is_empty()
                        {
                            existing.available_options = record.available_options.clone();
                        }
                        if existing.available_price.is_empty()
                            && !record.available_price.is_empty()
                        {
                            existing.available_price = record.available_price.clone();
                        }
                        existing.material_type = record.material_type.clone();
                    }
                    None => {
                        let (brand, category_override) = self.infer_brand(&name);
                        by_name.insert(
                            name.clone(),
                            MergedProduct {
                                name,
                                brand,
                                available_options: record.available_options.clone(),
                                available_price: record.available_price.clone(),
                                material_type: category_override
                                    .unwrap_or_else(|| record.material_type.clone()),
                            },
                        );
                    }
                }
            }
        }

        let mut merged: Vec<MergedProduct> = by_name.into_values().collect();
        merged.sort_by(|a, b| a.name.cmp(&b.name));

        log::info!(
            "merged {} catalogs into {} unique products",
            catalogs.len(),
            merged.len()
        );
        merged
    }

    /// First matching brand rule wins; otherwise the default brand.
    fn infer_brand(&self, name: &str) -> (String, Option<String>) {
        for rule in &self.config.brand_rules {
            if name.contains(&rule.name_contains) {
                return (rule.brand.clone(), rule.material_type.clone());
            }
        }
        (self.config.default_brand.clone(), None)
    }
}
