//! Catalog structuring stage.
//!
//! Transforms a merged catalog into one document per material category,
//! each product annotated with its numeric price range. The output feeds
//! consumers that browse the catalog by category instead of scanning one
//! flat list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{MergedProduct, PriceFormat};
use crate::utils::price;

/// A product annotated for the per-category documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredProduct {
    pub name: String,
    pub brand: String,
    pub available_options_raw: Vec<String>,
    pub all_available_prices: Vec<String>,
    pub lowest_price: Option<String>,
    pub highest_price: Option<String>,
    pub material_type: String,
}

/// One per-category output document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub material_type: String,
    pub total_products: usize,
    pub products: Vec<StructuredProduct>,
}

impl CategoryGroup {
    /// File name for this group, e.g. "agulhas_e_cartuchos.json".
    pub fn file_name(&self) -> String {
        format!("{}.json", category_slug(&self.material_type))
    }
}

/// Groups merged products by category with price summaries.
pub struct CatalogStructurer {
    prices: PriceFormat,
}

impl CatalogStructurer {
    pub fn new(prices: PriceFormat) -> Self {
        Self { prices }
    }

    /// Group products by material category, in category order.
    pub fn structure(&self, products: &[MergedProduct]) -> Vec<CategoryGroup> {
        let mut groups: BTreeMap<String, Vec<StructuredProduct>> = BTreeMap::new();

        for product in products {
            groups
                .entry(product.material_type.clone())
                .or_default()
                .push(self.summarize(product));
        }

        groups
            .into_iter()
            .map(|(material_type, products)| CategoryGroup {
                material_type,
                total_products: products.len(),
                products,
            })
            .collect()
    }

    /// Annotate one product with its normalized prices and price range.
    ///
    /// Prices that do not parse numerically are left out of the summary;
    /// the raw option list is carried as-is.
    fn summarize(&self, product: &MergedProduct) -> StructuredProduct {
        let mut amounts: Vec<f64> = product
            .available_price
            .iter()
            .filter_map(|p| price::parse_amount(&self.prices, p))
            .collect();
        amounts.sort_by(f64::total_cmp);

        let all_available_prices: Vec<String> = amounts
            .iter()
            .map(|amount| price::format_amount(&self.prices, *amount))
            .collect();

        StructuredProduct {
            name: product.name.clone(),
            brand: product.brand.clone(),
            available_options_raw: product.available_options.clone(),
            lowest_price: all_available_prices.first().cloned(),
            highest_price: all_available_prices.last().cloned(),
            all_available_prices,
            material_type: product.material_type.clone(),
        }
    }
}

/// ASCII slug for a category label: lower-cased, diacritics folded,
/// non-alphanumeric runs collapsed to single underscores.
pub fn category_slug(category: &str) -> String {
    let mut slug = String::with_capacity(category.len());
    let mut last_was_separator = true;

    for c in category.to_lowercase().chars() {
        let folded = match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        };

        if folded.is_ascii_alphanumeric() {
            slug.push(folded);
            last_was_separator = false;
        } else if !last_was_separator {
            slug.push('_');
            last_was_separator = true;
        }
    }

    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, category: &str, prices: &[&str]) -> MergedProduct {
        MergedProduct {
            name: name.to_string(),
            brand: "Electric Ink".to_string(),
            available_options: vec!["30ml".to_string()],
            available_price: prices.iter().map(|s| s.to_string()).collect(),
            material_type: category.to_string(),
        }
    }

    fn structurer() -> CatalogStructurer {
        CatalogStructurer::new(PriceFormat::default())
    }

    #[test]
    fn test_groups_by_category() {
        let products = vec![
            product("Tinta Preta", "Tintas", &["R$ 89,90"]),
            product("Tinta Branca", "Tintas", &["R$ 79,90"]),
            product("Batoque 15mm", "Batoques", &["R$ 9,90"]),
        ];

        let groups = structurer().structure(&products);
        assert_eq!(groups.len(), 2);

        let tintas = groups
            .iter()
            .find(|g| g.material_type == "Tintas")
            .unwrap();
        assert_eq!(tintas.total_products, 2);
    }

    #[test]
    fn test_price_range_summary() {
        let products = vec![product(
            "Tinta Preta",
            "Tintas",
            &["R$ 89,90", "R$ 49,90", "R$ 159,90"],
        )];

        let groups = structurer().structure(&products);
        let entry = &groups[0].products[0];
        assert_eq!(entry.lowest_price.as_deref(), Some("R$ 49,90"));
        assert_eq!(entry.highest_price.as_deref(), Some("R$ 159,90"));
        assert_eq!(
            entry.all_available_prices,
            vec!["R$ 49,90", "R$ 89,90", "R$ 159,90"]
        );
    }

    #[test]
    fn test_unparseable_prices_left_out_of_summary() {
        let products = vec![product("Produto", "Outros", &["sob consulta"])];
        let groups = structurer().structure(&products);
        let entry = &groups[0].products[0];
        assert!(entry.lowest_price.is_none());
        assert!(entry.all_available_prices.is_empty());
    }

    #[test]
    fn test_category_slug_folds_diacritics() {
        assert_eq!(category_slug("Agulhas e Cartuchos"), "agulhas_e_cartuchos");
        assert_eq!(
            category_slug("Biossegurança e Higiene"),
            "biosseguranca_e_higiene"
        );
        assert_eq!(
            category_slug("Cremes e Pós-Tatuagem"),
            "cremes_e_pos_tatuagem"
        );
        assert_eq!(category_slug("Máquinas"), "maquinas");
    }

    #[test]
    fn test_group_file_name() {
        let groups = structurer().structure(&[product("P", "Proteção Solar", &[])]);
        assert_eq!(groups[0].file_name(), "protecao_solar.json");
    }
}
