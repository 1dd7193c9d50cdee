//! CSS selector configuration for storefront listing pages.
//!
//! Every selector the extractors touch is data, not code, so a different
//! storefront theme can be targeted from configuration alone.

use serde::{Deserialize, Serialize};

/// CSS selectors (plus one regex) describing a storefront's listing markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontSelectors {
    /// One visible product card in the result grid
    #[serde(default = "defaults::gallery_item")]
    pub gallery_item: String,

    /// Brand-label element inside a card, preferred source for the name
    #[serde(default = "defaults::product_brand")]
    pub product_brand: String,

    /// Product-name element inside a card, name fallback
    #[serde(default = "defaults::product_name")]
    pub product_name: String,

    /// Listing price element inside a card
    #[serde(default = "defaults::selling_price")]
    pub selling_price: String,

    /// SKU option list widget inside a card
    #[serde(default = "defaults::sku_list")]
    pub sku_list: String,

    /// One entry of the SKU option list
    #[serde(default = "defaults::sku_list_item")]
    pub sku_list_item: String,

    /// Currently selected SKU of a selector widget
    #[serde(default = "defaults::sku_selected")]
    pub sku_selected: String,

    /// The "next page" pagination control
    #[serde(default = "defaults::next_page")]
    pub next_page: String,

    /// Embedded structured-data script blocks
    #[serde(default = "defaults::structured_data")]
    pub structured_data: String,

    /// Case-insensitive regex extracting a volume/quantity token from a
    /// product name, e.g. "50ml" or "caixa com 10"
    #[serde(default = "defaults::option_in_name")]
    pub option_in_name: String,
}

impl Default for StorefrontSelectors {
    fn default() -> Self {
        Self {
            gallery_item: defaults::gallery_item(),
            product_brand: defaults::product_brand(),
            product_name: defaults::product_name(),
            selling_price: defaults::selling_price(),
            sku_list: defaults::sku_list(),
            sku_list_item: defaults::sku_list_item(),
            sku_selected: defaults::sku_selected(),
            next_page: defaults::next_page(),
            structured_data: defaults::structured_data(),
            option_in_name: defaults::option_in_name(),
        }
    }
}

mod defaults {
    // VTEX storefront theme classes used by electricink.com.br
    pub fn gallery_item() -> String {
        ".electricink-search-result-3-x-galleryItem".into()
    }
    pub fn product_brand() -> String {
        ".electricink-product-summary-2-x-productBrand".into()
    }
    pub fn product_name() -> String {
        ".electricink-product-summary-2-x-productName".into()
    }
    pub fn selling_price() -> String {
        ".electricink-product-price-1-x-sellingPriceValue".into()
    }
    pub fn sku_list() -> String {
        ".electricink-sku-selector-0-x-fakeList".into()
    }
    pub fn sku_list_item() -> String {
        ".electricink-sku-selector-0-x-fakeInnerItem".into()
    }
    pub fn sku_selected() -> String {
        ".electricink-sku-selector-0-x-fakeSelected".into()
    }
    pub fn next_page() -> String {
        ".electricink-search-result-3-x-nextPage".into()
    }
    pub fn structured_data() -> String {
        r#"script[type="application/ld+json"]"#.into()
    }
    pub fn option_in_name() -> String {
        r"(\d+\s?ml|\d+\s?un\.|caixa\s+com\s+\d+|pote\s+com\s+\d+|\d+\s?g\b)".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_parseable_selectors() {
        let selectors = StorefrontSelectors::default();
        for sel in [
            &selectors.gallery_item,
            &selectors.product_brand,
            &selectors.product_name,
            &selectors.selling_price,
            &selectors.sku_list,
            &selectors.sku_list_item,
            &selectors.sku_selected,
            &selectors.next_page,
            &selectors.structured_data,
        ] {
            assert!(scraper::Selector::parse(sel).is_ok(), "bad selector: {sel}");
        }
    }

    #[test]
    fn test_default_name_pattern_compiles() {
        let selectors = StorefrontSelectors::default();
        assert!(
            regex::RegexBuilder::new(&selectors.option_in_name)
                .case_insensitive(true)
                .build()
                .is_ok()
        );
    }
}
