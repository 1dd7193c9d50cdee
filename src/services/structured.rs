//! Structured-data extraction service.
//!
//! Parses the JSON-LD payloads embedded in a listing page into partial
//! product records. Individual offer prices are preferred over the
//! aggregate low/high pair: offers are real purchasable variants, the
//! aggregate is a lossy summary.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{PriceFormat, ProductRecord};
use crate::services::{MaterialClassifier, PartialRecordSet};
use crate::utils::price;

/// Extracts product records from raw structured-data payloads.
pub struct StructuredDataExtractor {
    prices: PriceFormat,
}

/// schema.org `ItemList` shape, deserialized leniently.
#[derive(Debug, Deserialize)]
struct ProductList {
    #[serde(rename = "itemListElement", default)]
    elements: Vec<ListElement>,
}

#[derive(Debug, Deserialize)]
struct ListElement {
    #[serde(default)]
    item: Option<ProductEntry>,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    #[serde(rename = "@type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    brand: Option<BrandField>,
    #[serde(default)]
    offers: Option<OfferSet>,
}

impl ProductEntry {
    fn brand_name(&self) -> &str {
        match &self.brand {
            Some(BrandField::Named { name }) => name,
            Some(BrandField::Plain(name)) => name,
            None => "",
        }
    }
}

/// Brands appear both as `{"name": "..."}` objects and as bare strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BrandField {
    Named {
        #[serde(default)]
        name: String,
    },
    Plain(String),
}

/// schema.org `AggregateOffer` with optional nested individual offers.
#[derive(Debug, Deserialize)]
struct OfferSet {
    #[serde(default)]
    offers: Vec<Offer>,
    #[serde(rename = "lowPrice", default)]
    low_price: Option<PriceValue>,
    #[serde(rename = "highPrice", default)]
    high_price: Option<PriceValue>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    #[serde(default)]
    price: Option<PriceValue>,
    #[serde(default)]
    sku: Option<String>,
}

/// Prices appear both as JSON numbers and as preformatted strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
}

impl StructuredDataExtractor {
    pub fn new(prices: PriceFormat) -> Self {
        Self { prices }
    }

    /// Extract product records from the page's structured-data payloads.
    ///
    /// A payload that fails to parse is skipped; the page may carry several
    /// JSON-LD blocks for unrelated purposes. The first payload shaped like
    /// an `ItemList` of `Product`s is the canonical product list. An empty
    /// result is expected when no such payload exists.
    pub fn extract(
        &self,
        payloads: &[String],
        classifier: &MaterialClassifier,
    ) -> PartialRecordSet {
        let mut records = PartialRecordSet::new();

        let Some(list) = self.canonical_product_list(payloads) else {
            log::debug!("no structured product list on this page");
            return records;
        };

        for element in list.elements {
            let Some(entry) = element.item else { continue };
            if entry.kind != "Product" {
                continue;
            }

            let record = self.build_record(&entry, classifier);
            if let Some(previous) = records.insert(record.name.clone(), record) {
                // Duplicate names inside one payload: last write wins and
                // the earlier entry's prices are discarded.
                log::debug!("structured entry '{}' overwritten", previous.name);
            }
        }

        records
    }

    /// Find the first payload carrying an `ItemList` of `Product`s.
    fn canonical_product_list(&self, payloads: &[String]) -> Option<ProductList> {
        for payload in payloads {
            let value: Value = match serde_json::from_str(payload) {
                Ok(value) => value,
                Err(error) => {
                    log::warn!("skipping unparseable structured payload: {error}");
                    continue;
                }
            };

            if !Self::is_product_list(&value) {
                continue;
            }

            match serde_json::from_value::<ProductList>(value) {
                Ok(list) => return Some(list),
                Err(error) => {
                    log::warn!("skipping malformed product list payload: {error}");
                }
            }
        }
        None
    }

    fn is_product_list(value: &Value) -> bool {
        if value.get("@type").and_then(Value::as_str) != Some("ItemList") {
            return false;
        }
        let Some(elements) = value.get("itemListElement").and_then(Value::as_array) else {
            return false;
        };
        elements
            .first()
            .and_then(|e| e.get("item"))
            .and_then(|item| item.get("@type"))
            .and_then(Value::as_str)
            == Some("Product")
    }

    fn build_record(&self, entry: &ProductEntry, classifier: &MaterialClassifier) -> ProductRecord {
        let material_type =
            classifier.classify(&entry.name, &entry.description, entry.brand_name());
        let mut record = ProductRecord::new(entry.name.clone(), material_type);

        if let Some(offers) = &entry.offers {
            self.collect_prices(offers, &mut record);
            for offer in &offers.offers {
                if let Some(sku) = &offer.sku {
                    record.add_option(sku);
                }
            }
        }

        price::sort_by_value(&self.prices, &mut record.available_price);
        record.sort_options();
        record
    }

    /// Two-tier price strategy: every individual offer price, and only when
    /// that yields nothing, the aggregate low/high pair.
    fn collect_prices(&self, offers: &OfferSet, record: &mut ProductRecord) {
        for offer in &offers.offers {
            if let Some(value) = &offer.price {
                record.add_price(&self.display_price(value));
            }
        }

        if record.available_price.is_empty() {
            let low = offers.low_price.as_ref().map(|v| self.display_price(v));
            if let Some(low) = &low {
                record.add_price(low);
            }
            if let Some(high) = &offers.high_price {
                let high = self.display_price(high);
                if low.as_deref() != Some(high.as_str()) {
                    record.add_price(&high);
                }
            }
        }
    }

    /// Numeric prices are formatted as currency strings; preformatted text
    /// passes through unchanged.
    fn display_price(&self, value: &PriceValue) -> String {
        match value {
            PriceValue::Number(amount) => price::format_amount(&self.prices, *amount),
            PriceValue::Text(text) => text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    fn extractor() -> StructuredDataExtractor {
        StructuredDataExtractor::new(PriceFormat::default())
    }

    fn classifier() -> MaterialClassifier {
        let config = Config::default();
        MaterialClassifier::for_target(config.target("tatuagem").unwrap())
    }

    fn item_list(products: &str) -> String {
        format!(r#"{{"@type": "ItemList", "itemListElement": [{products}]}}"#)
    }

    fn product(name: &str, offers: &str) -> String {
        format!(
            r#"{{"item": {{"@type": "Product", "name": "{name}", "description": "", "brand": {{"name": "Electric Ink"}}, "offers": {offers}}}}}"#
        )
    }

    #[test]
    fn test_offer_prices_collected_and_sorted() {
        let payload = item_list(&product(
            "Tinta Preta",
            r#"{"offers": [{"price": 50.0}, {"price": 9.9}, {"price": 100.0}]}"#,
        ));
        let records = extractor().extract(&[payload], &classifier());

        let record = &records["Tinta Preta"];
        assert_eq!(
            record.available_price,
            vec!["R$ 9,90", "R$ 50,00", "R$ 100,00"]
        );
    }

    #[test]
    fn test_all_offers_preferred_over_aggregate() {
        let payload = item_list(&product(
            "Tinta Preta",
            r#"{"lowPrice": 1.0, "highPrice": 2.0, "offers": [{"price": 30.0}]}"#,
        ));
        let records = extractor().extract(&[payload], &classifier());
        assert_eq!(records["Tinta Preta"].available_price, vec!["R$ 30,00"]);
    }

    #[test]
    fn test_aggregate_fallback_skips_equal_high() {
        let payload = item_list(&product(
            "Tinta Preta",
            r#"{"lowPrice": 25.5, "highPrice": 25.5}"#,
        ));
        let records = extractor().extract(&[payload], &classifier());
        assert_eq!(records["Tinta Preta"].available_price, vec!["R$ 25,50"]);

        let payload = item_list(&product(
            "Tinta Branca",
            r#"{"lowPrice": 25.5, "highPrice": 32.0}"#,
        ));
        let records = extractor().extract(&[payload], &classifier());
        assert_eq!(
            records["Tinta Branca"].available_price,
            vec!["R$ 25,50", "R$ 32,00"]
        );
    }

    #[test]
    fn test_text_prices_pass_through() {
        let payload = item_list(&product(
            "Tinta Preta",
            r#"{"offers": [{"price": "12,34"}]}"#,
        ));
        let records = extractor().extract(&[payload], &classifier());
        assert_eq!(records["Tinta Preta"].available_price, vec!["12,34"]);
    }

    #[test]
    fn test_offer_skus_become_options() {
        let payload = item_list(&product(
            "Tinta Preta",
            r#"{"offers": [{"price": 30.0, "sku": "60ml"}, {"price": 20.0, "sku": "30ml"}]}"#,
        ));
        let records = extractor().extract(&[payload], &classifier());
        assert_eq!(records["Tinta Preta"].available_options, vec!["30ml", "60ml"]);
    }

    #[test]
    fn test_unparseable_payload_is_skipped() {
        let broken = "{not json".to_string();
        let valid = item_list(&product("Tinta Preta", r#"{"offers": [{"price": 10.0}]}"#));
        let records = extractor().extract(&[broken, valid], &classifier());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_non_product_payloads_are_ignored() {
        let organization = r#"{"@type": "Organization", "name": "Loja"}"#.to_string();
        let records = extractor().extract(&[organization], &classifier());
        assert!(records.is_empty());
    }

    #[test]
    fn test_first_product_list_is_canonical() {
        let first = item_list(&product("Produto A", r#"{"offers": [{"price": 1.0}]}"#));
        let second = item_list(&product("Produto B", r#"{"offers": [{"price": 2.0}]}"#));
        let records = extractor().extract(&[first, second], &classifier());
        assert!(records.contains_key("Produto A"));
        assert!(!records.contains_key("Produto B"));
    }

    #[test]
    fn test_duplicate_name_last_write_wins() {
        let payload = item_list(&format!(
            "{},{}",
            product("Tinta Preta", r#"{"offers": [{"price": 10.0}]}"#),
            product("Tinta Preta", r#"{"offers": [{"price": 99.0}]}"#)
        ));
        let records = extractor().extract(&[payload], &classifier());
        assert_eq!(records["Tinta Preta"].available_price, vec!["R$ 99,00"]);
    }

    #[test]
    fn test_classification_uses_structured_fields() {
        let payload = item_list(&product(
            "Cartucho 3RL",
            r#"{"offers": [{"price": 15.0}]}"#,
        ));
        let records = extractor().extract(&[payload], &classifier());
        assert_eq!(records["Cartucho 3RL"].material_type, "Agulhas e Cartuchos");
    }

    #[test]
    fn test_options_left_for_dom_when_no_skus() {
        let payload = item_list(&product("Tinta Preta", r#"{"offers": [{"price": 10.0}]}"#));
        let records = extractor().extract(&[payload], &classifier());
        assert!(records["Tinta Preta"].available_options.is_empty());
    }
}
