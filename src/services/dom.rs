//! Rendered-markup extraction service.
//!
//! Walks the visible product cards of a listing page. Options come from a
//! three-tier fallback because different pages render their SKU widget
//! differently: the full option list, then the single selected option,
//! then a volume/quantity token recovered from the product name itself.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ProductRecord, StorefrontSelectors};
use crate::services::{MaterialClassifier, PartialRecordSet, parse_selector};
use crate::utils::collapse_whitespace;

/// Output of one rendered-markup pass over a page.
#[derive(Debug, Default)]
pub struct DomExtraction {
    /// Product name per card, in display order (repeats when a product
    /// renders as several cards)
    pub order: Vec<String>,

    /// Options discovered per product name
    pub options_by_name: HashMap<String, Vec<String>>,

    /// Markup-only records, used when a name has no structured counterpart
    pub fallback: PartialRecordSet,
}

/// Extracts partial product records from visible listing markup.
pub struct RenderedDomExtractor {
    gallery_item: Selector,
    product_brand: Selector,
    product_name: Selector,
    selling_price: Selector,
    sku_list: Selector,
    sku_list_item: Selector,
    sku_selected: Selector,
    name_token: Regex,
}

impl RenderedDomExtractor {
    /// Compile the configured selectors once.
    pub fn new(selectors: &StorefrontSelectors) -> Result<Self> {
        Ok(Self {
            gallery_item: parse_selector(&selectors.gallery_item)?,
            product_brand: parse_selector(&selectors.product_brand)?,
            product_name: parse_selector(&selectors.product_name)?,
            selling_price: parse_selector(&selectors.selling_price)?,
            sku_list: parse_selector(&selectors.sku_list)?,
            sku_list_item: parse_selector(&selectors.sku_list_item)?,
            sku_selected: parse_selector(&selectors.sku_selected)?,
            name_token: RegexBuilder::new(&selectors.option_in_name)
                .case_insensitive(true)
                .build()
                .map_err(|e| AppError::pattern(&selectors.option_in_name, e))?,
        })
    }

    /// Extract every visible product card, preserving display order.
    pub fn extract(&self, document: &Html, classifier: &MaterialClassifier) -> DomExtraction {
        let mut extraction = DomExtraction::default();

        for card in document.select(&self.gallery_item) {
            let brand = self.element_text(&card, &self.product_brand);
            let name = if brand.is_empty() {
                self.element_text(&card, &self.product_name)
            } else {
                brand.clone()
            };

            let options = self.card_options(&card, &name);
            extraction
                .options_by_name
                .entry(name.clone())
                .or_default()
                .extend(options);

            extraction.fallback.entry(name.clone()).or_insert_with(|| {
                let mut record =
                    ProductRecord::new(name.clone(), classifier.classify(&name, "", &brand));
                let listing_price = self.element_text(&card, &self.selling_price);
                if !listing_price.is_empty() {
                    record.add_price(&listing_price);
                }
                record
            });

            extraction.order.push(name);
        }

        extraction
    }

    /// Three-tier option fallback, each tier attempted only if the previous
    /// yielded nothing.
    fn card_options(&self, card: &ElementRef<'_>, name: &str) -> Vec<String> {
        if let Some(list) = card.select(&self.sku_list).next() {
            let entries: Vec<String> = list
                .select(&self.sku_list_item)
                .map(|item| collapse_whitespace(&item.text().collect::<String>()))
                .filter(|text| !text.is_empty())
                .collect();
            if !entries.is_empty() {
                return entries;
            }
        }

        let selected = self.element_text(card, &self.sku_selected);
        if !selected.is_empty() {
            return vec![selected];
        }

        self.name_token
            .captures(name)
            .and_then(|captures| captures.get(1))
            .map(|token| vec![token.as_str().to_string()])
            .unwrap_or_default()
    }

    fn element_text(&self, card: &ElementRef<'_>, selector: &Selector) -> String {
        card.select(selector)
            .next()
            .map(|element| collapse_whitespace(&element.text().collect::<String>()))
            .unwrap_or_default()
    }
}
