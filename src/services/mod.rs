// src/services/mod.rs

//! Extraction services.
//!
//! One listing page is processed in three steps: the structured-data
//! payloads and the rendered cards are each parsed into partial record
//! sets, then reconciled into a single ordered page result.

mod classifier;
mod dom;
mod reconcile;
mod structured;

use std::collections::HashMap;

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Config, ProductRecord, TargetConfig};

pub use classifier::MaterialClassifier;
pub use dom::{DomExtraction, RenderedDomExtractor};
pub use reconcile::{Reconciler, reconcile_page};
pub use structured::StructuredDataExtractor;

/// Output of one extractor for one page, keyed by product name.
pub type PartialRecordSet = HashMap<String, ProductRecord>;

/// Parse a CSS selector with error context.
pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Complete per-page extraction pipeline for one catalog target.
pub struct ListingExtractor {
    payload_selector: Selector,
    structured: StructuredDataExtractor,
    dom: RenderedDomExtractor,
    reconciler: Reconciler,
    classifier: MaterialClassifier,
}

impl ListingExtractor {
    pub fn new(config: &Config, target: &TargetConfig) -> Result<Self> {
        Ok(Self {
            payload_selector: parse_selector(&config.selectors.structured_data)?,
            structured: StructuredDataExtractor::new(config.prices.clone()),
            dom: RenderedDomExtractor::new(&config.selectors)?,
            reconciler: Reconciler::new(),
            classifier: MaterialClassifier::for_target(target),
        })
    }

    /// Extract and reconcile every product on one page of listing HTML.
    pub fn extract_page(&self, html: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);

        let payloads: Vec<String> = document
            .select(&self.payload_selector)
            .map(|script| script.text().collect())
            .collect();

        let structured = self.structured.extract(&payloads, &self.classifier);
        let dom = self.dom.extract(&document, &self.classifier);
        self.reconciler.reconcile(structured, dom)
    }
}
