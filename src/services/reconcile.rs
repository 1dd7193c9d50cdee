//! Per-page record reconciliation.
//!
//! Merges the structured-data record set with the rendered-markup pass for
//! one page. Structured records are the merge targets when present, since
//! they carry the richer price data; markup-only products are still
//! represented through their fallback records.

use std::collections::HashMap;

use crate::models::ProductRecord;
use crate::services::{DomExtraction, PartialRecordSet};

/// Merges the two partial record sets of one page.
#[derive(Debug, Clone, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// Produce one record per distinct name seen on the page, ordered by
    /// first appearance in the rendered markup.
    ///
    /// For each card name in display order: the structured record is the
    /// merge target when one exists, otherwise the markup fallback record.
    /// Markup-discovered options are unioned into the target, and the
    /// target is appended exactly once even when several cards share a
    /// name.
    pub fn reconcile(
        &self,
        mut structured: PartialRecordSet,
        dom: DomExtraction,
    ) -> Vec<ProductRecord> {
        let mut page: Vec<ProductRecord> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();

        for name in &dom.order {
            let index = match position.get(name) {
                Some(&index) => index,
                None => {
                    let Some(record) = structured
                        .remove(name)
                        .or_else(|| dom.fallback.get(name).cloned())
                    else {
                        continue;
                    };
                    page.push(record);
                    position.insert(name.clone(), page.len() - 1);
                    page.len() - 1
                }
            };

            if let Some(options) = dom.options_by_name.get(name) {
                for option in options {
                    page[index].add_option(option);
                }
            }
        }

        for record in &mut page {
            record.sort_options();
        }
        page
    }
}

/// Convenience function to reconcile one page.
pub fn reconcile_page(structured: PartialRecordSet, dom: DomExtraction) -> Vec<ProductRecord> {
    Reconciler::new().reconcile(structured, dom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured_with(name: &str, prices: &[&str]) -> PartialRecordSet {
        let mut record = ProductRecord::new(name, "Tintas");
        for price in prices {
            record.add_price(price);
        }
        let mut set = PartialRecordSet::new();
        set.insert(name.to_string(), record);
        set
    }

    fn dom_with(name: &str, options: &[&str], fallback_price: Option<&str>) -> DomExtraction {
        let mut dom = DomExtraction::default();
        dom.order.push(name.to_string());
        dom.options_by_name
            .insert(name.to_string(), options.iter().map(|s| s.to_string()).collect());

        let mut fallback = ProductRecord::new(name, "Outros");
        if let Some(price) = fallback_price {
            fallback.add_price(price);
        }
        dom.fallback.insert(name.to_string(), fallback);
        dom
    }

    #[test]
    fn test_structured_record_enriched_with_dom_options() {
        let structured = structured_with("A", &["R$ 10,00"]);
        let dom = dom_with("A", &["30ml", "60ml"], Some("R$ 99,99"));

        let page = reconcile_page(structured, dom);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].available_options, vec!["30ml", "60ml"]);
        // The structured price survives; the markup price is not consulted.
        assert_eq!(page[0].available_price, vec!["R$ 10,00"]);
        assert_eq!(page[0].material_type, "Tintas");
    }

    #[test]
    fn test_dom_only_product_uses_fallback_record() {
        let structured = PartialRecordSet::new();
        let dom = dom_with("Somente HTML", &[], Some("R$ 19,90"));

        let page = reconcile_page(structured, dom);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].available_price, vec!["R$ 19,90"]);
        assert_eq!(page[0].material_type, "Outros");
    }

    #[test]
    fn test_duplicate_cards_append_once() {
        let structured = structured_with("A", &["R$ 10,00"]);
        let mut dom = dom_with("A", &["30ml"], None);
        dom.order.push("A".to_string());

        let page = reconcile_page(structured, dom);
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_option_union_is_idempotent() {
        let structured = structured_with("A", &[]);
        let mut dom = dom_with("A", &["30ml", "60ml"], None);
        dom.order.push("A".to_string());

        let once = reconcile_page(structured_with("A", &[]), dom_with("A", &["30ml", "60ml"], None));
        let twice = reconcile_page(structured, dom);
        assert_eq!(once[0].available_options, twice[0].available_options);
    }

    #[test]
    fn test_page_order_follows_markup_order() {
        let mut structured = structured_with("B", &["R$ 5,00"]);
        structured.extend(structured_with("A", &["R$ 7,00"]));

        let mut dom = DomExtraction::default();
        for name in ["B", "A"] {
            dom.order.push(name.to_string());
            dom.fallback
                .insert(name.to_string(), ProductRecord::new(name, "Outros"));
        }

        let page = reconcile_page(structured, dom);
        let names: Vec<&str> = page.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_options_sorted_lexicographically() {
        let structured = PartialRecordSet::new();
        let dom = dom_with("A", &["caixa com 10", "15mm"], None);

        let page = reconcile_page(structured, dom);
        assert_eq!(page[0].available_options, vec!["15mm", "caixa com 10"]);
    }
}
