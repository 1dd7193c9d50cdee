//! Material category classification.
//!
//! Applies a priority-ordered keyword table against product text; the first
//! matching rule wins. The table is configuration, not logic, so different
//! catalogs (tattoo supplies, cosmetics) swap in their own rules.

use crate::models::{CategoryRule, TargetConfig};

/// Classifies products into material categories from free text.
pub struct MaterialClassifier {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl MaterialClassifier {
    /// Create a classifier from an ordered rule table.
    ///
    /// Keywords are lower-cased once here; matching is always done against
    /// lower-cased input.
    pub fn new(rules: Vec<CategoryRule>, fallback: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                for keyword in rule
                    .name_keywords
                    .iter_mut()
                    .chain(rule.description_keywords.iter_mut())
                {
                    *keyword = keyword.to_lowercase();
                }
                for guarded in &mut rule.guarded_keywords {
                    guarded.keyword = guarded.keyword.to_lowercase();
                    for exclusion in guarded
                        .not_in_name
                        .iter_mut()
                        .chain(guarded.not_in_brand.iter_mut())
                    {
                        *exclusion = exclusion.to_lowercase();
                    }
                }
                rule
            })
            .collect();

        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Create a classifier for a configured catalog target.
    pub fn for_target(target: &TargetConfig) -> Self {
        Self::new(target.rules.clone(), target.fallback_category.clone())
    }

    /// Classify a product from its name, description and brand.
    ///
    /// Deterministic and side-effect free. Rules are evaluated in table
    /// order; the first match wins. Returns the fallback label when nothing
    /// matches.
    pub fn classify(&self, name: &str, description: &str, brand: &str) -> String {
        let name = name.to_lowercase();
        let description = description.to_lowercase();
        let brand = brand.to_lowercase();

        self.rules
            .iter()
            .find(|rule| Self::matches(rule, &name, &description, &brand))
            .map(|rule| rule.category.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn matches(rule: &CategoryRule, name: &str, description: &str, brand: &str) -> bool {
        if rule.name_keywords.iter().any(|k| name.contains(k)) {
            return true;
        }
        if rule
            .description_keywords
            .iter()
            .any(|k| description.contains(k))
        {
            return true;
        }
        rule.guarded_keywords.iter().any(|guarded| {
            name.contains(&guarded.keyword)
                && !guarded.not_in_name.iter().any(|e| name.contains(e))
                && !guarded.not_in_brand.iter().any(|e| brand.contains(e))
        })
    }
}
