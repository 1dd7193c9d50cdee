//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::StorefrontSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Currency formatting for extracted prices
    #[serde(default)]
    pub prices: PriceFormat,

    /// Listing page markup selectors
    #[serde(default)]
    pub selectors: StorefrontSelectors,

    /// Catalog targets to crawl
    #[serde(default = "defaults::default_targets")]
    pub targets: Vec<TargetConfig>,

    /// Catalog merge settings
    #[serde(default)]
    pub merge: MergeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.content_wait_secs == 0 {
            return Err(AppError::validation(
                "crawler.content_wait_secs must be > 0",
            ));
        }
        if self.crawler.settle_wait_secs == 0 {
            return Err(AppError::validation("crawler.settle_wait_secs must be > 0"));
        }
        if self.targets.is_empty() {
            return Err(AppError::validation("No targets defined"));
        }
        for target in &self.targets {
            target.validate()?;
        }
        Ok(())
    }

    /// Find a target by name.
    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            prices: PriceFormat::default(),
            selectors: StorefrontSelectors::default(),
            targets: defaults::default_targets(),
            merge: MergeConfig::default(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Bounded wait for product-grid or structured-data markup, in seconds
    #[serde(default = "defaults::content_wait")]
    pub content_wait_secs: u64,

    /// Bounded wait for the navigation/network-settle signal, in seconds
    #[serde(default = "defaults::settle_wait")]
    pub settle_wait_secs: u64,

    /// Fixed delay after the entry page loads, in milliseconds
    #[serde(default = "defaults::initial_delay")]
    pub initial_delay_ms: u64,

    /// Fixed delay after each page advance, in milliseconds
    #[serde(default = "defaults::post_advance_delay")]
    pub post_advance_delay_ms: u64,

    /// Re-check interval inside the content wait window, in milliseconds
    #[serde(default = "defaults::content_poll")]
    pub content_poll_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            content_wait_secs: defaults::content_wait(),
            settle_wait_secs: defaults::settle_wait(),
            initial_delay_ms: defaults::initial_delay(),
            post_advance_delay_ms: defaults::post_advance_delay(),
            content_poll_ms: defaults::content_poll(),
        }
    }
}

/// Currency formatting rules for extracted prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFormat {
    /// Currency prefix, e.g. "R$"
    #[serde(default = "defaults::currency_prefix")]
    pub prefix: String,

    /// Decimal separator used in formatted prices, e.g. ","
    #[serde(default = "defaults::decimal_separator")]
    pub decimal_separator: String,
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            prefix: defaults::currency_prefix(),
            decimal_separator: defaults::decimal_separator(),
        }
    }
}

/// One catalog subdomain to crawl (e.g. tattoo supplies, cosmetics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Target name, also used for log context
    pub name: String,

    /// Entry listing page URL
    pub url: String,

    /// Output file name for this target's catalog
    pub output_file: String,

    /// Category assigned when no rule matches
    pub fallback_category: String,

    /// Whether the final dedup identity includes the price list
    #[serde(default = "defaults::dedupe_on_prices")]
    pub dedupe_on_prices: bool,

    /// Priority-ordered category rules; the first matching rule wins
    pub rules: Vec<CategoryRule>,
}

impl TargetConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("target.name is empty"));
        }
        if self.url.trim().is_empty() {
            return Err(AppError::validation(format!(
                "target '{}' has no url",
                self.name
            )));
        }
        if self.fallback_category.trim().is_empty() {
            return Err(AppError::validation(format!(
                "target '{}' has no fallback category",
                self.name
            )));
        }
        if self.rules.is_empty() {
            return Err(AppError::validation(format!(
                "target '{}' has no category rules",
                self.name
            )));
        }
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }
}

/// One keyword-match rule of the category table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category label assigned when this rule matches
    pub category: String,

    /// Substrings matched against the lower-cased product name
    #[serde(default)]
    pub name_keywords: Vec<String>,

    /// Substrings matched against the lower-cased description
    #[serde(default)]
    pub description_keywords: Vec<String>,

    /// Name keywords with exclusion guards (brand false-positive suppression)
    #[serde(default)]
    pub guarded_keywords: Vec<GuardedKeyword>,
}

impl CategoryRule {
    fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(AppError::validation("rule without a category label"));
        }
        if self.name_keywords.is_empty()
            && self.description_keywords.is_empty()
            && self.guarded_keywords.is_empty()
        {
            return Err(AppError::validation(format!(
                "rule '{}' has no keywords",
                self.category
            )));
        }
        Ok(())
    }
}

/// A name keyword that only matches when its exclusions are absent.
///
/// Suppresses false positives such as a brand name containing a generic
/// keyword ("Electric Ink" vs. the "ink" keyword of the ink category).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardedKeyword {
    /// Substring matched against the lower-cased product name
    pub keyword: String,

    /// The keyword does not match if any of these occur in the name
    #[serde(default)]
    pub not_in_name: Vec<String>,

    /// The keyword does not match if any of these occur in the brand
    #[serde(default)]
    pub not_in_brand: Vec<String>,
}

/// Catalog merge stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Output file name for the merged catalog
    #[serde(default = "defaults::merge_output")]
    pub output_file: String,

    /// Brand assigned when no brand rule matches
    #[serde(default = "defaults::default_brand")]
    pub default_brand: String,

    /// Priority-ordered brand inference rules
    #[serde(default = "defaults::default_brand_rules")]
    pub brand_rules: Vec<BrandRule>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            output_file: defaults::merge_output(),
            default_brand: defaults::default_brand(),
            brand_rules: defaults::default_brand_rules(),
        }
    }
}

/// Brand inference rule applied to product names during merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandRule {
    /// Substring of the product name identifying the brand
    pub name_contains: String,

    /// Brand assigned when the rule matches
    pub brand: String,

    /// Category override applied when the rule matches
    #[serde(default)]
    pub material_type: Option<String>,
}

mod defaults {
    use super::{BrandRule, CategoryRule, GuardedKeyword, TargetConfig};

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; storefront-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn content_wait() -> u64 {
        30
    }
    pub fn settle_wait() -> u64 {
        30
    }
    pub fn initial_delay() -> u64 {
        8000
    }
    pub fn post_advance_delay() -> u64 {
        5000
    }
    pub fn content_poll() -> u64 {
        500
    }

    // Price defaults
    pub fn currency_prefix() -> String {
        "R$".into()
    }
    pub fn decimal_separator() -> String {
        ",".into()
    }

    pub fn dedupe_on_prices() -> bool {
        true
    }

    // Merge defaults
    pub fn merge_output() -> String {
        "lista_final_mesclada.json".into()
    }
    pub fn default_brand() -> String {
        "Electric Ink".into()
    }
    pub fn default_brand_rules() -> Vec<BrandRule> {
        vec![
            BrandRule {
                name_contains: " EG".into(),
                brand: "Easy Glow".into(),
                material_type: Some("Tintas".into()),
            },
            BrandRule {
                name_contains: "INTZ".into(),
                brand: "Intenze".into(),
                material_type: Some("Tintas".into()),
            },
        ]
    }

    fn rule(
        category: &str,
        name_keywords: &[&str],
        description_keywords: &[&str],
    ) -> CategoryRule {
        CategoryRule {
            category: category.into(),
            name_keywords: name_keywords.iter().map(|s| s.to_string()).collect(),
            description_keywords: description_keywords
                .iter()
                .map(|s| s.to_string())
                .collect(),
            guarded_keywords: Vec::new(),
        }
    }

    // Category tables for the tattoo-supply listing. Order matters: the
    // most specific categories come first so that e.g. "ink cap" lands on
    // the caps category, not the ink category.
    pub fn tattoo_rules() -> Vec<CategoryRule> {
        let mut rules = vec![
            rule("Batoques", &["batoque", "ink cap", "cap"], &["batoque"]),
            rule(
                "Agulhas e Cartuchos",
                &[
                    "agulha", "cartucho", "needle", "rl", "rs", "m1", "rm", "magnum", "liner",
                    "shader",
                ],
                &["cartucho", "agulha"],
            ),
        ];

        let mut tintas = rule(
            "Tintas",
            &["tinta", "pigmento", "preto", "branco"],
            &["tinta", "pigmento"],
        );
        tintas.guarded_keywords = vec![GuardedKeyword {
            keyword: "ink".into(),
            not_in_name: vec!["ink cap".into()],
            not_in_brand: vec!["electric ink".into()],
        }];
        rules.push(tintas);

        rules.extend([
            rule("Luvas", &["luva", "gloves"], &["luva"]),
            rule(
                "Materiais de Barreira",
                &["filme", "plástico", "curativo", "bandagem", "wrap", "cover"],
                &["filme", "curativo"],
            ),
            rule(
                "Biossegurança e Higiene",
                &["álcool", "sabonete", "desinfetante", "cleaner", "assepsia"],
                &["higiene", "assepsia"],
            ),
            rule(
                "Cremes e Pós-Tatuagem",
                &["vaselina", "manteiga", "butter", "aftercare", "creme"],
                &["vaselina", "pós-tattoo"],
            ),
            rule(
                "Máquinas",
                &["máquina", "machine", "pen"],
                &["máquina", "rotativa"],
            ),
            rule(
                "Fontes e Cabos",
                &["fonte", "power supply", "cabo", "clip cord"],
                &["fonte", "cabo"],
            ),
        ]);
        rules
    }

    // Category table for the cosmetics listing.
    pub fn cosmetics_rules() -> Vec<CategoryRule> {
        vec![
            rule(
                "Cremes e Pós-Tatuagem",
                &["vaselina", "manteiga", "butter", "aftercare", "creme"],
                &["vaselina", "pós-tattoo", "cicatrizante"],
            ),
            rule(
                "Higiene e Limpeza Corporal",
                &["sabonete", "esfoliante", "scrub", "limpeza"],
                &["higiene", "limpeza"],
            ),
            rule(
                "Proteção Solar",
                &["protetor solar", "solar"],
                &["proteção solar"],
            ),
            rule(
                "Hidratantes e Loções",
                &["loção", "hidratante"],
                &["hidratante"],
            ),
            rule(
                "Materiais para Stencil",
                &["stencil", "transfer"],
                &["stencil", "transfer"],
            ),
            rule("Luvas", &["luva", "gloves"], &["luva"]),
            rule(
                "Materiais de Barreira",
                &["filme", "plástico", "curativo", "bandagem", "wrap", "cover"],
                &["filme", "curativo"],
            ),
            rule(
                "Biossegurança Geral",
                &["álcool", "desinfetante", "cleaner", "assepsia"],
                &["assepsia"],
            ),
        ]
    }

    pub fn default_targets() -> Vec<TargetConfig> {
        vec![
            TargetConfig {
                name: "tatuagem".into(),
                url: "https://www.electricink.com.br/tatuagem".into(),
                output_file: "lista_tatuagem.json".into(),
                fallback_category: "Outros".into(),
                dedupe_on_prices: true,
                rules: tattoo_rules(),
            },
            TargetConfig {
                name: "cosmeticos".into(),
                url: "https://www.electricink.com.br/cosmeticos".into(),
                output_file: "lista_cosmeticos.json".into(),
                fallback_category: "Outros Cosméticos".into(),
                dedupe_on_prices: false,
                rules: cosmetics_rules(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_targets() {
        let mut config = Config::default();
        config.targets.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_rule_without_keywords() {
        let mut config = Config::default();
        config.targets[0].rules.push(CategoryRule {
            category: "Vazia".into(),
            name_keywords: Vec::new(),
            description_keywords: Vec::new(),
            guarded_keywords: Vec::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_targets_cover_both_listings() {
        let config = Config::default();
        assert!(config.target("tatuagem").is_some());
        assert!(config.target("cosmeticos").is_some());
        assert!(config.target("unknown").is_none());
    }

    #[test]
    fn tattoo_rules_put_caps_before_inks() {
        let config = Config::default();
        let rules = &config.target("tatuagem").unwrap().rules;
        let caps = rules.iter().position(|r| r.category == "Batoques").unwrap();
        let inks = rules.iter().position(|r| r.category == "Tintas").unwrap();
        assert!(caps < inks);
    }
}
