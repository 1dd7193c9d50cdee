// src/pipeline/crawl.rs

//! Catalog crawling pipeline.

use chrono::Utc;

use crate::driver::{HttpDriver, PageDriver};
use crate::error::{AppError, Result};
use crate::models::{Config, CrawlStats, ProductRecord, TargetConfig, TargetStats};
use crate::services::ListingExtractor;
use crate::storage::CatalogStorage;

use super::dedupe::Deduplicator;
use super::paginate::PaginationController;

/// Result of crawling one catalog target.
#[derive(Debug)]
pub struct TargetOutcome {
    pub records: Vec<ProductRecord>,
    pub stats: TargetStats,
}

/// Crawl one target through the given driver: paginate, then deduplicate.
pub async fn run_target<D: PageDriver>(
    config: &Config,
    target: &TargetConfig,
    driver: &mut D,
) -> Result<TargetOutcome> {
    let extractor = ListingExtractor::new(config, target)?;
    let controller = PaginationController::new(driver, &extractor, &config.crawler, &target.name);

    let run = controller.run(&target.url).await?;

    let deduplicator = if target.dedupe_on_prices {
        Deduplicator::new()
    } else {
        Deduplicator::names_and_options()
    };
    let unique = deduplicator.dedupe(&run.records);

    log::info!(
        "{}: {} pages, {} records, {} unique",
        target.name,
        run.pages_visited,
        run.records.len(),
        unique.len()
    );

    let stats = TargetStats {
        target: target.name.clone(),
        pages_visited: run.pages_visited,
        raw_count: run.records.len(),
        unique_count: unique.len(),
    };

    Ok(TargetOutcome {
        records: unique,
        stats,
    })
}

/// Run the crawler for all configured targets, or a single named one.
///
/// Each target's deduplicated catalog is persisted as it completes; run
/// statistics are written at the end.
pub async fn run_crawler(
    config: &Config,
    storage: &dyn CatalogStorage,
    only_target: Option<&str>,
) -> Result<CrawlStats> {
    if let Some(name) = only_target {
        if config.target(name).is_none() {
            return Err(AppError::config(format!("Unknown target '{name}'")));
        }
    }

    let start_time = Utc::now();
    let mut targets = Vec::new();

    for target in &config.targets {
        if only_target.is_some_and(|name| name != target.name) {
            continue;
        }

        let mut driver = HttpDriver::new(config)?;
        let outcome = run_target(config, target, &mut driver).await?;

        let summary = storage
            .write_catalog(&target.output_file, &outcome.records)
            .await?;
        log::info!(
            "{}: wrote {} products to {}",
            target.name,
            summary.count,
            summary.location
        );

        targets.push(outcome.stats);
    }

    let stats = CrawlStats {
        start_time,
        end_time: Utc::now(),
        targets,
    };
    storage.write_stats(&stats).await?;

    Ok(stats)
}
