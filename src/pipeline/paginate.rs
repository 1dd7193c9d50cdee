//! Pagination control.
//!
//! Walks a listing target page by page through a [`PageDriver`], extracting
//! each page and appending it to the run accumulator. The walk is strictly
//! sequential: advancing is a stateful navigation that must complete before
//! the next page's content is valid.

use std::time::Duration;

use crate::driver::{AdvanceOutcome, ContentSignal, NextControl, PageDriver};
use crate::error::Result;
use crate::models::{CrawlerConfig, ProductRecord};
use crate::services::ListingExtractor;

/// Crawl phases. There is no backward transition and no per-page retry: a
/// page that never shows content ends the run, which bounds total crawl
/// time at the cost of possibly truncating the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fetching,
    Extracting,
    Deciding,
    Advancing,
    Done,
}

/// Result of a completed pagination run.
#[derive(Debug, Default)]
pub struct PaginationRun {
    /// Every page result in crawl order, before deduplication
    pub records: Vec<ProductRecord>,

    /// Listing pages that were extracted
    pub pages_visited: usize,
}

/// Drives the fetch → extract → advance loop for one listing target.
pub struct PaginationController<'a, D: PageDriver> {
    driver: &'a mut D,
    extractor: &'a ListingExtractor,
    config: &'a CrawlerConfig,
    context: &'a str,
}

impl<'a, D: PageDriver> PaginationController<'a, D> {
    pub fn new(
        driver: &'a mut D,
        extractor: &'a ListingExtractor,
        config: &'a CrawlerConfig,
        context: &'a str,
    ) -> Self {
        Self {
            driver,
            extractor,
            config,
            context,
        }
    }

    /// Run the crawl to completion and hand back the accumulator.
    pub async fn run(self, entry_url: &str) -> Result<PaginationRun> {
        let content_wait = Duration::from_secs(self.config.content_wait_secs);
        let settle_wait = Duration::from_secs(self.config.settle_wait_secs);

        self.driver.goto(entry_url).await?;
        tokio::time::sleep(Duration::from_millis(self.config.initial_delay_ms)).await;

        let mut run = PaginationRun::default();
        let mut page_number = 1u32;
        let mut phase = Phase::Fetching;

        loop {
            match phase {
                Phase::Fetching => {
                    phase = match self.driver.wait_for_content(content_wait).await? {
                        ContentSignal::Present => Phase::Extracting,
                        ContentSignal::TimedOut => {
                            // No grid and no structured data: treated as the
                            // end of the listing, not a failure.
                            log::warn!(
                                "{}: no listing content on page {page_number}, ending run",
                                self.context
                            );
                            Phase::Done
                        }
                    };
                }

                Phase::Extracting => {
                    let html = self.driver.page_html().await?;
                    let page = self.extractor.extract_page(&html);
                    run.pages_visited += 1;
                    log::info!(
                        "{}: page {page_number}: {} products ({} total)",
                        self.context,
                        page.len(),
                        run.records.len() + page.len()
                    );
                    run.records.extend(page);
                    phase = Phase::Deciding;
                }

                Phase::Deciding => {
                    phase = match self.driver.next_control().await? {
                        NextControl::Absent => {
                            log::info!("{}: no next-page control, ending run", self.context);
                            Phase::Done
                        }
                        NextControl::Disabled => {
                            log::info!("{}: next-page control disabled, ending run", self.context);
                            Phase::Done
                        }
                        NextControl::Enabled => Phase::Advancing,
                    };
                }

                Phase::Advancing => {
                    if self.driver.advance(settle_wait).await? == AdvanceOutcome::SettleTimedOut {
                        log::warn!(
                            "{}: settle wait timed out after page {page_number}, continuing",
                            self.context
                        );
                    }
                    tokio::time::sleep(Duration::from_millis(self.config.post_advance_delay_ms))
                        .await;
                    page_number += 1;
                    phase = Phase::Fetching;
                }

                Phase::Done => break,
            }
        }

        Ok(run)
    }
}
