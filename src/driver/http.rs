// src/driver/http.rs

//! HTTP page driver.
//!
//! Drives server-rendered listing pages over plain HTTP. Pagination is a
//! `page` query parameter rather than a click, and the content wait
//! re-fetches within its window so a listing that is still warming up can
//! be retried. Storefronts that only render the grid client-side need a
//! browser-backed driver implementing the same trait.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tokio::time::Instant;

use crate::driver::{AdvanceOutcome, ContentSignal, NextControl, PageDriver};
use crate::error::Result;
use crate::models::{Config, CrawlerConfig};
use crate::services::parse_selector;
use crate::utils::url;

pub struct HttpDriver {
    client: reqwest::Client,
    gallery_item: Selector,
    structured_data: Selector,
    next_page: Selector,
    poll_interval: Duration,
    base_url: String,
    page: u32,
    html: String,
}

fn build_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

impl HttpDriver {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(&config.crawler)?,
            gallery_item: parse_selector(&config.selectors.gallery_item)?,
            structured_data: parse_selector(&config.selectors.structured_data)?,
            next_page: parse_selector(&config.selectors.next_page)?,
            poll_interval: Duration::from_millis(config.crawler.content_poll_ms),
            base_url: String::new(),
            page: 1,
            html: String::new(),
        })
    }

    /// Driver with a custom poll interval (used to speed up tests).
    pub fn with_poll_interval(config: &Config, poll_interval: Duration) -> Result<Self> {
        let mut driver = Self::new(config)?;
        driver.poll_interval = poll_interval;
        Ok(driver)
    }

    async fn fetch_current(&mut self) -> Result<()> {
        let page_url = url::with_page(&self.base_url, self.page)?;
        self.html = self
            .client
            .get(&page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(())
    }

    fn has_listing_content(&self) -> bool {
        let document = Html::parse_document(&self.html);
        document.select(&self.gallery_item).next().is_some()
            || document.select(&self.structured_data).next().is_some()
    }

    fn probe_next_control(&self) -> NextControl {
        let document = Html::parse_document(&self.html);
        match document.select(&self.next_page).next() {
            None => NextControl::Absent,
            Some(control) if control.value().attr("disabled").is_some() => NextControl::Disabled,
            Some(_) => NextControl::Enabled,
        }
    }
}

#[async_trait]
impl PageDriver for HttpDriver {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.base_url = url.to_string();
        self.page = 1;
        self.fetch_current().await
    }

    async fn wait_for_content(&mut self, timeout: Duration) -> Result<ContentSignal> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.has_listing_content() {
                return Ok(ContentSignal::Present);
            }
            if Instant::now() >= deadline {
                return Ok(ContentSignal::TimedOut);
            }
            tokio::time::sleep(self.poll_interval).await;
            if let Err(error) = self.fetch_current().await {
                log::debug!("content re-fetch failed, retrying: {error}");
            }
        }
    }

    async fn page_html(&mut self) -> Result<String> {
        Ok(self.html.clone())
    }

    async fn next_control(&mut self) -> Result<NextControl> {
        Ok(self.probe_next_control())
    }

    async fn advance(&mut self, timeout: Duration) -> Result<AdvanceOutcome> {
        self.page += 1;
        match tokio::time::timeout(timeout, self.fetch_current()).await {
            Ok(Ok(())) => Ok(AdvanceOutcome::Settled),
            Ok(Err(error)) => {
                log::warn!("advance to page {} failed: {error}", self.page);
                Ok(AdvanceOutcome::SettleTimedOut)
            }
            Err(_) => Ok(AdvanceOutcome::SettleTimedOut),
        }
    }
}
