//! Page driver abstractions.
//!
//! The crawl engine is decoupled from how listing pages are actually
//! fetched and rendered. A driver knows how to open a page, wait for its
//! content, expose its HTML and operate the pagination control. Timeouts
//! at this seam are reported as outcomes, not errors: the controller maps
//! each one to a state transition.

pub mod http;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use http::HttpDriver;

/// Result of waiting for listing content to appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSignal {
    /// Product-grid markup or structured-data markup is present
    Present,
    /// Neither appeared within the wait window
    TimedOut,
}

/// State of the "next page" pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    /// No control in the page markup
    Absent,
    /// Control present but disabled
    Disabled,
    /// Control present and clickable
    Enabled,
}

/// Result of triggering a page advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Navigation completed and the network settled
    Settled,
    /// The settle signal did not arrive in time; tolerated, the next
    /// content wait re-validates the page
    SettleTimedOut,
}

/// A rendered listing page session.
#[async_trait]
pub trait PageDriver: Send {
    /// Open the entry listing page.
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Wait, bounded, until the page shows listing content.
    async fn wait_for_content(&mut self, timeout: Duration) -> Result<ContentSignal>;

    /// Full HTML of the current page.
    async fn page_html(&mut self) -> Result<String>;

    /// Probe the pagination control.
    async fn next_control(&mut self) -> Result<NextControl>;

    /// Advance to the next page and wait, bounded, for it to settle.
    async fn advance(&mut self, timeout: Duration) -> Result<AdvanceOutcome>;
}
