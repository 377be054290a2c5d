//! Capability surface consumed from the browser-automation engine.
//!
//! The pipeline never talks to a concrete engine directly; it is written
//! against these traits so selector flows stay testable without a real
//! browser. [`chrome`] provides the production implementation over
//! chromiumoxide (CDP).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;

pub mod chrome;

/// Lifecycle state reported by the browser's download subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    InProgress,
    Completed,
    Canceled,
}

/// One notification on the download-progress channel.
#[derive(Debug, Clone)]
pub struct DownloadEvent {
    /// Opaque identifier; with engine-assigned naming it is also the
    /// on-disk file name of the completed download.
    pub guid: String,
    pub state: DownloadState,
}

/// Single-consumer stream of download-progress notifications.
pub struct DownloadWatcher {
    events: mpsc::UnboundedReceiver<DownloadEvent>,
}

impl DownloadWatcher {
    pub fn new(events: mpsc::UnboundedReceiver<DownloadEvent>) -> Self {
        Self { events }
    }

    /// Next event, or `None` once the engine side hangs up.
    pub async fn next_event(&mut self) -> Option<DownloadEvent> {
        self.events.recv().await
    }
}

/// An owned browser instance.
#[async_trait]
pub trait Browser: Send + Sync + Sized + 'static {
    type Page: Page;

    /// Opens a fresh page/tab.
    async fn new_page(&self) -> Result<Self::Page>;

    /// All currently open pages, in creation order.
    async fn pages(&self) -> Result<Vec<Self::Page>>;

    /// Directs downloads triggered from `page` into `dir` under their
    /// engine-assigned names and returns the progress channel.
    async fn watch_downloads(&self, page: &Self::Page, dir: &Path) -> Result<DownloadWatcher>;

    /// Tears the browser process down. Must be idempotent enough to call
    /// exactly once per export call, success or failure.
    async fn close(&self) -> Result<()>;
}

/// One page/tab of a running browser.
#[async_trait]
pub trait Page: Send + Sync + 'static {
    type Element: Element;

    async fn goto(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Resolves once the page has settled, or errors after `timeout`.
    async fn wait_for_idle(&self, timeout: Duration) -> Result<()>;

    /// First element matching `selector`, if any. A missing element is not
    /// an error at this level; retry/timeout policy lives in the caller.
    async fn find(&self, selector: &str) -> Result<Option<Self::Element>>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    async fn bring_to_front(&self) -> Result<()>;

    async fn title(&self) -> Result<String>;

    async fn url(&self) -> Result<String>;
}

/// A located DOM element.
#[async_trait]
pub trait Element: Send + Sync {
    async fn click(&self) -> Result<()>;

    async fn type_text(&self, text: &str) -> Result<()>;

    /// Empties the element's current value.
    async fn clear_text(&self) -> Result<()>;

    /// Removes focus, firing the page's reactive validation.
    async fn blur(&self) -> Result<()>;

    async fn scroll_into_view(&self) -> Result<()>;

    async fn text(&self) -> Result<String>;

    async fn attribute(&self, name: &str) -> Result<Option<String>>;
}
