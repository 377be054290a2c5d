//! Production engine over chromiumoxide (Chrome DevTools Protocol).

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    DownloadProgressState, EventDownloadProgress, SetDownloadBehaviorBehavior,
    SetDownloadBehaviorParams,
};
use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::ExporterConfig;
use crate::engine::{Browser, DownloadEvent, DownloadState, DownloadWatcher, Element, Page};
use crate::error::{ExportError, Result};
use crate::wait;

const IDLE_POLL: Duration = Duration::from_millis(250);

/// Chromium instance driven over CDP.
///
/// The CDP event handler must be pumped for the connection to make
/// progress, so launch spawns a dedicated task that is torn down with the
/// browser.
pub struct ChromeBrowser {
    browser: Mutex<CdpBrowser>,
    handler_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ChromeBrowser {
    /// Launches a browser process, headless unless the config says otherwise.
    pub async fn launch(config: &ExporterConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder().request_timeout(config.timeout);
        if config.show_browser_window {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(ExportError::BrowserLaunch)?;

        let (browser, mut handler) = CdpBrowser::launch(browser_config)
            .await
            .map_err(|e| ExportError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    trace!(target = "fleetx", error = %err, "cdp handler event");
                }
            }
        });

        debug!(target = "fleetx", headless = !config.show_browser_window, "browser launched");
        Ok(Self {
            browser: Mutex::new(browser),
            handler_task: std::sync::Mutex::new(Some(handler_task)),
        })
    }
}

#[async_trait]
impl Browser for ChromeBrowser {
    type Page = ChromePage;

    async fn new_page(&self) -> Result<Self::Page> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ExportError::BrowserLaunch(format!("failed to open page: {e}")))?;
        Ok(ChromePage { inner: page })
    }

    async fn pages(&self) -> Result<Vec<Self::Page>> {
        let browser = self.browser.lock().await;
        let pages = browser.pages().await?;
        Ok(pages.into_iter().map(|inner| ChromePage { inner }).collect())
    }

    async fn watch_downloads(&self, page: &Self::Page, dir: &Path) -> Result<DownloadWatcher> {
        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::AllowAndName)
            .download_path(dir.display().to_string())
            .events_enabled(true)
            .build()
            .map_err(ExportError::Export)?;
        page.inner.execute(params).await?;

        let mut progress = page.inner.event_listener::<EventDownloadProgress>().await?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(event) = progress.next().await {
                let state = match event.state {
                    DownloadProgressState::InProgress => DownloadState::InProgress,
                    DownloadProgressState::Completed => DownloadState::Completed,
                    DownloadProgressState::Canceled => DownloadState::Canceled,
                };
                trace!(target = "fleetx", guid = %event.guid, ?state, "download progress");
                if tx.send(DownloadEvent { guid: event.guid.clone(), state }).is_err() {
                    break;
                }
            }
        });

        debug!(target = "fleetx", dir = %dir.display(), "download capture enabled");
        Ok(DownloadWatcher::new(rx))
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        let close_result = browser.close().await;
        let _ = browser.wait().await;
        if let Some(task) = self.handler_task.lock().unwrap().take() {
            task.abort();
        }
        close_result.map_err(|e| ExportError::Engine(e.to_string()))?;
        debug!(target = "fleetx", "browser closed");
        Ok(())
    }
}

/// One Chromium page/tab.
pub struct ChromePage {
    inner: chromiumoxide::Page,
}

#[async_trait]
impl Page for ChromePage {
    type Element = ChromeElement;

    async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        let navigation = async {
            self.inner.goto(url).await?;
            self.inner.wait_for_navigation().await?;
            Ok::<(), chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(timeout, navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(ExportError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            }),
            Err(_) => Err(ExportError::Navigation {
                url: url.to_string(),
                reason: format!("page did not load within {}ms", timeout.as_millis()),
            }),
        }
    }

    async fn wait_for_idle(&self, timeout: Duration) -> Result<()> {
        // CDP has no direct network-idle signal at this level; poll the
        // document ready state under the same overall timeout.
        let budget = wait::poll_budget(timeout, IDLE_POLL);
        for _ in 0..budget {
            let ready = match self.inner.evaluate("document.readyState === 'complete'").await {
                Ok(result) => result.into_value::<bool>().unwrap_or(false),
                Err(_) => false,
            };
            if ready {
                return Ok(());
            }
            wait::pause(IDLE_POLL).await;
        }
        Err(ExportError::Timeout {
            ms: timeout.as_millis() as u64,
            condition: "page idle".to_string(),
        })
    }

    async fn find(&self, selector: &str) -> Result<Option<Self::Element>> {
        match self.inner.find_element(selector).await {
            Ok(element) => Ok(Some(ChromeElement { inner: element })),
            Err(err) => {
                trace!(target = "fleetx", %selector, error = %err, "element lookup miss");
                Ok(None)
            }
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>> {
        let elements = self.inner.find_elements(selector).await.unwrap_or_default();
        Ok(elements.into_iter().map(|inner| ChromeElement { inner }).collect())
    }

    async fn bring_to_front(&self) -> Result<()> {
        self.inner.bring_to_front().await?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.inner.get_title().await?.unwrap_or_default())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.inner.url().await?.unwrap_or_default())
    }
}

/// One located DOM element.
pub struct ChromeElement {
    inner: chromiumoxide::Element,
}

#[async_trait]
impl Element for ChromeElement {
    async fn click(&self) -> Result<()> {
        self.inner.click().await?;
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.inner.focus().await?;
        self.inner.type_str(text).await?;
        Ok(())
    }

    async fn clear_text(&self) -> Result<()> {
        self.inner.call_js_fn("function() { this.value = ''; }", false).await?;
        Ok(())
    }

    async fn blur(&self) -> Result<()> {
        self.inner.call_js_fn("function() { this.blur(); }", false).await?;
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        self.inner.scroll_into_view().await?;
        Ok(())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.inner.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.inner.attribute(name).await?)
    }
}
