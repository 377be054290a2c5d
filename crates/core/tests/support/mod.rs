//! In-memory engine used to drive the export pipeline without a browser.
//!
//! Pages are scripted DOMs (selector -> elements); element interactions
//! append to a shared action log that tests assert against. Click effects
//! model the two side channels the real engine has: opening a new tab and
//! emitting download-progress events.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fleetx::engine::{Browser, DownloadEvent, DownloadWatcher, Element, Page};
use fleetx::error::{ExportError, Result};
use fleetx::{Credentials, Delays, ExporterConfig, ExporterOptions};
use tokio::sync::mpsc;

/// Shared record of every interaction, in order.
#[derive(Clone, Default)]
pub struct ActionLog(Arc<Mutex<Vec<String>>>);

impl ActionLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.entries().iter().filter(|e| e.contains(needle)).count()
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.entries().iter().position(|e| e.contains(needle))
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.position(needle).is_some()
    }
}

#[derive(Default)]
pub struct BrowserState {
    pages: Mutex<Vec<MockPage>>,
    close_count: AtomicUsize,
    download_tx: Mutex<Option<mpsc::UnboundedSender<DownloadEvent>>>,
}

/// Scripted browser double counting close invocations.
#[derive(Clone)]
pub struct MockBrowser {
    state: Arc<BrowserState>,
}

impl MockBrowser {
    pub fn close_count(&self) -> usize {
        self.state.close_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for MockBrowser {
    type Page = MockPage;

    async fn new_page(&self) -> Result<Self::Page> {
        self.state
            .pages
            .lock()
            .unwrap()
            .first()
            .cloned()
            .ok_or_else(|| ExportError::BrowserLaunch("no scripted page".into()))
    }

    async fn pages(&self) -> Result<Vec<Self::Page>> {
        Ok(self.state.pages.lock().unwrap().clone())
    }

    async fn watch_downloads(&self, _page: &Self::Page, _dir: &Path) -> Result<DownloadWatcher> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.state.download_tx.lock().unwrap() = Some(tx);
        Ok(DownloadWatcher::new(rx))
    }

    async fn close(&self) -> Result<()> {
        self.state.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One scripted page. Clones share the same DOM and URL cell.
#[derive(Clone)]
pub struct MockPage {
    url: Arc<Mutex<String>>,
    title: String,
    dom: Arc<Mutex<HashMap<String, Vec<MockElement>>>>,
    log: ActionLog,
    fail_goto_containing: Option<String>,
}

impl MockPage {
    /// Adds an element under its selector.
    pub fn insert(&self, element: MockElement) {
        self.dom
            .lock()
            .unwrap()
            .entry(element.selector.clone())
            .or_default()
            .push(element);
    }
}

#[async_trait]
impl Page for MockPage {
    type Element = MockElement;

    async fn goto(&self, url: &str, _timeout: Duration) -> Result<()> {
        self.log.push(format!("goto {url}"));
        if let Some(fragment) = &self.fail_goto_containing {
            if url.contains(fragment.as_str()) {
                return Err(ExportError::Navigation {
                    url: url.to_string(),
                    reason: "scripted failure".into(),
                });
            }
        }
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn wait_for_idle(&self, _timeout: Duration) -> Result<()> {
        self.log.push("idle");
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Option<Self::Element>> {
        Ok(self.dom.lock().unwrap().get(selector).and_then(|els| els.first().cloned()))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>> {
        Ok(self.dom.lock().unwrap().get(selector).cloned().unwrap_or_default())
    }

    async fn bring_to_front(&self) -> Result<()> {
        self.log.push(format!("front {}", self.url.lock().unwrap()));
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.title.clone())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.url.lock().unwrap().clone())
    }
}

/// Side effect of clicking a scripted element.
#[derive(Clone)]
pub enum ClickEffect {
    None,
    /// Registers a page, as when a print link opens a new tab.
    OpenPage { state: Arc<BrowserState>, page: MockPage },
    /// Emits download-progress events, optionally creating the downloaded
    /// file first the way the real engine does.
    EmitDownloads { state: Arc<BrowserState>, events: Vec<DownloadEvent>, file: Option<PathBuf> },
}

#[derive(Clone)]
pub struct MockElement {
    selector: String,
    text: String,
    attrs: HashMap<String, String>,
    log: ActionLog,
    effect: ClickEffect,
}

impl MockElement {
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_effect(mut self, effect: ClickEffect) -> Self {
        self.effect = effect;
        self
    }

    fn log_id(&self) -> String {
        if self.text.is_empty() {
            self.selector.clone()
        } else {
            format!("{}:{}", self.selector, self.text)
        }
    }
}

#[async_trait]
impl Element for MockElement {
    async fn click(&self) -> Result<()> {
        self.log.push(format!("click {}", self.log_id()));
        match &self.effect {
            ClickEffect::None => {}
            ClickEffect::OpenPage { state, page } => {
                state.pages.lock().unwrap().push(page.clone());
            }
            ClickEffect::EmitDownloads { state, events, file } => {
                if let Some(path) = file {
                    std::fs::write(path, b"report contents")?;
                }
                if let Some(tx) = state.download_tx.lock().unwrap().as_ref() {
                    for event in events {
                        let _ = tx.send(event.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        self.log.push(format!("type {}={text}", self.selector));
        Ok(())
    }

    async fn clear_text(&self) -> Result<()> {
        self.log.push(format!("clear {}", self.selector));
        Ok(())
    }

    async fn blur(&self) -> Result<()> {
        self.log.push(format!("blur {}", self.selector));
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        self.log.push(format!("scroll {}", self.log_id()));
        Ok(())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attrs.get(name).cloned())
    }
}

/// Builds a scripted browser plus its shared action log.
pub struct Fixture {
    pub log: ActionLog,
    state: Arc<BrowserState>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            log: ActionLog::default(),
            state: Arc::new(BrowserState::default()),
        }
    }

    pub fn browser(&self) -> MockBrowser {
        MockBrowser { state: Arc::clone(&self.state) }
    }

    /// Registers a page with the browser and returns a handle for
    /// scripting its DOM.
    pub fn page(&self, url: &str) -> MockPage {
        self.page_failing_goto(url, None)
    }

    pub fn page_failing_goto(&self, url: &str, fail_goto_containing: Option<&str>) -> MockPage {
        let page = MockPage {
            url: Arc::new(Mutex::new(url.to_string())),
            title: "Report Viewer".to_string(),
            dom: Arc::new(Mutex::new(HashMap::new())),
            log: self.log.clone(),
            fail_goto_containing: fail_goto_containing.map(str::to_string),
        };
        self.state.pages.lock().unwrap().push(page.clone());
        page
    }

    /// An unregistered page, for scripting tabs that only appear after a
    /// click (via [`ClickEffect::OpenPage`]).
    pub fn detached_page(&self, url: &str) -> MockPage {
        let page = MockPage {
            url: Arc::new(Mutex::new(url.to_string())),
            title: "Report Viewer".to_string(),
            dom: Arc::new(Mutex::new(HashMap::new())),
            log: self.log.clone(),
            fail_goto_containing: None,
        };
        page
    }

    pub fn element(&self, selector: &str) -> MockElement {
        MockElement {
            selector: selector.to_string(),
            text: String::new(),
            attrs: HashMap::new(),
            log: self.log.clone(),
            effect: ClickEffect::None,
        }
    }

    pub fn open_page_effect(&self, page: MockPage) -> ClickEffect {
        ClickEffect::OpenPage { state: Arc::clone(&self.state), page }
    }

    pub fn download_effect(&self, events: Vec<DownloadEvent>, file: Option<PathBuf>) -> ClickEffect {
        ClickEffect::EmitDownloads { state: Arc::clone(&self.state), events, file }
    }
}

/// Config with short waits so failure-path tests stay fast.
pub fn test_config(download_dir: &Path) -> ExporterConfig {
    ExporterConfig::new(
        "https://fleet.example.test/",
        Credentials {
            username: "ops".into(),
            password: "secret".into(),
        },
        ExporterOptions {
            download_folder: Some(download_dir.to_path_buf()),
            timeout: Some(Duration::from_millis(400)),
            show_browser_window: false,
            time_zone: None,
            delays: Some(Delays {
                settle: Duration::from_millis(1),
                poll_interval: Duration::from_millis(50),
                element_retry: Duration::from_millis(10),
            }),
        },
    )
    .expect("test config")
}
