//! Export trigger and download capture.
//!
//! The print-options click starts a browser-level download whose
//! completion is reported asynchronously on the download-progress
//! channel, out-of-band from the UI call chain. The channel is the
//! authoritative result; the wall-clock deadline exists only to bound
//! the total wait.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::ExporterConfig;
use crate::engine::{Browser, DownloadState, DownloadWatcher, Element, Page};
use crate::error::{ExportError, Result};
use crate::format::ReportFormat;
use crate::selectors::Selectors;
use crate::wait;

/// Drives the print-options menu on the report page and resolves with the
/// path of the captured download.
pub async fn export_report<B: Browser>(
    browser: &B,
    page: &B::Page,
    format: ReportFormat,
    config: &ExporterConfig,
    selectors: &Selectors,
) -> Result<PathBuf> {
    page.bring_to_front().await?;
    page.wait_for_idle(config.timeout).await?;

    let title = page.title().await.unwrap_or_default();
    debug!(target = "fleetx", %title, %format, "exporting report page");

    let mut watcher = browser.watch_downloads(page, &config.download_dir).await?;

    open_print_menu(page, config, selectors).await?;
    click_format_entry(page, format, config, selectors).await?;

    let path = await_download(&mut watcher, format, config).await?;
    info!(target = "fleetx", path = %path.display(), "report exported");
    Ok(path)
}

async fn open_print_menu<P: Page>(page: &P, config: &ExporterConfig, selectors: &Selectors) -> Result<()> {
    let menu = wait::find_with_retry(page, selectors.print_menu, config.timeout, config.delays.element_retry)
        .await
        .map_err(|_| ExportError::Export(format!("print menu not found: {}", selectors.print_menu)))?;
    menu.click().await?;
    wait::pause(config.delays.settle).await;
    page.wait_for_idle(config.timeout).await
}

/// Clicks the first menu entry whose label starts with the format name.
/// This click is what triggers the browser-level download.
///
/// Menu entries can render after the menu container opens, so the scan
/// retries under the same budget as every other element lookup.
async fn click_format_entry<P: Page>(
    page: &P,
    format: ReportFormat,
    config: &ExporterConfig,
    selectors: &Selectors,
) -> Result<()> {
    let budget = wait::poll_budget(config.timeout, config.delays.element_retry);
    for attempt in 0..budget {
        for entry in page.find_all(selectors.print_menu_item).await? {
            let label = entry.text().await?;
            if label.trim_start().starts_with(format.menu_label()) {
                wait::pause(config.delays.settle).await;
                entry.scroll_into_view().await?;
                entry.click().await?;
                return Ok(());
            }
        }
        debug!(target = "fleetx", %format, attempt, "format entry not present yet");
        wait::pause(config.delays.element_retry).await;
    }
    Err(ExportError::Export(format!("no {format} entry in print-options menu")))
}

/// Waits for the download-progress channel to report completion, bounded
/// by a wall-clock deadline.
///
/// A single download emits many in-progress events, so the bound must be
/// elapsed time, never event count.
async fn await_download(
    watcher: &mut DownloadWatcher,
    format: ReportFormat,
    config: &ExporterConfig,
) -> Result<PathBuf> {
    let deadline = tokio::time::Instant::now() + config.timeout;
    loop {
        match tokio::time::timeout_at(deadline, watcher.next_event()).await {
            Ok(Some(event)) => match event.state {
                DownloadState::Completed => {
                    return Ok(finalize_download(&config.download_dir, &event.guid, format));
                }
                DownloadState::Canceled => {
                    return Err(ExportError::DownloadCancelled { guid: event.guid });
                }
                DownloadState::InProgress => {
                    debug!(target = "fleetx", guid = %event.guid, "download in progress");
                }
            },
            Ok(None) => {
                return Err(ExportError::Export("download channel closed before completion".into()));
            }
            Err(_) => {
                return Err(ExportError::Timeout {
                    ms: config.timeout.as_millis() as u64,
                    condition: "download completion".to_string(),
                });
            }
        }
    }
}

/// Renames the completed download to carry the format's extension.
///
/// The rename is best effort: the file under its engine-assigned name
/// already satisfies the export contract, so a failed rename only logs.
fn finalize_download(dir: &Path, guid: &str, format: ReportFormat) -> PathBuf {
    let original = dir.join(guid);
    let renamed = dir.join(format!("{guid}.{}", format.extension()));
    match std::fs::rename(&original, &renamed) {
        Ok(()) => renamed,
        Err(err) => {
            warn!(
                target = "fleetx",
                from = %original.display(),
                to = %renamed.display(),
                error = %err,
                "download rename failed, keeping original name"
            );
            original
        }
    }
}
