//! Work-order print flow.
//!
//! Unlike the other reports, work-order prints are reached from an
//! in-page print link on the detail page. The click opens the report
//! viewer in a new browser target, which must be discovered and brought
//! to front before export capture can proceed.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::ExporterConfig;
use crate::engine::{Browser, Element, Page};
use crate::error::Result;
use crate::export;
use crate::format::ReportFormat;
use crate::navigate;
use crate::selectors::Selectors;
use crate::session::Session;
use crate::wait;

/// Clicks a print link on the work-order detail page, hands the freshly
/// opened report-viewer tab to export capture, and resolves with the
/// downloaded path. Customer and technician prints differ only in
/// `print_selector`.
pub async fn print_work_order<B: Browser>(
    session: &mut Session<B>,
    work_order_number: &str,
    print_selector: &str,
    format: ReportFormat,
    config: &ExporterConfig,
    selectors: &Selectors,
) -> Result<PathBuf> {
    let url = navigate::work_order_url(&config.base_url, work_order_number)?;
    info!(target = "fleetx", work_order = %work_order_number, %url, "opening work order");

    let page = session.page();
    page.goto(&url, config.timeout).await?;
    page.wait_for_idle(config.timeout).await?;

    let link = wait::find_with_retry(page, print_selector, config.timeout, config.delays.element_retry).await?;
    link.click().await?;

    let viewer = wait::wait_for_new_page(
        session.browser(),
        selectors.report_viewer_path,
        config.timeout,
        config.delays.poll_interval,
    )
    .await?;
    viewer.bring_to_front().await?;
    debug!(target = "fleetx", "report viewer tab focused");

    session.set_page(viewer);
    export::export_report(session.browser(), session.page(), format, config, selectors).await
}
