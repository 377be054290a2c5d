//! Report navigation: URL construction, report-viewer load, scheduled
//! report lookup.

use tracing::{debug, info};
use url::Url;

use crate::config::ExporterConfig;
use crate::engine::{Browser, Element, Page};
use crate::error::{ExportError, Result};
use crate::filters;
use crate::selectors::Selectors;
use crate::session::Session;
use crate::wait;

const REPORT_VIEWER_PAGE: &str = "reportviewer.aspx";
const SCHEDULED_REPORTS_PAGE: &str = "scheduledreports.aspx";
const WORK_ORDER_DETAIL_PAGE: &str = "workorders/detail.aspx";

/// Immutable description of one report to open.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Identifies the server-side report.
    pub key: String,
    /// Additional report-viewer query parameters.
    pub params: Vec<(String, String)>,
    /// Human-readable filter label fragments mapped to fill values,
    /// applied in order.
    pub filters: Vec<(String, String)>,
}

impl ReportRequest {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_filter(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((label.into(), value.into()));
        self
    }
}

/// Builds the report-viewer URL for a request.
pub fn report_url(base_url: &str, request: &ReportRequest) -> Result<String> {
    let mut url = join(base_url, REPORT_VIEWER_PAGE)?;
    url.query_pairs_mut().append_pair("report", &request.key);
    for (name, value) in &request.params {
        url.query_pairs_mut().append_pair(name, value);
    }
    Ok(url.into())
}

/// Builds the detail-page URL for a work order.
pub fn work_order_url(base_url: &str, work_order_number: &str) -> Result<String> {
    let mut url = join(base_url, WORK_ORDER_DETAIL_PAGE)?;
    url.query_pairs_mut().append_pair("workorder", work_order_number);
    Ok(url.into())
}

fn join(base_url: &str, page: &str) -> Result<Url> {
    let base = Url::parse(base_url)?;
    Ok(base.join(page)?)
}

/// Opens the report viewer for `request` and applies its filters.
pub async fn navigate_to_report<B: Browser>(
    session: &Session<B>,
    config: &ExporterConfig,
    selectors: &Selectors,
    request: &ReportRequest,
) -> Result<()> {
    let url = report_url(&config.base_url, request)?;
    info!(target = "fleetx", report = %request.key, %url, "opening report viewer");

    let page = session.page();
    page.goto(&url, config.timeout).await?;
    wait::pause(config.delays.settle).await;
    page.wait_for_idle(config.timeout).await?;

    if !request.filters.is_empty() {
        filters::apply_filters(page, &request.filters, config, selectors).await?;
    }
    Ok(())
}

/// Finds a scheduled report by its configured schedule name in the
/// scheduled-reports table and opens its parameter dialog.
pub async fn open_scheduled_report<B: Browser>(
    session: &Session<B>,
    config: &ExporterConfig,
    selectors: &Selectors,
    schedule_name: &str,
) -> Result<()> {
    let url = join(&config.base_url, SCHEDULED_REPORTS_PAGE)?;
    let page = session.page();
    page.goto(url.as_str(), config.timeout).await?;
    page.wait_for_idle(config.timeout).await?;

    // Make sure the table has rendered before scanning rows.
    wait::find_with_retry(page, selectors.scheduled_report_row, config.timeout, config.delays.element_retry).await?;

    let rows = page.find_all(selectors.scheduled_report_row).await?;
    for row in rows {
        let text = row.text().await?;
        if text.contains(schedule_name) {
            debug!(target = "fleetx", schedule = %schedule_name, row = %text.trim(), "opening scheduled report");
            row.click().await?;
            wait::pause(config.delays.settle).await;
            page.wait_for_idle(config.timeout).await?;
            return Ok(());
        }
    }
    Err(ExportError::ReportNotFound { name: schedule_name.to_string() })
}
