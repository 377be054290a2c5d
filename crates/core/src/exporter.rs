//! Public exporter facade: one operation per report type.
//!
//! Every operation owns exactly one browser for its duration. The generic
//! runners below pair session acquisition with unconditional teardown so
//! no failure path can leak a browser process; the facade methods bind
//! them to the chromiumoxide engine.

use std::path::PathBuf;

use tracing::debug;

use crate::config::{ExporterConfig, TimeZoneOption};
use crate::engine::Browser;
use crate::engine::chrome::ChromeBrowser;
use crate::error::Result;
use crate::export;
use crate::filters;
use crate::format::ReportFormat;
use crate::navigate::{self, ReportRequest};
use crate::selectors::Selectors;
use crate::session::Session;
use crate::work_order;

/// Label fragment of the time-zone filter field on report filter forms.
const TIME_ZONE_LABEL: &str = "Time Zone";

/// Browser-driven report exporter for one tenant instance.
pub struct Exporter {
    config: ExporterConfig,
    selectors: Selectors,
}

impl Exporter {
    pub fn new(config: ExporterConfig) -> Self {
        Self {
            config,
            selectors: Selectors::default(),
        }
    }

    /// Overrides the selector table, e.g. after a target-application
    /// markup change.
    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn config(&self) -> &ExporterConfig {
        &self.config
    }

    pub fn set_download_folder(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        self.config.set_download_folder(path)
    }

    pub fn set_timeout(&mut self, timeout: std::time::Duration) {
        self.config.set_timeout(timeout);
    }

    pub fn show_browser_window(&mut self, show: bool) {
        self.config.show_browser_window(show);
    }

    pub fn set_time_zone(&mut self, time_zone: TimeZoneOption) {
        self.config.set_time_zone(time_zone);
    }

    /// Exports the print view of a part order.
    pub async fn export_part_order_print(&self, order_number: &str, format: Option<ReportFormat>) -> Result<PathBuf> {
        let request = ReportRequest::new("PartOrderPrint")
            .with_param("module", "parts")
            .with_param("ordernum", order_number);
        self.run(request, format).await
    }

    /// Exports the current inventory report.
    pub async fn export_inventory_report(&self, format: Option<ReportFormat>) -> Result<PathBuf> {
        let request = ReportRequest::new("InventoryReport").with_param("module", "parts");
        self.run(request, format).await
    }

    /// Exports the asset list, filtered by the given label/value pairs.
    /// The configured time zone is applied as an additional filter.
    pub async fn export_asset_list(&self, filters: &[(String, String)], format: Option<ReportFormat>) -> Result<PathBuf> {
        let mut request = ReportRequest::new("AssetList").with_param("module", "assets");
        for (label, value) in filters {
            request = request.with_filter(label, value);
        }
        request = request.with_filter(TIME_ZONE_LABEL, self.config.time_zone.as_filter_value());
        self.run(request, format).await
    }

    /// Exports the details report of a single work order.
    pub async fn export_work_order_details(&self, work_order_number: &str, format: Option<ReportFormat>) -> Result<PathBuf> {
        let request = ReportRequest::new("WorkOrderDetails")
            .with_param("module", "workorders")
            .with_param("workorder", work_order_number);
        self.run(request, format).await
    }

    /// Exports the customer-facing print of a work order.
    pub async fn export_work_order_customer_print(
        &self,
        work_order_number: &str,
        format: Option<ReportFormat>,
    ) -> Result<PathBuf> {
        let browser = ChromeBrowser::launch(&self.config).await?;
        run_work_order_print(
            browser,
            &self.config,
            &self.selectors,
            work_order_number,
            self.selectors.work_order_customer_print,
            format.unwrap_or_default(),
        )
        .await
    }

    /// Exports the technician print of a work order.
    pub async fn export_work_order_technician_print(
        &self,
        work_order_number: &str,
        format: Option<ReportFormat>,
    ) -> Result<PathBuf> {
        let browser = ChromeBrowser::launch(&self.config).await?;
        run_work_order_print(
            browser,
            &self.config,
            &self.selectors,
            work_order_number,
            self.selectors.work_order_technician_print,
            format.unwrap_or_default(),
        )
        .await
    }

    /// Exports the message logger report.
    pub async fn export_message_logger(&self, format: Option<ReportFormat>) -> Result<PathBuf> {
        let request = ReportRequest::new("MessageLogger").with_param("module", "admin");
        self.run(request, format).await
    }

    /// Exports a report configured under `schedule_name` in the
    /// scheduled-reports table, applying `filters` in its parameter
    /// dialog. Generic fallback for reports without a dedicated method.
    pub async fn export_scheduled_report(
        &self,
        schedule_name: &str,
        filters: &[(String, String)],
        format: Option<ReportFormat>,
    ) -> Result<PathBuf> {
        let mut all_filters: Vec<(String, String)> = filters.to_vec();
        all_filters.push((
            TIME_ZONE_LABEL.to_string(),
            self.config.time_zone.as_filter_value().to_string(),
        ));

        let browser = ChromeBrowser::launch(&self.config).await?;
        run_scheduled_export(
            browser,
            &self.config,
            &self.selectors,
            schedule_name,
            all_filters,
            format.unwrap_or_default(),
        )
        .await
    }

    async fn run(&self, request: ReportRequest, format: Option<ReportFormat>) -> Result<PathBuf> {
        let browser = ChromeBrowser::launch(&self.config).await?;
        run_report_export(browser, &self.config, &self.selectors, request, format.unwrap_or_default()).await
    }
}

/// Acquires a session, opens the report viewer for `request`, exports it,
/// and tears the browser down on every path.
pub async fn run_report_export<B: Browser>(
    browser: B,
    config: &ExporterConfig,
    selectors: &Selectors,
    request: ReportRequest,
    format: ReportFormat,
) -> Result<PathBuf> {
    let session = Session::acquire(browser, config, selectors).await?;
    let result = async {
        navigate::navigate_to_report(&session, config, selectors, &request).await?;
        export::export_report(session.browser(), session.page(), format, config, selectors).await
    }
    .await;
    resolve_teardown(result, session.close().await)
}

/// Work-order variant of [`run_report_export`], exporting from the new
/// tab the print link opens.
pub async fn run_work_order_print<B: Browser>(
    browser: B,
    config: &ExporterConfig,
    selectors: &Selectors,
    work_order_number: &str,
    print_selector: &str,
    format: ReportFormat,
) -> Result<PathBuf> {
    let mut session = Session::acquire(browser, config, selectors).await?;
    let result = work_order::print_work_order(&mut session, work_order_number, print_selector, format, config, selectors).await;
    resolve_teardown(result, session.close().await)
}

/// Scheduled-report variant of [`run_report_export`]: table lookup by
/// schedule name, parameter dialog, then the common filter/export path.
pub async fn run_scheduled_export<B: Browser>(
    browser: B,
    config: &ExporterConfig,
    selectors: &Selectors,
    schedule_name: &str,
    filters: Vec<(String, String)>,
    format: ReportFormat,
) -> Result<PathBuf> {
    let session = Session::acquire(browser, config, selectors).await?;
    let result = async {
        navigate::open_scheduled_report(&session, config, selectors, schedule_name).await?;
        if !filters.is_empty() {
            filters::apply_filters(session.page(), &filters, config, selectors).await?;
        }
        export::export_report(session.browser(), session.page(), format, config, selectors).await
    }
    .await;
    resolve_teardown(result, session.close().await)
}

/// Combines a flow result with the teardown result. The flow error wins;
/// a close failure after a successful flow is still a failure.
fn resolve_teardown(result: Result<PathBuf>, close_result: Result<()>) -> Result<PathBuf> {
    match result {
        Ok(path) => close_result.map(|_| path),
        Err(err) => {
            if let Err(close_err) = close_result {
                debug!(target = "fleetx", error = %close_err, "browser close after failed export");
            }
            Err(err)
        }
    }
}
