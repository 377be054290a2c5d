use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use fleetx::{Credentials, Exporter, ExporterConfig, ExporterOptions, ReportFormat};
use serde_json::json;
use tracing::info;

use crate::cli::{Cli, Command};

pub async fn dispatch(cli: Cli) -> Result<()> {
    let format: Option<ReportFormat> = cli.format.map(Into::into);
    let exporter = build_exporter(&cli)?;

    let (command_name, path) = match cli.command {
        Command::PartOrder { ref order_number } => (
            "part-order",
            exporter.export_part_order_print(order_number, format).await?,
        ),
        Command::Inventory => ("inventory", exporter.export_inventory_report(format).await?),
        Command::AssetList { ref filters } => (
            "asset-list",
            exporter.export_asset_list(&parse_filters(filters)?, format).await?,
        ),
        Command::WorkOrder { ref work_order_number } => (
            "work-order",
            exporter.export_work_order_details(work_order_number, format).await?,
        ),
        Command::WorkOrderCustomerPrint { ref work_order_number } => (
            "work-order-customer-print",
            exporter.export_work_order_customer_print(work_order_number, format).await?,
        ),
        Command::WorkOrderTechnicianPrint { ref work_order_number } => (
            "work-order-technician-print",
            exporter.export_work_order_technician_print(work_order_number, format).await?,
        ),
        Command::MessageLogger => ("message-logger", exporter.export_message_logger(format).await?),
        Command::Scheduled { ref schedule_name, ref filters } => (
            "scheduled",
            exporter
                .export_scheduled_report(schedule_name, &parse_filters(filters)?, format)
                .await?,
        ),
    };

    info!(target = "fleetx", command = command_name, path = %path.display(), "export complete");
    print_result(command_name, &path);
    Ok(())
}

fn build_exporter(cli: &Cli) -> Result<Exporter> {
    let options = ExporterOptions {
        download_folder: cli.download_dir.clone(),
        timeout: cli.timeout_ms.map(Duration::from_millis),
        show_browser_window: cli.show_browser,
        time_zone: Some(cli.time_zone.into()),
        delays: None,
    };
    let config = ExporterConfig::new(
        cli.base_url.clone(),
        Credentials {
            username: cli.username.clone(),
            password: cli.password.clone(),
        },
        options,
    )
    .context("invalid exporter configuration")?;
    Ok(Exporter::new(config))
}

/// Parses repeated `LABEL=VALUE` filter arguments.
fn parse_filters(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| match entry.split_once('=') {
            Some((label, value)) if !label.is_empty() => Ok((label.to_string(), value.to_string())),
            _ => bail!("invalid filter (expected LABEL=VALUE): {entry}"),
        })
        .collect()
}

fn print_result(command: &str, path: &Path) {
    let result = json!({
        "command": command,
        "path": path,
    });
    println!("{result}");
}
