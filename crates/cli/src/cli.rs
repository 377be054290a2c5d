use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fleetx::{ReportFormat, TimeZoneOption};

/// Export reports from the fleet-management application through a
/// headless browser.
#[derive(Debug, Parser)]
#[command(name = "fleetx", version, about)]
pub struct Cli {
    /// Base URL of the tenant's application instance
    #[arg(long, env = "FLEETX_BASE_URL", value_name = "URL")]
    pub base_url: String,

    /// Login user name
    #[arg(long, env = "FLEETX_USERNAME", value_name = "USER")]
    pub username: String,

    /// Login password
    #[arg(long, env = "FLEETX_PASSWORD", value_name = "PASS", hide_env_values = true)]
    pub password: String,

    /// Folder downloads are saved into (must exist)
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Timeout applied to every navigation and wait, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    pub show_browser: bool,

    /// Time zone applied as a report filter value
    #[arg(long, value_enum, default_value_t = TimeZoneArg::Eastern)]
    pub time_zone: TimeZoneArg,

    /// Output format of the exported report
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export the print view of a part order
    PartOrder {
        order_number: String,
    },
    /// Export the current inventory report
    Inventory,
    /// Export the asset list
    AssetList {
        /// Filter as LABEL=VALUE, repeatable
        #[arg(long = "filter", value_name = "LABEL=VALUE")]
        filters: Vec<String>,
    },
    /// Export the details report of a work order
    WorkOrder {
        work_order_number: String,
    },
    /// Export the customer-facing print of a work order
    WorkOrderCustomerPrint {
        work_order_number: String,
    },
    /// Export the technician print of a work order
    WorkOrderTechnicianPrint {
        work_order_number: String,
    },
    /// Export the message logger report
    MessageLogger,
    /// Export a report by its configured schedule name
    Scheduled {
        schedule_name: String,
        /// Parameter-dialog filter as LABEL=VALUE, repeatable
        #[arg(long = "filter", value_name = "LABEL=VALUE")]
        filters: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Pdf,
    Csv,
    Excel,
    Word,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => ReportFormat::Pdf,
            FormatArg::Csv => ReportFormat::Csv,
            FormatArg::Excel => ReportFormat::Excel,
            FormatArg::Word => ReportFormat::Word,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TimeZoneArg {
    Eastern,
    Central,
    Mountain,
    Pacific,
    Alaska,
    Hawaii,
    Arizona,
}

impl From<TimeZoneArg> for TimeZoneOption {
    fn from(arg: TimeZoneArg) -> Self {
        match arg {
            TimeZoneArg::Eastern => TimeZoneOption::Eastern,
            TimeZoneArg::Central => TimeZoneOption::Central,
            TimeZoneArg::Mountain => TimeZoneOption::Mountain,
            TimeZoneArg::Pacific => TimeZoneOption::Pacific,
            TimeZoneArg::Alaska => TimeZoneOption::Alaska,
            TimeZoneArg::Hawaii => TimeZoneOption::Hawaii,
            TimeZoneArg::Arizona => TimeZoneOption::Arizona,
        }
    }
}
