//! Browser-driven report exporter for a server-rendered fleet-management
//! web application.
//!
//! The application only exposes its reports through a client-side
//! print/export UI, so every export drives a real browser end to end:
//! login, report-viewer navigation, filter-form population, and the
//! print-options menu, then captures the resulting download off the
//! browser's download-progress channel.
//!
//! The pipeline is written against the capability traits in [`engine`];
//! [`engine::chrome`] binds them to chromiumoxide (CDP). Each export call
//! owns one browser instance that is closed when the call returns,
//! success or failure.
//!
//! ```ignore
//! use fleetx::{Credentials, Exporter, ExporterConfig, ExporterOptions, ReportFormat};
//!
//! let config = ExporterConfig::new(
//!     "https://fleet.example.com/",
//!     Credentials { username: "ops".into(), password: "secret".into() },
//!     ExporterOptions { download_folder: Some("/tmp/reports".into()), ..Default::default() },
//! )?;
//! let exporter = Exporter::new(config);
//! let path = exporter.export_part_order_print("12345", Some(ReportFormat::Pdf)).await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod exporter;
pub mod filters;
pub mod format;
pub mod navigate;
pub mod selectors;
pub mod session;
pub mod wait;
pub mod work_order;

pub use config::{Credentials, Delays, ExporterConfig, ExporterOptions, TimeZoneOption};
pub use error::{ExportError, Result};
pub use exporter::Exporter;
pub use format::ReportFormat;
pub use navigate::ReportRequest;
pub use selectors::Selectors;
pub use session::Session;
