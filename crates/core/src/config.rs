use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::{ExportError, Result};

/// Waits below this are allowed but unlikely to survive the target
/// application's slow page settles.
pub const RECOMMENDED_MIN_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Login credentials for the tenant instance.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Time zone used as a report filter value.
///
/// The application exposes a fixed set of zones in its filter forms; the
/// filter value is the zone's display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZoneOption {
    #[default]
    Eastern,
    Central,
    Mountain,
    Pacific,
    Alaska,
    Hawaii,
    Arizona,
}

impl TimeZoneOption {
    pub fn as_filter_value(self) -> &'static str {
        match self {
            TimeZoneOption::Eastern => "Eastern",
            TimeZoneOption::Central => "Central",
            TimeZoneOption::Mountain => "Mountain",
            TimeZoneOption::Pacific => "Pacific",
            TimeZoneOption::Alaska => "Alaska",
            TimeZoneOption::Hawaii => "Hawaii",
            TimeZoneOption::Arizona => "Arizona",
        }
    }
}

/// Tunable pauses used throughout the pipeline.
///
/// The target application's reactive forms re-render between field fills
/// and the browser reports download completion out-of-band, so every wait
/// here is a policy knob rather than a semantic constant.
#[derive(Debug, Clone)]
pub struct Delays {
    /// Fixed pause letting a reactive page stabilize before the next action.
    pub settle: Duration,
    /// Interval between new-target discovery polls.
    pub poll_interval: Duration,
    /// Interval between element-lookup retries.
    pub element_retry: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            poll_interval: Duration::from_secs(1),
            element_retry: Duration::from_millis(250),
        }
    }
}

/// Recognized construction options, all optional.
#[derive(Debug, Clone, Default)]
pub struct ExporterOptions {
    pub download_folder: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub show_browser_window: bool,
    pub time_zone: Option<TimeZoneOption>,
    pub delays: Option<Delays>,
}

/// Immutable-after-construction configuration handed to every pipeline stage.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Base URL of the tenant's application instance.
    pub base_url: String,
    pub credentials: Credentials,
    /// Folder the browser saves downloads into. Validated eagerly.
    pub download_dir: PathBuf,
    /// Governs every navigation, element and download wait.
    pub timeout: Duration,
    /// Disables headless mode when true.
    pub show_browser_window: bool,
    pub time_zone: TimeZoneOption,
    pub delays: Delays,
}

impl ExporterConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials, options: ExporterOptions) -> Result<Self> {
        let download_dir = options.download_folder.unwrap_or_else(std::env::temp_dir);
        validate_download_dir(&download_dir)?;

        let timeout = options.timeout.unwrap_or(DEFAULT_TIMEOUT);
        warn_if_short(timeout);

        Ok(Self {
            base_url: base_url.into(),
            credentials,
            download_dir,
            timeout,
            show_browser_window: options.show_browser_window,
            time_zone: options.time_zone.unwrap_or_default(),
            delays: options.delays.unwrap_or_default(),
        })
    }

    /// Points downloads at a new folder, which must already exist.
    pub fn set_download_folder(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        validate_download_dir(&path)?;
        self.download_dir = path;
        Ok(())
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        warn_if_short(timeout);
        self.timeout = timeout;
    }

    pub fn show_browser_window(&mut self, show: bool) {
        self.show_browser_window = show;
    }

    pub fn set_time_zone(&mut self, time_zone: TimeZoneOption) {
        self.time_zone = time_zone;
    }
}

fn validate_download_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ExportError::DownloadFolder { path: path.to_path_buf() })
    }
}

fn warn_if_short(timeout: Duration) {
    if timeout < RECOMMENDED_MIN_TIMEOUT {
        warn!(
            target = "fleetx",
            timeout_ms = timeout.as_millis() as u64,
            floor_ms = RECOMMENDED_MIN_TIMEOUT.as_millis() as u64,
            "timeout below recommended floor; report pages are slow to settle"
        );
    }
}
