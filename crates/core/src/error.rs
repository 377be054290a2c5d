use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("download folder does not exist or is not a directory: {}", path.display())]
    DownloadFolder { path: PathBuf },

    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("login failed: {0}")]
    Login(String),

    #[error("navigation failed: {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("no report filter matched label: {label}")]
    FilterNotFound { label: String },

    #[error("filter field not found: {id}")]
    FieldNotFound { id: String },

    #[error("scheduled report not found: {name}")]
    ReportNotFound { name: String },

    #[error("export failed: {0}")]
    Export(String),

    #[error("download canceled by browser: {guid}")]
    DownloadCancelled { guid: String },

    #[error("timeout after {ms}ms waiting for: {condition}")]
    Timeout { ms: u64, condition: String },

    #[error("new browser target never appeared: {condition}")]
    TargetNotFound { condition: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("browser engine error: {0}")]
    Engine(String),
}

impl From<chromiumoxide::error::CdpError> for ExportError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ExportError::Engine(err.to_string())
    }
}
