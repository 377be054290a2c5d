use std::fmt;
use std::str::FromStr;

use crate::error::ExportError;

/// Output format of an exported report.
///
/// The target application's print-options menu lists each format by name;
/// the browser-assigned download name carries no extension, so the format
/// also decides the extension appended after download completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Pdf,
    Csv,
    Excel,
    Word,
}

impl ReportFormat {
    /// File extension appended to the completed download.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Csv => "csv",
            ReportFormat::Excel => "xlsx",
            ReportFormat::Word => "docx",
        }
    }

    /// Leading text of the matching print-options menu entry.
    pub fn menu_label(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "PDF",
            ReportFormat::Csv => "CSV",
            ReportFormat::Excel => "Excel",
            ReportFormat::Word => "Word",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.menu_label())
    }
}

impl FromStr for ReportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "csv" => Ok(ReportFormat::Csv),
            "excel" | "xlsx" => Ok(ReportFormat::Excel),
            "word" | "docx" => Ok(ReportFormat::Word),
            other => Err(ExportError::Export(format!("unknown report format: {other}"))),
        }
    }
}
