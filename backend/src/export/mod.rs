//! Binary exports of the lifecycle timeline.
//!
//! Both renderers consume the same [`TimelineExportData`] snapshot and never
//! touch the repository or recompute aggregates, so the spreadsheet and the
//! document always report identical totals.
//!
//! ```text
//!                    ┌──────────────────────────┐
//!                    │   TimelineExportData     │
//!                    │  (rows + summaries +     │
//!                    │   metadata, immutable)   │
//!                    └────────────┬─────────────┘
//!                 ┌───────────────┴───────────────┐
//!     ┌───────────▼──────────┐        ┌───────────▼──────────┐
//!     │ SpreadsheetRenderer  │        │   DocumentRenderer   │
//!     │ (rust_xlsxwriter)    │        │   (printpdf)         │
//!     └──────────────────────┘        └──────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::api::TimelineExportData;

pub mod document;
pub mod spreadsheet;

pub use document::{DocumentLayout, DocumentRenderer};
pub use spreadsheet::SpreadsheetRenderer;

/// Prefix of every download filename.
pub const EXPORT_FILE_STEM: &str = "Timeline_Siklus_Hidup";

/// Error raised while serializing an export.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Document rendering failed: {0}")]
    Document(String),
}

impl RenderError {
    pub fn document(message: impl ToString) -> Self {
        Self::Document(message.to_string())
    }
}

/// Supported download formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Excel workbook (.xlsx)
    Spreadsheet,
    /// PDF document (.pdf)
    Document,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Document => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Document => "pdf",
        }
    }

    /// `Timeline_Siklus_Hidup_<YYYY-MM-DD>.<ext>`
    pub fn filename(&self, date: NaiveDate) -> String {
        format!(
            "{}_{}.{}",
            EXPORT_FILE_STEM,
            date.format("%Y-%m-%d"),
            self.extension()
        )
    }

    pub fn renderer(&self) -> Box<dyn ExportRenderer> {
        match self {
            Self::Spreadsheet => Box::new(SpreadsheetRenderer::new()),
            Self::Document => Box::new(DocumentRenderer::new()),
        }
    }
}

/// A serialization strategy over the shared export snapshot.
pub trait ExportRenderer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn render(&self, data: &TimelineExportData) -> Result<Vec<u8>, RenderError>;
}
