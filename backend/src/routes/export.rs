use serde::{Deserialize, Serialize};

use super::timeline::TimelineProduct;

// =========================================================
// Timeline export types
// =========================================================

/// Totals for one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    #[serde(rename = "segmen")]
    pub segment: String,
    /// Distinct products in the segment
    pub total_products: usize,
    /// Distinct stage names, sorted
    pub stages: Vec<String>,
    /// `"2021 - 2024"`, or a single year
    pub year_range: String,
}

/// Totals for one calendar year of `stage_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: i32,
    /// Distinct products with a stage occurrence in the year
    pub total_products: usize,
    pub segments: Vec<String>,
    pub stages: Vec<String>,
}

/// Export header information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Distinct products across all rows
    pub total_products: usize,
    /// Timeline rows (one per product and stage)
    pub total_rows: usize,
    pub date_range: String,
    pub export_date: String,
}

/// Immutable snapshot consumed by every export renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineExportData {
    pub products: Vec<TimelineProduct>,
    pub summary_by_segment: Vec<SegmentSummary>,
    pub summary_by_year: Vec<YearSummary>,
    pub metadata: ExportMetadata,
}

impl TimelineExportData {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Route function names for the two downloads
pub const EXPORT_TIMELINE_SPREADSHEET: &str = "export_timeline_spreadsheet";
pub const EXPORT_TIMELINE_DOCUMENT: &str = "export_timeline_document";
