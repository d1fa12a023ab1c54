//! XLSX workbook export.
//!
//! Sheets: `Timeline Detail` (every row, headed by the product totals),
//! `Summary by Segment`, `Summary by Year` and `Metadata`. Counts, ids and
//! years are written as numeric cells.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::{ExportFormat, ExportRenderer, RenderError};
use crate::api::TimelineExportData;
use crate::services::format::{format_date, format_optional_date, month_name};

pub const DETAIL_SHEET: &str = "Timeline Detail";
pub const SEGMENT_SHEET: &str = "Summary by Segment";
pub const YEAR_SHEET: &str = "Summary by Year";
pub const METADATA_SHEET: &str = "Metadata";

/// Row of the `Total Produk` line in the detail sheet (value in column 1).
pub const DETAIL_TOTAL_ROW: u32 = 0;
/// Row of the column headers in the detail sheet.
pub const DETAIL_HEADER_ROW: u32 = 3;

const DETAIL_COLUMNS: [(&str, f64); 11] = [
    ("No", 5.0),
    ("ID Produk", 10.0),
    ("Nama Produk", 25.0),
    ("Kategori", 15.0),
    ("Segmen", 15.0),
    ("Stage", 15.0),
    ("Tanggal Stage", 15.0),
    ("Tanggal Mulai Stage", 18.0),
    ("Tanggal Selesai Stage", 18.0),
    ("Tahun", 8.0),
    ("Bulan", 12.0),
];

const SEGMENT_COLUMNS: [(&str, f64); 6] = [
    ("No", 5.0),
    ("Segmen", 20.0),
    ("Total Produk", 12.0),
    ("Jumlah Stage", 12.0),
    ("Daftar Stage", 30.0),
    ("Rentang Tahun", 15.0),
];

const YEAR_COLUMNS: [(&str, f64); 7] = [
    ("No", 5.0),
    ("Tahun", 8.0),
    ("Total Produk", 12.0),
    ("Jumlah Segmen", 12.0),
    ("Daftar Segmen", 25.0),
    ("Jumlah Stage", 12.0),
    ("Daftar Stage", 25.0),
];

const METADATA_COLUMNS: [(&str, f64); 2] = [("Informasi", 20.0), ("Nilai", 30.0)];

/// Renders [`TimelineExportData`] as an Excel workbook.
#[derive(Debug, Clone, Default)]
pub struct SpreadsheetRenderer;

impl SpreadsheetRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ExportRenderer for SpreadsheetRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Spreadsheet
    }

    fn render(&self, data: &TimelineExportData) -> Result<Vec<u8>, RenderError> {
        let header = Format::new().set_bold();

        let mut workbook = Workbook::new();
        workbook.push_worksheet(detail_sheet(data, &header)?);
        workbook.push_worksheet(segment_sheet(data, &header)?);
        workbook.push_worksheet(year_sheet(data, &header)?);
        workbook.push_worksheet(metadata_sheet(data, &header)?);

        let bytes = workbook.save_to_buffer()?;
        log::debug!(
            "Rendered timeline workbook: {} rows, {} bytes",
            data.products.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn new_sheet(name: &str, columns: &[(&str, f64)], header_row: u32, header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(name)?;
    for (col, (title, width)) in columns.iter().enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, *width)?;
        sheet.write_string_with_format(header_row, col, *title, header)?;
    }
    sheet.set_freeze_panes(header_row + 1, 0)?;
    Ok(sheet)
}

fn detail_sheet(data: &TimelineExportData, header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = new_sheet(DETAIL_SHEET, &DETAIL_COLUMNS, DETAIL_HEADER_ROW, header)?;

    sheet.write_string_with_format(DETAIL_TOTAL_ROW, 0, "Total Produk", header)?;
    sheet.write_number(DETAIL_TOTAL_ROW, 1, data.metadata.total_products as f64)?;
    sheet.write_string_with_format(DETAIL_TOTAL_ROW + 1, 0, "Total Baris", header)?;
    sheet.write_number(DETAIL_TOTAL_ROW + 1, 1, data.metadata.total_rows as f64)?;

    for (idx, product) in data.products.iter().enumerate() {
        let row = DETAIL_HEADER_ROW + 1 + idx as u32;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_number(row, 1, product.id.value() as f64)?;
        sheet.write_string(row, 2, product.name.as_str())?;
        sheet.write_string(row, 3, product.category.as_str())?;
        sheet.write_string(row, 4, product.segment.as_str())?;
        sheet.write_string(row, 5, product.stage.as_str())?;
        sheet.write_string(row, 6, format_date(product.stage_date))?;
        sheet.write_string(row, 7, format_optional_date(product.stage_start))?;
        sheet.write_string(row, 8, format_optional_date(product.stage_end))?;
        sheet.write_number(row, 9, product.year() as f64)?;
        sheet.write_string(row, 10, month_name(product.bucket().month))?;
    }

    Ok(sheet)
}

fn segment_sheet(data: &TimelineExportData, header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = new_sheet(SEGMENT_SHEET, &SEGMENT_COLUMNS, 0, header)?;

    for (idx, segment) in data.summary_by_segment.iter().enumerate() {
        let row = 1 + idx as u32;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_string(row, 1, segment.segment.as_str())?;
        sheet.write_number(row, 2, segment.total_products as f64)?;
        sheet.write_number(row, 3, segment.stages.len() as f64)?;
        sheet.write_string(row, 4, segment.stages.join(", "))?;
        sheet.write_string(row, 5, segment.year_range.as_str())?;
    }

    Ok(sheet)
}

fn year_sheet(data: &TimelineExportData, header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = new_sheet(YEAR_SHEET, &YEAR_COLUMNS, 0, header)?;

    for (idx, year) in data.summary_by_year.iter().enumerate() {
        let row = 1 + idx as u32;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_number(row, 1, year.year as f64)?;
        sheet.write_number(row, 2, year.total_products as f64)?;
        sheet.write_number(row, 3, year.segments.len() as f64)?;
        sheet.write_string(row, 4, year.segments.join(", "))?;
        sheet.write_number(row, 5, year.stages.len() as f64)?;
        sheet.write_string(row, 6, year.stages.join(", "))?;
    }

    Ok(sheet)
}

fn metadata_sheet(data: &TimelineExportData, header: &Format) -> Result<Worksheet, XlsxError> {
    let mut sheet = new_sheet(METADATA_SHEET, &METADATA_COLUMNS, 0, header)?;
    let meta = &data.metadata;

    sheet.write_string(1, 0, "Total Produk")?;
    sheet.write_number(1, 1, meta.total_products as f64)?;
    sheet.write_string(2, 0, "Total Baris")?;
    sheet.write_number(2, 1, meta.total_rows as f64)?;
    sheet.write_string(3, 0, "Rentang Tanggal")?;
    sheet.write_string(3, 1, meta.date_range.as_str())?;
    sheet.write_string(4, 0, "Tanggal Export")?;
    sheet.write_string(4, 1, meta.export_date.as_str())?;
    sheet.write_string(5, 0, "Total Segmen")?;
    sheet.write_number(5, 1, data.summary_by_segment.len() as f64)?;
    sheet.write_string(6, 0, "Total Tahun")?;
    sheet.write_number(6, 1, data.summary_by_year.len() as f64)?;

    Ok(sheet)
}
