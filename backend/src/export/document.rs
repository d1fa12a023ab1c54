//! A4 PDF export.
//!
//! Rendering happens in two passes. [`DocumentLayout::build`] flows the
//! snapshot into pages of positioned text cells and chart shapes (top-left
//! origin, millimetres), breaking pages and repeating table headers as
//! needed. The painter then replays the page model onto a `printpdf`
//! document. Tests inspect the page model without parsing the PDF.
//!
//! Text is set in the bundled DejaVu Sans faces. Characters those faces
//! cannot draw are replaced with `?` during layout and logged.

use std::collections::BTreeSet;

use chrono::Datelike;
use owned_ttf_parser::Face;
use printpdf::path::PaintMode;
use printpdf::{Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect, Rgb};

use super::{ExportFormat, ExportRenderer, RenderError};
use crate::api::{SegmentSummary, TimelineExportData, TimelineProduct};
use crate::services::format::{format_date, format_optional_date};

pub const DOCUMENT_TITLE: &str = "Timeline Siklus Hidup Produk";
pub const DOCUMENT_SUBTITLE: &str = "Analisis Timeline Produk Berdasarkan Segmen dan Waktu";
pub const CHART_TITLE: &str = "Grafik Timeline";
pub const EMPTY_NOTICE: &str = "Tidak ada data";
/// Stand-in for characters the bundled fonts have no glyph for.
pub const MISSING_GLYPH: char = '?';

const REGULAR_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
const BOLD_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_X_MM: f32 = 15.0;
const MARGIN_TOP_MM: f32 = 20.0;
const MARGIN_BOTTOM_MM: f32 = 20.0;
const FOOTER_Y_MM: f32 = PAGE_HEIGHT_MM - 10.0;

const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 9.0;
const TABLE_SIZE: f32 = 7.5;
const ROW_HEIGHT_MM: f32 = 5.5;

/// Average DejaVu Sans glyph width as a fraction of the font size.
const GLYPH_WIDTH_EM: f32 = 0.55;
const PT_TO_MM: f32 = 0.3528;

const CHART_GUTTER_MM: f32 = 14.0;
const CHART_PLOT_HEIGHT_MM: f32 = 60.0;
const CHART_AXIS_LABEL_MM: f32 = 9.0;
const CHART_LEGEND_ROW_MM: f32 = 5.0;
const CHART_MARKER_MM: f32 = 1.8;
const CHART_MAX_YEAR_LABELS: f32 = 15.0;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Ags", "Sep", "Okt", "Nov", "Des",
];

const AXIS_COLOR: ShapeColor = ShapeColor::rgb(0x9C, 0xA3, 0xAF);
const TEXT_COLOR: ShapeColor = ShapeColor::rgb(0x00, 0x00, 0x00);

const SEGMENT_COLUMNS: [(&str, f32); 5] = [
    ("No", 10.0),
    ("Segmen", 40.0),
    ("Total Produk", 22.0),
    ("Daftar Stage", 78.0),
    ("Rentang Tahun", 30.0),
];

const YEAR_COLUMNS: [(&str, f32); 5] = [
    ("No", 10.0),
    ("Tahun", 18.0),
    ("Total Produk", 22.0),
    ("Daftar Segmen", 65.0),
    ("Daftar Stage", 65.0),
];

const DETAIL_COLUMNS: [(&str, f32); 8] = [
    ("No", 10.0),
    ("ID", 14.0),
    ("Nama Produk", 38.0),
    ("Segmen", 26.0),
    ("Stage", 22.0),
    ("Tgl Stage", 22.0),
    ("Mulai", 24.0),
    ("Selesai", 24.0),
];

/// A run of text placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    pub text: String,
    /// Distance from the left page edge
    pub x_mm: f32,
    /// Baseline distance from the top page edge
    pub y_mm: f32,
    pub size: f32,
    pub bold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ShapeColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn to_pdf(self) -> Color {
        Color::Rgb(Rgb::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            None,
        ))
    }
}

/// Chart colour of a segment; segments without an assigned colour are grey.
pub fn segment_color(segment: &str) -> ShapeColor {
    match segment {
        "Pembangunan" => ShapeColor::rgb(0x06, 0xB6, 0xD4),
        "Transmisi" => ShapeColor::rgb(0x10, 0xB9, 0x81),
        "Distribusi" => ShapeColor::rgb(0xF5, 0x9E, 0x0B),
        "Korporat" => ShapeColor::rgb(0x8B, 0x5C, 0xF6),
        "Pelayanan Pelanggan" => ShapeColor::rgb(0xEF, 0x44, 0x44),
        _ => ShapeColor::rgb(0x6B, 0x72, 0x80),
    }
}

/// Vector graphics placed on a page, in the same coordinates as [`TextCell`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line {
        x1_mm: f32,
        y1_mm: f32,
        x2_mm: f32,
        y2_mm: f32,
        color: ShapeColor,
    },
    /// Filled square centred on a point
    Marker {
        x_mm: f32,
        y_mm: f32,
        size_mm: f32,
        color: ShapeColor,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPage {
    pub cells: Vec<TextCell>,
    pub shapes: Vec<Shape>,
}

impl DocumentPage {
    pub fn contains_text(&self, needle: &str) -> bool {
        self.cells.iter().any(|c| c.text.contains(needle))
    }

    pub fn markers(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|shape| matches!(shape, Shape::Marker { .. }))
    }

    fn is_blank(&self) -> bool {
        self.cells.is_empty() && self.shapes.is_empty()
    }
}

/// Paginated page model of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    /// Product total printed in the document header
    pub header_total: usize,
    pub pages: Vec<DocumentPage>,
}

impl DocumentLayout {
    pub fn build(data: &TimelineExportData) -> Self {
        let total = data.metadata.total_products;
        let mut flow = PageFlow::new();

        flow.line(DOCUMENT_TITLE, TITLE_SIZE, true);
        flow.line(DOCUMENT_SUBTITLE, BODY_SIZE, false);
        flow.line(&format!("Diekspor pada: {}", data.metadata.export_date), BODY_SIZE, false);
        flow.line(&format!("Total Produk: {}", total), BODY_SIZE, true);
        flow.line(
            &format!("Rentang Tanggal: {}", data.metadata.date_range),
            BODY_SIZE,
            false,
        );
        flow.gap(4.0);

        if data.is_empty() {
            flow.line(EMPTY_NOTICE, HEADING_SIZE, true);
        } else {
            flow.chart(&data.products, &data.summary_by_segment);

            flow.heading("Ringkasan per Segmen");
            let rows = data
                .summary_by_segment
                .iter()
                .enumerate()
                .map(|(idx, s)| {
                    vec![
                        (idx + 1).to_string(),
                        s.segment.clone(),
                        s.total_products.to_string(),
                        s.stages.join(", "),
                        s.year_range.clone(),
                    ]
                })
                .collect();
            flow.table(&SEGMENT_COLUMNS, rows);

            flow.heading("Ringkasan per Tahun");
            let rows = data
                .summary_by_year
                .iter()
                .enumerate()
                .map(|(idx, y)| {
                    vec![
                        (idx + 1).to_string(),
                        y.year.to_string(),
                        y.total_products.to_string(),
                        y.segments.join(", "),
                        y.stages.join(", "),
                    ]
                })
                .collect();
            flow.table(&YEAR_COLUMNS, rows);

            flow.heading("Detail Timeline");
            let rows = data
                .products
                .iter()
                .enumerate()
                .map(|(idx, p)| {
                    vec![
                        (idx + 1).to_string(),
                        p.id.to_string(),
                        p.name.clone(),
                        p.segment.clone(),
                        p.stage.clone(),
                        format_date(p.stage_date),
                        format_optional_date(p.stage_start),
                        format_optional_date(p.stage_end),
                    ]
                })
                .collect();
            flow.table(&DETAIL_COLUMNS, rows);
        }

        flow.heading("Metadata");
        flow.line(
            &format!(
                "Total Produk: {} | Rentang Data: {} | Total Segmen: {} | Total Tahun: {}",
                total,
                data.metadata.date_range,
                data.summary_by_segment.len(),
                data.summary_by_year.len()
            ),
            TABLE_SIZE,
            false,
        );

        let mut pages = flow.finish();
        let count = pages.len();
        for (idx, page) in pages.iter_mut().enumerate() {
            page.cells.push(TextCell {
                text: format!("Halaman {} dari {} | Total Produk: {}", idx + 1, count, total),
                x_mm: MARGIN_X_MM,
                y_mm: FOOTER_Y_MM,
                size: TABLE_SIZE,
                bold: false,
            });
        }

        Self {
            title: DOCUMENT_TITLE.to_string(),
            header_total: total,
            pages,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|p| p.contains_text(needle))
    }
}

/// Glyph lookup against the bundled regular and bold faces.
struct GlyphCoverage {
    faces: Vec<Face<'static>>,
}

impl GlyphCoverage {
    fn bundled() -> Self {
        let faces = [REGULAR_FONT, BOLD_FONT]
            .into_iter()
            .filter_map(|data| match Face::parse(data, 0) {
                Ok(face) => Some(face),
                Err(e) => {
                    log::warn!("Bundled font could not be parsed: {}", e);
                    None
                }
            })
            .collect();
        Self { faces }
    }

    fn covers(&self, ch: char) -> bool {
        self.faces.iter().all(|face| face.glyph_index(ch).is_some())
    }

    /// Replace every character without a glyph, recording it in `missing`.
    fn substitute(&self, text: &str, missing: &mut BTreeSet<char>) -> String {
        text.chars()
            .map(|ch| {
                if ch.is_control() {
                    ' '
                } else if self.covers(ch) {
                    ch
                } else {
                    missing.insert(ch);
                    MISSING_GLYPH
                }
            })
            .collect()
    }
}

/// Top-down text flow with page breaks.
struct PageFlow {
    finished: Vec<DocumentPage>,
    current: DocumentPage,
    y: f32,
    coverage: GlyphCoverage,
    missing: BTreeSet<char>,
}

impl PageFlow {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: DocumentPage::default(),
            y: MARGIN_TOP_MM,
            coverage: GlyphCoverage::bundled(),
            missing: BTreeSet::new(),
        }
    }

    fn break_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.finished.push(page);
        self.y = MARGIN_TOP_MM;
    }

    /// Start a new page when `height` no longer fits. Returns whether it did.
    fn reserve(&mut self, height: f32) -> bool {
        if self.y + height > PAGE_HEIGHT_MM - MARGIN_BOTTOM_MM && !self.current.is_blank() {
            self.break_page();
            return true;
        }
        false
    }

    fn gap(&mut self, height: f32) {
        self.y += height;
    }

    fn put(&mut self, text: &str, x_mm: f32, width_mm: f32, size: f32, bold: bool) {
        self.put_at(text, x_mm, self.y, width_mm, size, bold);
    }

    fn put_at(&mut self, text: &str, x_mm: f32, y_mm: f32, width_mm: f32, size: f32, bold: bool) {
        let drawable = self.coverage.substitute(text, &mut self.missing);
        self.current.cells.push(TextCell {
            text: fit_text(&drawable, width_mm, size),
            x_mm,
            y_mm,
            size,
            bold,
        });
    }

    fn shape(&mut self, shape: Shape) {
        self.current.shapes.push(shape);
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        let height = size * PT_TO_MM * 1.6;
        self.reserve(height);
        self.y += size * PT_TO_MM;
        self.put(text, MARGIN_X_MM, PAGE_WIDTH_MM - 2.0 * MARGIN_X_MM, size, bold);
        self.y += height - size * PT_TO_MM;
    }

    fn heading(&mut self, text: &str) {
        // Keep a heading together with its table header and first row.
        self.reserve(HEADING_SIZE * PT_TO_MM * 1.6 + 2.0 * ROW_HEIGHT_MM + 2.0);
        self.gap(2.0);
        self.line(text, HEADING_SIZE, true);
    }

    fn table_row(&mut self, columns: &[(&str, f32)], cells: &[String], bold: bool) {
        self.y += ROW_HEIGHT_MM;
        let mut x = MARGIN_X_MM;
        for ((_, width), text) in columns.iter().zip(cells) {
            self.put(text, x, *width, TABLE_SIZE, bold);
            x += width;
        }
    }

    fn table(&mut self, columns: &[(&str, f32)], rows: Vec<Vec<String>>) {
        let header: Vec<String> = columns.iter().map(|(t, _)| t.to_string()).collect();
        self.reserve(2.0 * ROW_HEIGHT_MM);
        self.table_row(columns, &header, true);

        for row in rows {
            if self.reserve(ROW_HEIGHT_MM) {
                self.table_row(columns, &header, true);
            }
            self.table_row(columns, &row, false);
        }
        self.gap(3.0);
    }

    /// Month by year scatter of the detail rows with a segment legend.
    ///
    /// Each segment gets one marker per month it has rows in; markers of
    /// different segments sharing a month sit side by side.
    fn chart(&mut self, products: &[TimelineProduct], segments: &[SegmentSummary]) {
        let years = products.iter().map(|p| p.stage_date.year());
        let (Some(min_year), Some(max_year)) = (years.clone().min(), years.max()) else {
            return;
        };

        let left = MARGIN_X_MM + CHART_GUTTER_MM;
        let right = PAGE_WIDTH_MM - MARGIN_X_MM;
        let legend = legend_layout(segments, right - left);
        let legend_lines = legend.last().map_or(0, |item| item.line + 1);
        let body = 2.0
            + CHART_PLOT_HEIGHT_MM
            + CHART_AXIS_LABEL_MM
            + legend_lines as f32 * CHART_LEGEND_ROW_MM;

        self.reserve(HEADING_SIZE * PT_TO_MM * 1.6 + 2.0 + body);
        self.gap(2.0);
        self.line(CHART_TITLE, HEADING_SIZE, true);

        let top = self.y + 2.0;
        let bottom = top + CHART_PLOT_HEIGHT_MM;
        let month_width = (right - left) / 12.0;
        let year_count = (max_year - min_year + 1) as f32;
        let year_height = CHART_PLOT_HEIGHT_MM / year_count;
        let year_y = |year: i32| top + (max_year - year) as f32 * year_height + year_height / 2.0;

        self.shape(Shape::Line {
            x1_mm: left,
            y1_mm: top,
            x2_mm: left,
            y2_mm: bottom,
            color: AXIS_COLOR,
        });
        self.shape(Shape::Line {
            x1_mm: left,
            y1_mm: bottom,
            x2_mm: right,
            y2_mm: bottom,
            color: AXIS_COLOR,
        });

        let label_step = ((year_count / CHART_MAX_YEAR_LABELS).ceil() as i32).max(1);
        for year in (min_year..=max_year).rev() {
            if (max_year - year) % label_step == 0 {
                let y = year_y(year) + 1.0;
                self.put_at(&year.to_string(), MARGIN_X_MM, y, CHART_GUTTER_MM, TABLE_SIZE, false);
            }
        }
        for (idx, label) in MONTH_LABELS.iter().enumerate() {
            let x = left + idx as f32 * month_width + month_width / 2.0 - 2.0;
            self.put_at(label, x, bottom + 4.0, month_width, TABLE_SIZE, false);
        }

        let mut points = BTreeSet::new();
        for row in products {
            if let Some(idx) = segments.iter().position(|s| s.segment == row.segment) {
                points.insert((idx, row.stage_date.year(), row.stage_date.month()));
            }
        }
        let spread = (month_width * 0.8 / segments.len().max(1) as f32).min(CHART_MARKER_MM * 1.5);
        let centre = (segments.len() as f32 - 1.0) / 2.0;
        for (idx, year, month) in points {
            self.shape(Shape::Marker {
                x_mm: left + (month as f32 - 0.5) * month_width + (idx as f32 - centre) * spread,
                y_mm: year_y(year),
                size_mm: CHART_MARKER_MM,
                color: segment_color(&segments[idx].segment),
            });
        }

        let legend_top = bottom + CHART_AXIS_LABEL_MM;
        for item in legend {
            let y = legend_top + item.line as f32 * CHART_LEGEND_ROW_MM;
            let x = left + item.x_mm;
            self.shape(Shape::Marker {
                x_mm: x + CHART_MARKER_MM / 2.0,
                y_mm: y - 1.0,
                size_mm: CHART_MARKER_MM,
                color: segment_color(item.label),
            });
            self.put_at(
                item.label,
                x + CHART_MARKER_MM + 1.5,
                y,
                item.width_mm,
                TABLE_SIZE,
                false,
            );
        }

        self.y = top + CHART_PLOT_HEIGHT_MM + CHART_AXIS_LABEL_MM
            + legend_lines as f32 * CHART_LEGEND_ROW_MM;
        self.gap(3.0);
    }

    fn finish(mut self) -> Vec<DocumentPage> {
        if !self.missing.is_empty() {
            let missing: String = self.missing.iter().collect();
            log::warn!(
                "Document fonts have no glyph for {:?}; drawn as '{}'",
                missing,
                MISSING_GLYPH
            );
        }
        if !self.current.is_blank() || self.finished.is_empty() {
            self.finished.push(self.current);
        }
        self.finished
    }
}

/// Legend entry placed `x_mm` from the plot's left edge on legend `line`.
struct LegendItem<'a> {
    label: &'a str,
    line: usize,
    x_mm: f32,
    /// Room for the label text
    width_mm: f32,
}

/// Flow legend entries left to right, wrapping at `width_mm`.
fn legend_layout(segments: &[SegmentSummary], width_mm: f32) -> Vec<LegendItem<'_>> {
    let glyph_mm = TABLE_SIZE * PT_TO_MM * GLYPH_WIDTH_EM;
    let mut items = Vec::with_capacity(segments.len());
    let (mut line, mut x) = (0, 0.0);

    for summary in segments {
        let label = summary.segment.as_str();
        let text_mm = label.chars().count() as f32 * glyph_mm + 2.0;
        let entry_mm = (CHART_MARKER_MM + 1.5 + text_mm).min(width_mm);
        if x > 0.0 && x + entry_mm > width_mm {
            line += 1;
            x = 0.0;
        }
        items.push(LegendItem {
            label,
            line,
            x_mm: x,
            width_mm: entry_mm - CHART_MARKER_MM - 1.5,
        });
        x += entry_mm + 5.0;
    }
    items
}

/// Truncate `text` with `..` so it fits `width_mm` at `size` points.
fn fit_text(text: &str, width_mm: f32, size: f32) -> String {
    let glyph_mm = size * PT_TO_MM * GLYPH_WIDTH_EM;
    let max_chars = ((width_mm - 1.0) / glyph_mm).floor().max(3.0) as usize;

    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars - 2).collect();
    format!("{}..", kept)
}

/// Renders [`TimelineExportData`] as an A4 PDF.
#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer;

impl DocumentRenderer {
    pub fn new() -> Self {
        Self
    }

    fn paint(&self, layout: &DocumentLayout) -> Result<Vec<u8>, RenderError> {
        let (doc, first_page, first_layer) = PdfDocument::new(
            layout.title.as_str(),
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let regular = doc
            .add_external_font(REGULAR_FONT)
            .map_err(RenderError::document)?;
        let bold = doc
            .add_external_font(BOLD_FONT)
            .map_err(RenderError::document)?;

        for (idx, page) in layout.pages.iter().enumerate() {
            let (page_idx, layer_idx) = if idx == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1")
            };
            let layer = doc.get_page(page_idx).get_layer(layer_idx);

            for shape in &page.shapes {
                paint_shape(&layer, shape);
            }
            layer.set_fill_color(TEXT_COLOR.to_pdf());

            for cell in &page.cells {
                let font: &IndirectFontRef = if cell.bold { &bold } else { &regular };
                layer.use_text(
                    cell.text.as_str(),
                    cell.size,
                    Mm(cell.x_mm),
                    Mm(PAGE_HEIGHT_MM - cell.y_mm),
                    font,
                );
            }
        }

        doc.save_to_bytes().map_err(RenderError::document)
    }
}

fn paint_shape(layer: &PdfLayerReference, shape: &Shape) {
    let at = |x_mm: f32, y_mm: f32| Point::new(Mm(x_mm), Mm(PAGE_HEIGHT_MM - y_mm));
    match *shape {
        Shape::Line {
            x1_mm,
            y1_mm,
            x2_mm,
            y2_mm,
            color,
        } => {
            layer.set_outline_color(color.to_pdf());
            layer.set_outline_thickness(0.5);
            layer.add_line(Line {
                points: vec![(at(x1_mm, y1_mm), false), (at(x2_mm, y2_mm), false)],
                is_closed: false,
            });
        }
        Shape::Marker {
            x_mm,
            y_mm,
            size_mm,
            color,
        } => {
            let half = size_mm / 2.0;
            layer.set_fill_color(color.to_pdf());
            layer.add_rect(
                Rect::new(
                    Mm(x_mm - half),
                    Mm(PAGE_HEIGHT_MM - y_mm - half),
                    Mm(x_mm + half),
                    Mm(PAGE_HEIGHT_MM - y_mm + half),
                )
                .with_mode(PaintMode::Fill),
            );
        }
    }
}

impl ExportRenderer for DocumentRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Document
    }

    fn render(&self, data: &TimelineExportData) -> Result<Vec<u8>, RenderError> {
        let layout = DocumentLayout::build(data);
        let bytes = self.paint(&layout)?;
        log::debug!(
            "Rendered timeline document: {} pages, {} bytes",
            layout.page_count(),
            bytes.len()
        );
        Ok(bytes)
    }
}
