//! The spreadsheet and PDF downloads must report the same product total.

mod support;

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use lifecycle_timeline::api::{Product, StageId, TimelineExportData};
use lifecycle_timeline::db::LocalRepository;
use lifecycle_timeline::export::spreadsheet::{
    DETAIL_HEADER_ROW, DETAIL_SHEET, DETAIL_TOTAL_ROW, METADATA_SHEET, SEGMENT_SHEET, YEAR_SHEET,
};
use lifecycle_timeline::export::document::CHART_TITLE;
use lifecycle_timeline::export::{
    DocumentLayout, DocumentRenderer, ExportFormat, ExportRenderer, SpreadsheetRenderer,
};
use lifecycle_timeline::services::{export_timeline, get_timeline_export_data};
use support::{seeded_repository, ts};

fn workbook(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    open_workbook_from_rs(Cursor::new(bytes)).unwrap()
}

fn spreadsheet_total(data: &TimelineExportData) -> f64 {
    let bytes = SpreadsheetRenderer::new().render(data).unwrap();
    let range = workbook(bytes).worksheet_range(DETAIL_SHEET).unwrap();
    match range.get_value((DETAIL_TOTAL_ROW, 1)) {
        Some(Data::Float(total)) => *total,
        other => panic!("unexpected total cell {:?}", other),
    }
}

/// Glyph id to character table from a font's `ToUnicode` CMap.
fn to_unicode(doc: &lopdf::Document, font: &lopdf::Dictionary) -> HashMap<u16, char> {
    let id = font
        .get(b"ToUnicode")
        .and_then(lopdf::Object::as_reference)
        .unwrap();
    let stream = doc
        .get_object(id)
        .and_then(lopdf::Object::as_stream)
        .unwrap();
    let raw = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let mut map = HashMap::new();
    let mut in_block = false;
    for line in String::from_utf8_lossy(&raw).lines() {
        let line = line.trim();
        if line.ends_with("beginbfchar") {
            in_block = true;
        } else if line == "endbfchar" {
            in_block = false;
        } else if in_block {
            let mut hex = line
                .split_whitespace()
                .map(|part| part.trim_matches(|c| c == '<' || c == '>'));
            if let (Some(gid), Some(code)) = (hex.next(), hex.next()) {
                let gid = u16::from_str_radix(gid, 16).unwrap();
                let ch = u32::from_str_radix(code, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap();
                map.insert(gid, ch);
            }
        }
    }
    map
}

/// Text shown on each page, one line per text operation.
fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = lopdf::Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let fonts: HashMap<Vec<u8>, HashMap<u16, char>> = doc
                .get_page_fonts(page_id)
                .into_iter()
                .map(|(name, font)| (name, to_unicode(&doc, font)))
                .collect();
            let content = doc.get_and_decode_page_content(page_id).unwrap();

            let mut current = Vec::new();
            let mut text = String::new();
            for op in content.operations {
                match op.operator.as_str() {
                    "Tf" => current = op.operands[0].as_name().unwrap().to_vec(),
                    "Tj" => {
                        let glyphs = &fonts[&current];
                        for pair in op.operands[0].as_str().unwrap().chunks(2) {
                            let gid = u16::from_be_bytes([pair[0], pair[1]]);
                            text.push(glyphs.get(&gid).copied().unwrap_or('\u{FFFD}'));
                        }
                        text.push('\n');
                    }
                    _ => {}
                }
            }
            text
        })
        .collect()
}

#[tokio::test]
async fn test_spreadsheet_and_document_totals_agree() {
    let data = get_timeline_export_data(&seeded_repository()).await.unwrap();
    let layout = DocumentLayout::build(&data);

    assert_eq!(spreadsheet_total(&data), layout.header_total as f64);
    assert_eq!(layout.header_total, data.metadata.total_products);
    assert!(layout.contains_text(&format!("Total Produk: {}", data.metadata.total_products)));
}

#[tokio::test]
async fn test_workbook_layout() {
    let data = get_timeline_export_data(&seeded_repository()).await.unwrap();
    let bytes = SpreadsheetRenderer::new().render(&data).unwrap();
    let mut book = workbook(bytes);

    assert_eq!(
        book.sheet_names(),
        vec![DETAIL_SHEET, SEGMENT_SHEET, YEAR_SHEET, METADATA_SHEET]
    );

    let detail = book.worksheet_range(DETAIL_SHEET).unwrap();
    let first_row = DETAIL_HEADER_ROW + 1;
    let last_row = DETAIL_HEADER_ROW + data.products.len() as u32;
    assert!(detail.get_value((last_row, 0)).is_some());
    assert!(detail.get_value((last_row + 1, 0)).is_none());
    assert_eq!(
        detail.get_value((first_row, 2)),
        Some(&Data::String(data.products[0].name.clone()))
    );

    let segments = book.worksheet_range(SEGMENT_SHEET).unwrap();
    assert_eq!(segments.height(), 1 + data.summary_by_segment.len());
}

#[tokio::test]
async fn test_document_page_count_matches_layout() {
    let data = get_timeline_export_data(&seeded_repository()).await.unwrap();
    let layout = DocumentLayout::build(&data);
    let bytes = DocumentRenderer::new().render(&data).unwrap();

    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(document.get_pages().len(), layout.page_count());
}

#[tokio::test]
async fn test_large_export_paginates_consistently() {
    let repo = seeded_repository();
    for id in 100..260 {
        repo.add_product(Product::new(
            id,
            format!("Produk {}", id),
            "Aset",
            "Distribusi",
            Some(StageId(4)),
            ts(2021, 1 + (id % 12) as u32, 1),
        ));
    }
    let data = get_timeline_export_data(&repo).await.unwrap();
    let layout = DocumentLayout::build(&data);
    assert!(layout.page_count() > 1);
    assert!(layout
        .pages
        .iter()
        .all(|page| page.contains_text(&format!("Total Produk: {}", data.metadata.total_products))));

    let bytes = DocumentRenderer::new().render(&data).unwrap();
    let document = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(document.get_pages().len(), layout.page_count());
    assert_eq!(spreadsheet_total(&data), layout.header_total as f64);
}

#[tokio::test]
async fn test_empty_exports_are_valid_files() {
    let repo = LocalRepository::new();

    let sheet = export_timeline(&repo, ExportFormat::Spreadsheet).await.unwrap();
    let range = workbook(sheet.bytes).worksheet_range(DETAIL_SHEET).unwrap();
    assert_eq!(range.get_value((DETAIL_TOTAL_ROW, 1)), Some(&Data::Float(0.0)));

    let pdf = export_timeline(&repo, ExportFormat::Document).await.unwrap();
    assert_eq!(pdf.content_type, "application/pdf");
    let document = lopdf::Document::load_mem(&pdf.bytes).unwrap();
    assert_eq!(document.get_pages().len(), 1);
}

#[tokio::test]
async fn test_non_ascii_names_survive_both_exports() {
    let repo = seeded_repository();
    repo.add_product(Product::new(
        90,
        "Sistem Énergie – Ω 电力",
        "Sistem",
        "Pembangunan",
        Some(StageId(1)),
        ts(2022, 7, 1),
    ));
    let data = get_timeline_export_data(&repo).await.unwrap();

    let range = workbook(SpreadsheetRenderer::new().render(&data).unwrap())
        .worksheet_range(DETAIL_SHEET)
        .unwrap();
    let in_sheet = range
        .rows()
        .any(|row| row.iter().any(|cell| cell == &Data::String("Sistem Énergie – Ω 电力".into())));
    assert!(in_sheet);

    let pages = page_texts(&DocumentRenderer::new().render(&data).unwrap());
    let text = pages.join("\n");
    assert!(text.contains("Sistem Énergie – Ω ??"));
    assert!(text.contains("Pembangunan"));
    assert!(text.contains(CHART_TITLE));
    assert!(!text.contains('\u{FFFD}'));
}

#[tokio::test]
async fn test_document_metadata_matches_summaries() {
    let data = get_timeline_export_data(&seeded_repository()).await.unwrap();
    let pages = page_texts(&DocumentRenderer::new().render(&data).unwrap());

    let metadata = format!(
        "Total Segmen: {} | Total Tahun: {}",
        data.summary_by_segment.len(),
        data.summary_by_year.len()
    );
    assert!(pages.last().unwrap().contains(&metadata));
    assert!(pages[0].contains("Total Produk: "));
}
