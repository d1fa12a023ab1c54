//! Timeline orchestration: fetch, build, then aggregate or export.
//!
//! Every request works on its own snapshot. The chart payload and both
//! downloads are derived from the same builder output, so their totals agree.

use chrono::{DateTime, Utc};

use super::aggregator::aggregate_timeline;
use super::format::format_timestamp;
use super::summary::assemble_export_data;
use super::timeline_builder::build_timeline;
use crate::api::{StageCatalog, TimelineData, TimelineExportData, TimelineProduct};
use crate::db::load_catalog;
use crate::db::repository::{LifecycleRepository, RepositoryError};
use crate::export::{ExportFormat, RenderError};

/// Failure of a timeline request.
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Failed to fetch lifecycle data: {0}")]
    Fetch(#[from] RepositoryError),

    #[error("Failed to render export: {0}")]
    Render(#[from] RenderError),

    #[error("Render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Builder output together with the catalog it was built against.
#[derive(Debug, Clone)]
pub struct TimelineSnapshot {
    pub items: Vec<TimelineProduct>,
    pub catalog: StageCatalog,
}

/// A rendered download.
#[derive(Debug, Clone)]
pub struct RenderedExport {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Fetch products and the stage catalog concurrently and run the builder.
///
/// Any fetch failure fails the whole snapshot.
pub async fn load_timeline_snapshot(
    repo: &dyn LifecycleRepository,
) -> Result<TimelineSnapshot, RepositoryError> {
    let (products, catalog) = tokio::try_join!(repo.fetch_products(), load_catalog(repo))?;

    let items = build_timeline(&products, &catalog);
    log::info!(
        "Built timeline: {} products, {} stages, {} rows",
        products.len(),
        catalog.len(),
        items.len()
    );

    Ok(TimelineSnapshot { items, catalog })
}

/// Chart payload from builder output.
pub fn compute_timeline_data(
    items: &[TimelineProduct],
    catalog: &StageCatalog,
    now: DateTime<Utc>,
) -> TimelineData {
    let aggregate = aggregate_timeline(items, catalog);
    TimelineData {
        datasets: aggregate.datasets,
        year_range: aggregate.year_range,
        last_updated: format_timestamp(now),
    }
}

pub async fn get_timeline_data(repo: &dyn LifecycleRepository) -> Result<TimelineData, TimelineError> {
    let snapshot = load_timeline_snapshot(repo).await?;
    Ok(compute_timeline_data(&snapshot.items, &snapshot.catalog, Utc::now()))
}

pub async fn get_timeline_export_data(
    repo: &dyn LifecycleRepository,
) -> Result<TimelineExportData, TimelineError> {
    load_export_data(repo, Utc::now()).await
}

async fn load_export_data(
    repo: &dyn LifecycleRepository,
    exported_at: DateTime<Utc>,
) -> Result<TimelineExportData, TimelineError> {
    let snapshot = load_timeline_snapshot(repo).await?;
    Ok(assemble_export_data(snapshot.items, exported_at))
}

/// Fetch, project and render a download in `format`.
///
/// Serialization runs on the blocking pool.
pub async fn export_timeline(
    repo: &dyn LifecycleRepository,
    format: ExportFormat,
) -> Result<RenderedExport, TimelineError> {
    export_timeline_at(repo, format, Utc::now()).await
}

/// Like [`export_timeline`], stamping both the metadata and the filename
/// with `exported_at`.
pub async fn export_timeline_at(
    repo: &dyn LifecycleRepository,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<RenderedExport, TimelineError> {
    let data = load_export_data(repo, exported_at).await?;
    let rows = data.products.len();

    let bytes = tokio::task::spawn_blocking(move || format.renderer().render(&data)).await??;
    log::info!(
        "Exported timeline as {}: {} rows, {} bytes",
        format.extension(),
        rows,
        bytes.len()
    );

    Ok(RenderedExport {
        bytes,
        content_type: format.content_type(),
        filename: format.filename(exported_at.date_naive()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Product, StageId, StageIntervalDefinition};
    use crate::db::LocalRepository;
    use chrono::TimeZone;

    fn seeded_repo() -> LocalRepository {
        let repo = LocalRepository::new();
        repo.set_intervals(vec![StageIntervalDefinition::new(1, 4)]);
        let created = Utc.with_ymd_and_hms(2022, 2, 1, 0, 0, 0).unwrap();
        repo.add_product(Product::new(1, "SCADA", "Sistem", "Transmisi", Some(StageId(2)), created));
        repo.add_product(Product::new(2, "AMI", "Perangkat", "Distribusi", Some(StageId(1)), created));
        repo.add_product(Product::new(3, "Draft", "Perangkat", "Distribusi", None, created));
        repo
    }

    #[tokio::test]
    async fn test_snapshot_builds_rows() {
        let snapshot = load_timeline_snapshot(&seeded_repo()).await.unwrap();
        assert_eq!(snapshot.items.len(), 3);
        assert_eq!(snapshot.catalog.len(), 4);
    }

    #[tokio::test]
    async fn test_snapshot_uses_shared_catalog() {
        let repo = seeded_repo();
        repo.set_intervals(vec![
            StageIntervalDefinition::new(1, 4),
            StageIntervalDefinition::new(2, 7),
        ]);

        let snapshot = load_timeline_snapshot(&repo).await.unwrap();
        let catalog = load_catalog(&repo).await.unwrap();
        assert_eq!(snapshot.catalog, catalog);
        assert_eq!(snapshot.catalog.duration_months(StageId(2)), 7);
    }

    #[tokio::test]
    async fn test_export_stamps_metadata_and_filename_alike() {
        use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
        use crate::export::spreadsheet::METADATA_SHEET;

        let exported_at = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap();
        let export = export_timeline_at(&seeded_repo(), ExportFormat::Spreadsheet, exported_at)
            .await
            .unwrap();
        assert_eq!(export.filename, "Timeline_Siklus_Hidup_2024-03-31.xlsx");

        let mut book: Xlsx<_> =
            open_workbook_from_rs(std::io::Cursor::new(export.bytes)).unwrap();
        let meta = book.worksheet_range(METADATA_SHEET).unwrap();
        assert_eq!(
            meta.get_value((4, 1)),
            Some(&Data::String("31/03/2024, 23.59.59".to_string()))
        );
    }

    #[tokio::test]
    async fn test_chart_rows_match_export_rows() {
        let repo = seeded_repo();
        let chart = get_timeline_data(&repo).await.unwrap();
        let export = get_timeline_export_data(&repo).await.unwrap();

        let chart_rows: usize = chart.datasets.iter().map(|d| d.total_products()).sum();
        assert_eq!(chart_rows, export.products.len());
        assert_eq!(export.metadata.total_products, 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let repo = seeded_repo();
        repo.set_healthy(false);
        let err = get_timeline_data(&repo).await.unwrap_err();
        assert!(matches!(err, TimelineError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_export_sets_filename_and_type() {
        let export = export_timeline(&seeded_repo(), ExportFormat::Spreadsheet)
            .await
            .unwrap();
        assert!(export.filename.starts_with("Timeline_Siklus_Hidup_"));
        assert!(export.filename.ends_with(".xlsx"));
        assert!(!export.bytes.is_empty());
    }

    #[test]
    fn test_compute_timeline_data_last_updated() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let data = compute_timeline_data(&[], &StageCatalog::lifecycle_default(), now);
        assert_eq!(data.last_updated, "06/05/2024, 07.08.09");
        assert_eq!(data.datasets.len(), 4);
    }
}
