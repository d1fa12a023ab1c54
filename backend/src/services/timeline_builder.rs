//! Stage occupancy windows per product.
//!
//! A product currently in the stage of rank `K` is taken to have passed
//! through every catalog stage of rank `1..K`. Recorded dates (stage history,
//! explicit stage start/end on the product row) anchor the windows; the
//! catalog durations fill in whatever was never recorded.

use chrono::{DateTime, Months, Utc};
use log::debug;

use crate::api::{MonthBucket, Product, StageCatalog, StageDefinition, TimelineProduct};

/// Expand products into one [`TimelineProduct`] per occupied stage.
///
/// Output follows input product order, then stage order. Products without a
/// stage, or in a stage the catalog does not know, contribute nothing.
pub fn build_timeline(products: &[Product], catalog: &StageCatalog) -> Vec<TimelineProduct> {
    let mut rows = Vec::with_capacity(products.len());
    for product in products {
        append_product_windows(product, catalog, &mut rows);
    }
    rows
}

fn append_product_windows(product: &Product, catalog: &StageCatalog, rows: &mut Vec<TimelineProduct>) {
    let Some(current) = product.current_stage else {
        debug!("Product {} has no stage assigned; skipped", product.id);
        return;
    };

    let path = catalog.path_to(current);
    if path.is_empty() {
        debug!(
            "Product {} is in stage {} which is not in the catalog; skipped",
            product.id, current
        );
        return;
    }

    let mut cursor = product.created_at;
    for (idx, stage) in path.iter().enumerate() {
        let is_current = idx + 1 == path.len();
        let start = entry_time(product, stage, is_current).unwrap_or(cursor);

        let end = if is_current {
            product.stage_end.map(|end| end.max(start))
        } else {
            let next = &path[idx + 1];
            let inferred = add_months(start, catalog.duration_months(stage.id));
            let end = entry_time(product, next, idx + 2 == path.len()).unwrap_or(inferred);
            Some(end.max(start))
        };

        rows.push(TimelineProduct {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            segment: product.segment.clone(),
            stage: stage.name.clone(),
            stage_id: Some(stage.id),
            stage_date: MonthBucket::from_datetime(start).first_day(),
            stage_start: Some(start),
            stage_end: end,
        });

        if let Some(end) = end {
            cursor = end;
        }
    }
}

/// Recorded entry into `stage`. The product's own `stage_start` wins for its
/// current stage.
fn entry_time(product: &Product, stage: &StageDefinition, is_current: bool) -> Option<DateTime<Utc>> {
    let explicit = if is_current { product.stage_start } else { None };
    explicit.or_else(|| product.recorded_entry(stage.id))
}

/// Calendar-month addition; saturates at `start` when out of range.
fn add_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start.checked_add_months(Months::new(months)).unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{StageDefinition, StageId, StageIntervalDefinition, StageTransition};
    use chrono::{NaiveDate, TimeZone};

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn catalog() -> StageCatalog {
        StageCatalog::new(
            vec![
                StageDefinition::new(1, "Development", 1),
                StageDefinition::new(2, "Testing", 2),
                StageDefinition::new(3, "Released", 3),
                StageDefinition::new(4, "Deprecated", 4),
            ],
            &[
                StageIntervalDefinition::new(1, 2),
                StageIntervalDefinition::new(2, 3),
            ],
        )
    }

    #[test]
    fn test_inferred_windows_for_stage_two() {
        let product = Product::new(1, "Gateway", "Perangkat", "Distribusi", Some(StageId(2)), ts(2023, 1, 1));
        let rows = build_timeline(&[product], &catalog());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stage, "Development");
        assert_eq!(rows[0].stage_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(rows[0].stage_start, Some(ts(2023, 1, 1)));
        assert_eq!(rows[0].stage_end, Some(ts(2023, 3, 1)));

        assert_eq!(rows[1].stage, "Testing");
        assert_eq!(rows[1].stage_date, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        assert_eq!(rows[1].stage_start, Some(ts(2023, 3, 1)));
        assert_eq!(rows[1].stage_end, None);
    }

    #[test]
    fn test_missing_interval_is_immediate_transition() {
        // Released (rank 3) has no interval: Deprecated starts the same instant.
        let product = Product::new(2, "Relay", "Perangkat", "Transmisi", Some(StageId(4)), ts(2022, 5, 20));
        let rows = build_timeline(&[product], &catalog());

        assert_eq!(rows.len(), 4);
        let released = &rows[2];
        let deprecated = &rows[3];
        assert_eq!(released.stage_start, released.stage_end);
        assert_eq!(released.stage_end, deprecated.stage_start);
        assert_eq!(deprecated.stage_date, NaiveDate::from_ymd_opt(2022, 10, 1).unwrap());
    }

    #[test]
    fn test_stage_date_truncated_to_month() {
        let product = Product::new(3, "Trafo", "Aset", "Pembangunan", Some(StageId(1)), ts(2021, 7, 19));
        let rows = build_timeline(&[product], &catalog());
        assert_eq!(rows[0].stage_date, NaiveDate::from_ymd_opt(2021, 7, 1).unwrap());
        assert_eq!(rows[0].stage_start, Some(ts(2021, 7, 19)));
    }

    #[test]
    fn test_null_and_unknown_stage_yield_nothing() {
        let products = vec![
            Product::new(4, "Tanpa Stage", "Aset", "Korporat", None, ts(2023, 1, 1)),
            Product::new(5, "Stage Asing", "Aset", "Korporat", Some(StageId(99)), ts(2023, 1, 1)),
        ];
        assert!(build_timeline(&products, &catalog()).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(build_timeline(&[], &StageCatalog::default()).is_empty());
    }

    #[test]
    fn test_recorded_transitions_override_inference() {
        let product = Product::new(6, "Billing", "Sistem", "Pelayanan Pelanggan", Some(StageId(3)), ts(2020, 1, 10))
            .with_transition(StageTransition {
                from_stage: Some(StageId(1)),
                to_stage: StageId(2),
                changed_at: ts(2020, 9, 15),
            })
            .with_transition(StageTransition {
                from_stage: Some(StageId(2)),
                to_stage: StageId(3),
                changed_at: ts(2021, 2, 1),
            });
        let rows = build_timeline(&[product], &catalog());

        assert_eq!(rows[0].stage_end, Some(ts(2020, 9, 15)));
        assert_eq!(rows[1].stage_start, Some(ts(2020, 9, 15)));
        assert_eq!(rows[1].stage_end, Some(ts(2021, 2, 1)));
        assert_eq!(rows[2].stage_start, Some(ts(2021, 2, 1)));
        assert_eq!(rows[2].stage_date, NaiveDate::from_ymd_opt(2021, 2, 1).unwrap());
    }

    #[test]
    fn test_explicit_stage_dates_on_current_stage() {
        let product = Product::new(7, "Portal", "Sistem", "Korporat", Some(StageId(2)), ts(2023, 1, 1))
            .with_stage_start(ts(2023, 6, 12))
            .with_stage_end(ts(2023, 12, 1));
        let rows = build_timeline(&[product], &catalog());

        // The previous stage ends where the explicit start says.
        assert_eq!(rows[0].stage_end, Some(ts(2023, 6, 12)));
        assert_eq!(rows[1].stage_start, Some(ts(2023, 6, 12)));
        assert_eq!(rows[1].stage_end, Some(ts(2023, 12, 1)));
    }

    #[test]
    fn test_inconsistent_history_never_ends_before_start() {
        let product = Product::new(8, "Kabel", "Aset", "Transmisi", Some(StageId(2)), ts(2023, 5, 1))
            .with_transition(StageTransition {
                from_stage: Some(StageId(1)),
                to_stage: StageId(2),
                changed_at: ts(2023, 1, 1),
            });
        let rows = build_timeline(&[product], &catalog());
        let first = &rows[0];
        assert!(first.stage_end.unwrap() >= first.stage_start.unwrap());
    }

    #[test]
    fn test_month_addition_clamps_to_month_end() {
        assert_eq!(add_months(ts(2023, 1, 31), 1), ts(2023, 2, 28));
        assert_eq!(add_months(ts(2023, 11, 15), 3), ts(2024, 2, 15));
    }
}
