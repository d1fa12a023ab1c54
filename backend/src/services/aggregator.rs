//! Folding timeline rows into per-stage month buckets for the chart.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Utc};

use crate::api::{
    BucketProducts, MonthBucket, StageCatalog, StageId, TimelineDataPoint, TimelineDataset,
    TimelineProduct, YearRange,
};

/// Chart colors by stage rank; later ranks reuse the fallback.
const STAGE_COLORS: [&str; 5] = ["#06B6D4", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6"];
const FALLBACK_COLOR: &str = "#6B7280";

const POINT_RADIUS: u32 = 6;
const POINT_HOVER_RADIUS: u32 = 8;

/// Datasets plus the observed year span.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineAggregate {
    pub datasets: Vec<TimelineDataset>,
    pub year_range: YearRange,
}

impl TimelineAggregate {
    /// Rows across every dataset and bucket.
    pub fn total_rows(&self) -> usize {
        self.datasets.iter().map(TimelineDataset::total_products).sum()
    }
}

pub fn stage_color(rank: u32) -> &'static str {
    rank.checked_sub(1)
        .and_then(|idx| STAGE_COLORS.get(idx as usize))
        .copied()
        .unwrap_or(FALLBACK_COLOR)
}

/// Group rows by stage and month.
///
/// One dataset per catalog stage, in catalog order, even when a stage has no
/// rows. Rows are matched to catalog stages by stage id, or by name when the
/// row carries no id. Rows naming a stage outside the catalog land in
/// trailing datasets ordered by stage name. Within a bucket rows keep their
/// input order.
pub fn aggregate_timeline(items: &[TimelineProduct], catalog: &StageCatalog) -> TimelineAggregate {
    let mut known: HashMap<StageId, Buckets> = HashMap::new();
    let mut unknown: BTreeMap<&str, Buckets> = BTreeMap::new();

    for item in items {
        let buckets = match catalog_stage(item, catalog) {
            Some(id) => known.entry(id).or_default(),
            None => unknown.entry(item.stage.as_str()).or_default(),
        };
        buckets.entry(item.bucket()).or_default().push(item.clone());
    }

    let mut datasets = Vec::with_capacity(catalog.len() + unknown.len());
    for stage in catalog.stages() {
        let buckets = known.remove(&stage.id).unwrap_or_default();
        datasets.push(build_dataset(&stage.name, stage.rank, buckets));
    }

    let mut next_rank = catalog.len() as u32;
    for (name, buckets) in unknown {
        next_rank += 1;
        datasets.push(build_dataset(name, next_rank, buckets));
    }

    TimelineAggregate {
        datasets,
        year_range: year_range(items),
    }
}

type Buckets = BTreeMap<MonthBucket, Vec<TimelineProduct>>;

fn catalog_stage(item: &TimelineProduct, catalog: &StageCatalog) -> Option<StageId> {
    item.stage_id
        .and_then(|id| catalog.stage(id))
        .or_else(|| catalog.stage_by_name(&item.stage))
        .map(|stage| stage.id)
}

fn build_dataset(label: &str, rank: u32, buckets: Buckets) -> TimelineDataset {
    let mut data = Vec::with_capacity(buckets.len());
    let mut products = Vec::with_capacity(buckets.len());

    for (bucket, rows) in buckets {
        data.push(TimelineDataPoint {
            x: bucket.index(),
            y: rank,
            product_count: rows.len(),
        });
        products.push(BucketProducts {
            year: bucket.year,
            month: bucket.month,
            stage: label.to_string(),
            products: rows,
        });
    }

    let color = stage_color(rank).to_string();
    TimelineDataset {
        label: label.to_string(),
        stage_rank: rank,
        data,
        background_color: color.clone(),
        border_color: color,
        point_radius: POINT_RADIUS,
        point_hover_radius: POINT_HOVER_RADIUS,
        products,
    }
}

/// Min/max year over all `stage_date`s; the current year when empty.
pub fn year_range(items: &[TimelineProduct]) -> YearRange {
    let mut years = items.iter().map(TimelineProduct::year);
    match years.next() {
        Some(first) => {
            let (min, max) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
            YearRange { min, max }
        }
        None => {
            let current = Utc::now().year();
            YearRange {
                min: current,
                max: current,
            }
        }
    }
}
