//! Segment and year projections of the timeline rows, plus export metadata.
//!
//! Everything here is computed from the same row list the aggregator sees,
//! so product totals reconcile across the chart and both exports.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use super::format::{format_date, format_timestamp, format_year_range};
use crate::api::{
    ExportMetadata, ProductId, SegmentSummary, TimelineExportData, TimelineProduct, YearSummary,
};

/// Both summary views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineSummaries {
    pub by_segment: Vec<SegmentSummary>,
    pub by_year: Vec<YearSummary>,
}

pub fn project_summaries(items: &[TimelineProduct]) -> TimelineSummaries {
    TimelineSummaries {
        by_segment: summarize_by_segment(items),
        by_year: summarize_by_year(items),
    }
}

#[derive(Default)]
struct SegmentAccumulator {
    products: HashSet<ProductId>,
    stages: BTreeSet<String>,
    min_year: Option<i32>,
    max_year: Option<i32>,
}

/// One row per segment, ordered by segment name.
pub fn summarize_by_segment(items: &[TimelineProduct]) -> Vec<SegmentSummary> {
    let mut segments: BTreeMap<&str, SegmentAccumulator> = BTreeMap::new();

    for item in items {
        let acc = segments.entry(item.segment.as_str()).or_default();
        acc.products.insert(item.id);
        acc.stages.insert(item.stage.clone());

        let year = item.year();
        acc.min_year = Some(acc.min_year.map_or(year, |y| y.min(year)));
        acc.max_year = Some(acc.max_year.map_or(year, |y| y.max(year)));
    }

    segments
        .into_iter()
        .map(|(segment, acc)| SegmentSummary {
            segment: segment.to_string(),
            total_products: acc.products.len(),
            stages: acc.stages.into_iter().collect(),
            year_range: match (acc.min_year, acc.max_year) {
                (Some(min), Some(max)) => format_year_range(min, max),
                _ => "N/A".to_string(),
            },
        })
        .collect()
}

#[derive(Default)]
struct YearAccumulator {
    products: HashSet<ProductId>,
    segments: BTreeSet<String>,
    stages: BTreeSet<String>,
}

/// One row per calendar year of `stage_date`, newest year first.
pub fn summarize_by_year(items: &[TimelineProduct]) -> Vec<YearSummary> {
    let mut years: BTreeMap<i32, YearAccumulator> = BTreeMap::new();

    for item in items {
        let acc = years.entry(item.year()).or_default();
        acc.products.insert(item.id);
        acc.segments.insert(item.segment.clone());
        acc.stages.insert(item.stage.clone());
    }

    years
        .into_iter()
        .rev()
        .map(|(year, acc)| YearSummary {
            year,
            total_products: acc.products.len(),
            segments: acc.segments.into_iter().collect(),
            stages: acc.stages.into_iter().collect(),
        })
        .collect()
}

/// Distinct product ids across `items`.
pub fn distinct_products(items: &[TimelineProduct]) -> usize {
    items.iter().map(|i| i.id).collect::<HashSet<_>>().len()
}

pub fn build_export_metadata(items: &[TimelineProduct], exported_at: DateTime<Utc>) -> ExportMetadata {
    let min_date = items.iter().map(|i| i.stage_date).min();
    let max_date = items.iter().map(|i| i.stage_date).max();

    let date_range = match (min_date, max_date) {
        (Some(min), Some(max)) => format!("{} - {}", format_date(min), format_date(max)),
        _ => "N/A".to_string(),
    };

    ExportMetadata {
        total_products: distinct_products(items),
        total_rows: items.len(),
        date_range,
        export_date: format_timestamp(exported_at),
    }
}

/// Assemble the immutable snapshot handed to the export renderers.
pub fn assemble_export_data(items: Vec<TimelineProduct>, exported_at: DateTime<Utc>) -> TimelineExportData {
    let summaries = project_summaries(&items);
    let metadata = build_export_metadata(&items, exported_at);

    TimelineExportData {
        products: items,
        summary_by_segment: summaries.by_segment,
        summary_by_year: summaries.by_year,
        metadata,
    }
}
