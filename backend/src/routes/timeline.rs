use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{ProductId, StageId};

// =========================================================
// Lifecycle timeline types
// =========================================================

/// One occupancy of a stage by a product.
///
/// Wire names follow the dashboard's existing JSON (`kategori`, `segmen`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "segmen")]
    pub segment: String,
    pub stage: String,
    /// Catalog id of `stage`; absent on rows not produced by the builder
    #[serde(rename = "id_stage", default)]
    pub stage_id: Option<StageId>,
    /// First day of the month bucket this occurrence belongs to
    pub stage_date: NaiveDate,
    pub stage_start: Option<DateTime<Utc>>,
    /// `None` while the stage is still active
    pub stage_end: Option<DateTime<Utc>>,
}

impl TimelineProduct {
    pub fn bucket(&self) -> MonthBucket {
        MonthBucket::from_date(self.stage_date)
    }

    pub fn year(&self) -> i32 {
        self.stage_date.year()
    }
}

/// Calendar month used as a bucketing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    /// 1-based month
    pub month: u32,
}

impl MonthBucket {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn from_datetime(ts: DateTime<Utc>) -> Self {
        Self::from_date(ts.date_naive())
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Absolute month index (`year * 12 + month - 1`), used as the chart x axis.
    pub fn index(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64 - 1
    }
}

/// A single chart coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDataPoint {
    /// Absolute month index
    pub x: i64,
    /// Stage rank
    pub y: u32,
    pub product_count: usize,
}

/// Products behind one `(stage, month)` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketProducts {
    pub year: i32,
    pub month: u32,
    pub stage: String,
    pub products: Vec<TimelineProduct>,
}

/// Chart dataset for one stage.
///
/// `data[i]` and `products[i]` describe the same bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDataset {
    pub label: String,
    pub stage_rank: u32,
    pub data: Vec<TimelineDataPoint>,
    pub background_color: String,
    pub border_color: String,
    pub point_radius: u32,
    pub point_hover_radius: u32,
    pub products: Vec<BucketProducts>,
}

impl TimelineDataset {
    /// Rows across every bucket of this dataset.
    pub fn total_products(&self) -> usize {
        self.products.iter().map(|b| b.products.len()).sum()
    }
}

/// Inclusive calendar-year bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

/// Chart payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineData {
    pub datasets: Vec<TimelineDataset>,
    pub year_range: YearRange,
    pub last_updated: String,
}

/// Envelope returned by the chart endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineApiResponse {
    pub success: bool,
    pub data: TimelineData,
}

/// Route function name constant for the lifecycle timeline
pub const GET_TIMELINE_DATA: &str = "get_timeline_data";
