use chrono::NaiveDateTime;
use diesel::prelude::*;

use super::schema::{tbl_interval_stage, tbl_stage, tbl_stage_histori};

/// `tbl_produk` joined with its category and segment names.
#[derive(Debug, Clone, Queryable)]
pub struct ProductRow {
    pub id: i32,
    pub produk: String,
    pub id_stage: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub tanggal_stage_start: Option<NaiveDateTime>,
    pub tanggal_stage_end: Option<NaiveDateTime>,
    pub kategori: String,
    pub segmen: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tbl_stage)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StageRow {
    pub id: i32,
    pub stage: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tbl_stage_histori)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StageHistoryRow {
    pub id_produk: i32,
    pub stage_previous: Option<i32>,
    pub stage_now: i32,
    pub tanggal_perubahan: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tbl_interval_stage)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IntervalRow {
    pub id: i32,
    pub id_stage_previous: i32,
    pub id_stage_next: i32,
    pub interval: i32,
}

