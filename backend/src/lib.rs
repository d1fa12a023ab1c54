//! # Lifecycle Timeline
//!
//! Timeline aggregation and export engine for the product-lifecycle
//! dashboard.
//!
//! Products move through an ordered set of lifecycle stages. This crate
//! reconstructs when each product occupied each stage, groups those
//! occurrences into per-stage monthly buckets for the dashboard chart, and
//! exports the same rows as an XLSX workbook or a paginated PDF whose totals
//! match the chart.
//!
//! ## Architecture
//!
//! - [`api`]: Public types (DTO re-exports and id newtypes)
//! - [`models`]: Repository inputs and the stage catalog
//! - [`routes`]: Serializable payloads per view
//! - [`services`]: Timeline builder, aggregator, summaries and orchestration
//! - [`export`]: Spreadsheet and document renderers
//! - [`db`]: Repository trait, Postgres and in-memory implementations
//! - [`http`]: Axum-based HTTP server (feature `http-server`)

// RepositoryError carries structured context
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod export;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
