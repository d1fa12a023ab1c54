//! Service layer for business logic and orchestration.
//!
//! The pure stages of the pipeline (`timeline_builder`, `aggregator`,
//! `summary`) never touch the repository; `timeline` wires them to a
//! [`LifecycleRepository`](crate::db::LifecycleRepository) and to the export
//! renderers.

pub mod aggregator;
pub mod format;
pub mod summary;
pub mod timeline;
pub mod timeline_builder;

pub use aggregator::{aggregate_timeline, TimelineAggregate};
pub use summary::{assemble_export_data, build_export_metadata, project_summaries, TimelineSummaries};
pub use timeline::{
    compute_timeline_data, export_timeline, export_timeline_at, get_timeline_data,
    get_timeline_export_data, load_timeline_snapshot, RenderedExport, TimelineError,
    TimelineSnapshot,
};
pub use timeline_builder::build_timeline;
