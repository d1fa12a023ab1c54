//! Public API surface for the Rust backend.
//!
//! This file consolidates the DTO types for the HTTP API and the domain
//! inputs the services consume. All types derive Serialize/Deserialize for
//! JSON serialization.

pub use crate::routes::export::ExportMetadata;
pub use crate::routes::export::SegmentSummary;
pub use crate::routes::export::TimelineExportData;
pub use crate::routes::export::YearSummary;
pub use crate::routes::timeline::BucketProducts;
pub use crate::routes::timeline::MonthBucket;
pub use crate::routes::timeline::TimelineApiResponse;
pub use crate::routes::timeline::TimelineData;
pub use crate::routes::timeline::TimelineDataPoint;
pub use crate::routes::timeline::TimelineDataset;
pub use crate::routes::timeline::TimelineProduct;
pub use crate::routes::timeline::YearRange;

pub use crate::models::{
    Product, ProductId, StageCatalog, StageDefinition, StageId, StageIntervalDefinition,
    StageTransition,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_and_conversion() {
        let id = ProductId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i64::from(id), 42);
        assert_eq!(StageId::from(3).value(), 3);
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&StageId(9)).unwrap();
        assert_eq!(json, "9");
    }
}
