//! Data Transfer Objects for the HTTP API.
//!
//! The timeline payloads are re-exported from the routes module since they
//! already derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    BucketProducts, TimelineApiResponse, TimelineData, TimelineDataPoint, TimelineDataset,
    TimelineProduct, YearRange,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Crate version serving the request
    pub version: String,
    /// Database connection status
    pub database: String,
}
