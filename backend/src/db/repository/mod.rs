//! Repository trait for the lifecycle tables.
//!
//! The timeline engine only ever reads: products (with their recorded stage
//! history), the stage list and the stage interval definitions. Writes to
//! these tables belong to the dashboard's CRUD screens.

use async_trait::async_trait;

use crate::api::{Product, StageDefinition, StageIntervalDefinition};

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

/// Read access to products and the stage catalog inputs.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across request handlers.
#[async_trait]
pub trait LifecycleRepository: Send + Sync {
    /// Check that the backing store is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` - Store answered
    /// * `Err(RepositoryError)` - Store unreachable
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Every product, joined with its category and segment names and
    /// carrying its recorded stage transitions.
    ///
    /// Rows whose required columns are missing fail the whole fetch with a
    /// validation error rather than being silently dropped.
    async fn fetch_products(&self) -> RepositoryResult<Vec<Product>>;

    /// Stage definitions with their catalog rank.
    async fn fetch_stages(&self) -> RepositoryResult<Vec<StageDefinition>>;

    /// Expected stage durations in calendar months.
    async fn fetch_stage_intervals(&self) -> RepositoryResult<Vec<StageIntervalDefinition>>;
}
