//! In-memory local repository implementation.
//!
//! Suitable for unit testing and local development. Data lives behind a
//! `parking_lot::RwLock`; a JSON seed file can pre-populate it so the server
//! runs without a database.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::api::{Product, StageCatalog, StageDefinition, StageIntervalDefinition};
use crate::db::repository::{ErrorContext, LifecycleRepository, RepositoryError, RepositoryResult};

/// Shape of a local seed file.
///
/// ```json
/// {
///   "stages": [{ "id": 1, "name": "Introduction", "rank": 1 }],
///   "intervals": [{ "stage_id": 1, "duration_months": 6 }],
///   "products": [{ "id": 1, "name": "...", "category": "...", "segment": "...",
///                  "current_stage": 1, "created_at": "2023-01-01T00:00:00Z" }]
/// }
/// ```
///
/// `stages` defaults to the four lifecycle stages when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSeed {
    #[serde(default)]
    pub stages: Option<Vec<StageDefinition>>,
    #[serde(default)]
    pub intervals: Vec<StageIntervalDefinition>,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use lifecycle_timeline::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// repo.set_healthy(false);
/// assert_eq!(repo.product_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    products: Vec<Product>,
    stages: Vec<StageDefinition>,
    intervals: Vec<StageIntervalDefinition>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            stages: StageCatalog::lifecycle_default().stages().to_vec(),
            intervals: Vec::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a repository holding the default lifecycle stages and no products.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository from an already parsed seed.
    pub fn with_data(seed: LocalSeed) -> Self {
        let repo = Self::new();
        {
            let mut data = repo.data.write();
            if let Some(stages) = seed.stages {
                data.stages = stages;
            }
            data.intervals = seed.intervals;
            data.products = seed.products;
        }
        repo
    }

    /// Load a JSON seed file.
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let context = || ErrorContext::new("load_seed_file").with_details(path.display().to_string());

        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read seed file: {}", e),
                context(),
            )
        })?;
        let seed: LocalSeed = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse seed file: {}", e),
                context(),
            )
        })?;

        log::info!(
            "Loaded local seed {}: {} products",
            path.display(),
            seed.products.len()
        );
        Ok(Self::with_data(seed))
    }

    pub fn add_product(&self, product: Product) {
        self.data.write().products.push(product);
    }

    pub fn set_stages(&self, stages: Vec<StageDefinition>) {
        self.data.write().stages = stages;
    }

    pub fn set_intervals(&self, intervals: Vec<StageIntervalDefinition>) {
        self.data.write().intervals = intervals;
    }

    /// Set the health status for testing connection failures.
    ///
    /// While unhealthy every fetch fails with a connection error.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Remove all products, keeping stages, intervals and health.
    pub fn clear(&self) {
        self.data.write().products.clear();
    }

    pub fn product_count(&self) -> usize {
        self.data.read().products.len()
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LifecycleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_products(&self) -> RepositoryResult<Vec<Product>> {
        self.check_health("fetch_products")?;
        Ok(self.data.read().products.clone())
    }

    async fn fetch_stages(&self) -> RepositoryResult<Vec<StageDefinition>> {
        self.check_health("fetch_stages")?;
        Ok(self.data.read().stages.clone())
    }

    async fn fetch_stage_intervals(&self) -> RepositoryResult<Vec<StageIntervalDefinition>> {
        self.check_health("fetch_stage_intervals")?;
        Ok(self.data.read().intervals.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StageId;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_health_check() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());

        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_unhealthy_fetch_is_connection_error() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);

        let err = repo.fetch_products().await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_default_stages() {
        let repo = LocalRepository::new();
        let stages = repo.fetch_stages().await.unwrap();
        let names: Vec<_> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Introduction", "Growth", "Maturity", "Decline"]);
    }

    #[tokio::test]
    async fn test_add_and_clear_products() {
        let repo = LocalRepository::new();
        let created = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        repo.add_product(Product::new(1, "A", "Aset", "Distribusi", Some(StageId(1)), created));
        repo.add_product(Product::new(2, "B", "Aset", "Distribusi", None, created));
        assert_eq!(repo.fetch_products().await.unwrap().len(), 2);

        repo.clear();
        assert_eq!(repo.product_count(), 0);
        assert_eq!(repo.fetch_stages().await.unwrap().len(), 4);
    }

    #[test]
    fn test_seed_without_stages_keeps_defaults() {
        let seed: LocalSeed = serde_json::from_str(r#"{ "intervals": [{ "stage_id": 1, "duration_months": 4 }] }"#).unwrap();
        let repo = LocalRepository::with_data(seed);
        assert_eq!(repo.data.read().stages.len(), 4);
        assert_eq!(repo.data.read().intervals[0].duration_months, 4);
    }
}
