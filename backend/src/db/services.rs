//! Repository-agnostic helpers used by the timeline services and HTTP layer.

use crate::api::StageCatalog;

use super::repository::{LifecycleRepository, RepositoryResult};

/// Check database connectivity.
pub async fn health_check(repo: &dyn LifecycleRepository) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Fetch stages and interval definitions concurrently and assemble the catalog.
pub async fn load_catalog(repo: &dyn LifecycleRepository) -> RepositoryResult<StageCatalog> {
    let (stages, intervals) = tokio::try_join!(repo.fetch_stages(), repo.fetch_stage_intervals())?;
    log::debug!(
        "Loaded stage catalog: {} stages, {} interval definitions",
        stages.len(),
        intervals.len()
    );
    Ok(StageCatalog::new(stages, &intervals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{StageId, StageIntervalDefinition};
    use crate::db::LocalRepository;

    #[tokio::test]
    async fn test_load_catalog_applies_intervals() {
        let repo = LocalRepository::new();
        repo.set_intervals(vec![
            StageIntervalDefinition::new(1, 6),
            StageIntervalDefinition::new(1, 9),
        ]);

        let catalog = load_catalog(&repo).await.unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.duration_months(StageId(1)), 9);
        assert_eq!(catalog.duration_months(StageId(2)), 0);
    }

    #[tokio::test]
    async fn test_load_catalog_propagates_failure() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(load_catalog(&repo).await.is_err());
        assert!(!health_check(&repo).await.unwrap());
    }
}
