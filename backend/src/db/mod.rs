//! Database module for the lifecycle tables.
//!
//! Access goes through the Repository pattern so the timeline engine can run
//! against Postgres in production and an in-memory store in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, timeline services)        │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Health checks                                        │
//! │  - Stage catalog assembly                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/mod.rs)                   │
//! └───────────────────┬─────────────────────────────────────┘
//!          ┌──────────┴───────────┐
//! ┌────────▼────────┐   ┌─────────▼────────┐
//! │ PostgresRepo    │   │ LocalRepository  │
//! │ (Diesel, r2d2)  │   │ (in-memory)      │
//! └─────────────────┘   └──────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use lifecycle_timeline::db::{services, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let catalog = services::load_catalog(repo.as_ref()).await?;
//!     println!("{} stages", catalog.len());
//!     Ok(())
//! }
//! ```

// Feature flag priority: postgres > local
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

pub use services::{health_check, load_catalog};

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::{LocalRepository, LocalSeed};
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{
    ErrorContext, LifecycleRepository, RepositoryError, RepositoryResult,
};
