//! Postgres repository implementation using Diesel.
//!
//! Reads the dashboard's lifecycle tables (`tbl_produk`, `tbl_kategori`,
//! `tbl_segmen`, `tbl_stage`, `tbl_stage_histori`, `tbl_interval_stage`).
//! The schema is owned by the dashboard; this crate never migrates or writes.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task;

use crate::api::{
    Product, StageCatalog, StageDefinition, StageId, StageIntervalDefinition, StageTransition,
};
use crate::db::repository::{ErrorContext, LifecycleRepository, RepositoryError, RepositoryResult};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables (see module docs).
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_or("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository with a connection pool.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if the pool cannot be built
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        Ok(Self { pool, config })
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// Runs on the blocking pool; retries up to `max_retries` times with
    /// exponential backoff when the error is retryable.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        );
                        if attempt < max_retries {
                            log::warn!("Postgres connection attempt {} failed: {}", attempt + 1, err);
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> RepositoryError {
    move |err| RepositoryError::from(err).with_operation(operation)
}

fn to_utc(ts: NaiveDateTime) -> DateTime<Utc> {
    ts.and_utc()
}

fn group_history(rows: Vec<StageHistoryRow>) -> HashMap<i32, Vec<StageTransition>> {
    let mut history: HashMap<i32, Vec<StageTransition>> = HashMap::new();
    for row in rows {
        let Some(changed_at) = row.tanggal_perubahan.or(row.created_at) else {
            log::warn!(
                "Stage history row for product {} has no timestamp; ignored",
                row.id_produk
            );
            continue;
        };
        history.entry(row.id_produk).or_default().push(StageTransition {
            from_stage: row.stage_previous.map(|id| StageId::new(id as i64)),
            to_stage: StageId::new(row.stage_now as i64),
            changed_at: to_utc(changed_at),
        });
    }
    history
}

fn row_to_product(
    row: ProductRow,
    history: &mut HashMap<i32, Vec<StageTransition>>,
) -> RepositoryResult<Product> {
    let created_at = row.created_at.ok_or_else(|| {
        RepositoryError::validation_with_context(
            "Product row has no created_at",
            ErrorContext::new("fetch_products")
                .with_entity("product")
                .with_entity_id(row.id),
        )
    })?;

    Ok(Product {
        id: (row.id as i64).into(),
        name: row.produk,
        category: row.kategori,
        segment: row.segmen,
        current_stage: row.id_stage.map(|id| StageId::new(id as i64)),
        created_at: to_utc(created_at),
        stage_start: row.tanggal_stage_start.map(to_utc),
        stage_end: row.tanggal_stage_end.map(to_utc),
        transitions: history.remove(&row.id).unwrap_or_default(),
    })
}

/// Keep one interval row per previous stage, in id order.
///
/// A later row for the same stage replaces the earlier one and is logged.
fn dedupe_intervals(rows: Vec<IntervalRow>) -> Vec<IntervalRow> {
    let mut kept: Vec<IntervalRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match kept
            .iter_mut()
            .find(|k| k.id_stage_previous == row.id_stage_previous)
        {
            Some(existing) => {
                log::warn!(
                    "Interval row {} (next stage {}) replaces row {} (next stage {}) for stage {}",
                    row.id,
                    row.id_stage_next,
                    existing.id,
                    existing.id_stage_next,
                    row.id_stage_previous
                );
                *existing = row;
            }
            None => kept.push(row),
        }
    }
    kept
}

fn row_to_interval(row: IntervalRow) -> RepositoryResult<StageIntervalDefinition> {
    let months = u32::try_from(row.interval).map_err(|_| {
        RepositoryError::validation_with_context(
            format!("Negative stage interval {}", row.interval),
            ErrorContext::new("fetch_stage_intervals")
                .with_entity("interval")
                .with_entity_id(row.id_stage_previous),
        )
    })?;
    Ok(StageIntervalDefinition::new(row.id_stage_previous as i64, months))
}

#[async_trait]
impl LifecycleRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error("health_check"))
        })
        .await
    }

    async fn fetch_products(&self) -> RepositoryResult<Vec<Product>> {
        let (rows, history) = self
            .with_conn(|conn| {
                let rows = tbl_produk::table
                    .inner_join(tbl_kategori::table)
                    .inner_join(tbl_segmen::table)
                    .select((
                        tbl_produk::id,
                        tbl_produk::produk,
                        tbl_produk::id_stage,
                        tbl_produk::created_at,
                        tbl_produk::tanggal_stage_start,
                        tbl_produk::tanggal_stage_end,
                        tbl_kategori::kategori,
                        tbl_segmen::segmen,
                    ))
                    .order(tbl_produk::id.asc())
                    .load::<ProductRow>(conn)
                    .map_err(map_diesel_error("fetch_products"))?;

                let history = tbl_stage_histori::table
                    .select(StageHistoryRow::as_select())
                    .order((tbl_stage_histori::id_produk.asc(), tbl_stage_histori::id.asc()))
                    .load::<StageHistoryRow>(conn)
                    .map_err(map_diesel_error("fetch_stage_history"))?;

                Ok((rows, history))
            })
            .await?;

        let mut history = group_history(history);
        let products = rows
            .into_iter()
            .map(|row| row_to_product(row, &mut history))
            .collect::<RepositoryResult<Vec<_>>>()?;

        log::debug!("Fetched {} products from Postgres", products.len());
        Ok(products)
    }

    async fn fetch_stages(&self) -> RepositoryResult<Vec<StageDefinition>> {
        let rows = self
            .with_conn(|conn| {
                tbl_stage::table
                    .select(StageRow::as_select())
                    .order(tbl_stage::id.asc())
                    .load::<StageRow>(conn)
                    .map_err(map_diesel_error("fetch_stages"))
            })
            .await?;

        // tbl_stage has no ordering column; rank by conventional lifecycle names.
        let named = rows
            .into_iter()
            .map(|row| (StageId::new(row.id as i64), row.stage))
            .collect();
        Ok(StageCatalog::from_named_stages(named, &[]).stages().to_vec())
    }

    async fn fetch_stage_intervals(&self) -> RepositoryResult<Vec<StageIntervalDefinition>> {
        let rows = self
            .with_conn(|conn| {
                tbl_interval_stage::table
                    .select(IntervalRow::as_select())
                    .order(tbl_interval_stage::id.asc())
                    .load::<IntervalRow>(conn)
                    .map_err(map_diesel_error("fetch_stage_intervals"))
            })
            .await?;

        dedupe_intervals(rows)
            .into_iter()
            .map(row_to_interval)
            .collect()
    }
}
