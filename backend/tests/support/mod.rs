#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use lifecycle_timeline::api::{
    Product, StageDefinition, StageId, StageIntervalDefinition, StageTransition,
};
use lifecycle_timeline::db::{LocalRepository, LocalSeed};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Lifecycle fixtures
// =============================================================================

pub fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Development(2 months) → Testing(3 months) → Released → Deprecated
pub fn release_stages() -> Vec<StageDefinition> {
    vec![
        StageDefinition::new(1, "Development", 1),
        StageDefinition::new(2, "Testing", 2),
        StageDefinition::new(3, "Released", 3),
        StageDefinition::new(4, "Deprecated", 4),
    ]
}

pub fn release_intervals() -> Vec<StageIntervalDefinition> {
    vec![
        StageIntervalDefinition::new(1, 2),
        StageIntervalDefinition::new(2, 3),
    ]
}

pub fn sample_products() -> Vec<Product> {
    vec![
        Product::new(1, "Gateway", "Perangkat", "Distribusi", Some(StageId(2)), ts(2023, 1, 1)),
        Product::new(2, "Relay Digital", "Perangkat", "Transmisi", Some(StageId(3)), ts(2022, 12, 1)),
        Product::new(3, "Portal Pelanggan", "Sistem", "Pelayanan Pelanggan", Some(StageId(3)), ts(2022, 12, 15)),
        Product::new(4, "Billing", "Sistem", "Pelayanan Pelanggan", Some(StageId(4)), ts(2020, 1, 10))
            .with_transition(StageTransition {
                from_stage: Some(StageId(3)),
                to_stage: StageId(4),
                changed_at: ts(2022, 8, 1),
            }),
        Product::new(5, "Konsep", "Aset", "Korporat", None, ts(2024, 1, 1)),
    ]
}

pub fn seeded_repository() -> LocalRepository {
    LocalRepository::with_data(LocalSeed {
        stages: Some(release_stages()),
        intervals: release_intervals(),
        products: sample_products(),
    })
}
