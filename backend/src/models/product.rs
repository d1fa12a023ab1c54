//! Raw lifecycle records as delivered by the repository layer.
//!
//! These types mirror the rows of the dashboard's product and stage tables.
//! They are read-only inputs to the timeline engine; nothing in this crate
//! writes them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, ProductId);
crate::define_id_type!(i64, StageId);

/// A recorded move of a product into a new stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    /// Stage the product left, when known
    #[serde(default)]
    pub from_stage: Option<StageId>,
    /// Stage the product entered
    pub to_stage: StageId,
    /// When the transition was recorded
    pub changed_at: DateTime<Utc>,
}

/// A product row joined with its category and segment names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub segment: String,
    /// Current lifecycle stage; `None` when never assigned
    #[serde(default)]
    pub current_stage: Option<StageId>,
    pub created_at: DateTime<Utc>,
    /// Explicit start of the current stage, when the product row carries one
    #[serde(default)]
    pub stage_start: Option<DateTime<Utc>>,
    /// Explicit end of the current stage, when the product row carries one
    #[serde(default)]
    pub stage_end: Option<DateTime<Utc>>,
    /// Stage history, in any order
    #[serde(default)]
    pub transitions: Vec<StageTransition>,
}

impl Product {
    /// Create a product with no recorded stage dates or history.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        category: impl Into<String>,
        segment: impl Into<String>,
        current_stage: Option<StageId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            category: category.into(),
            segment: segment.into(),
            current_stage,
            created_at,
            stage_start: None,
            stage_end: None,
            transitions: Vec::new(),
        }
    }

    pub fn with_stage_start(mut self, start: DateTime<Utc>) -> Self {
        self.stage_start = Some(start);
        self
    }

    pub fn with_stage_end(mut self, end: DateTime<Utc>) -> Self {
        self.stage_end = Some(end);
        self
    }

    pub fn with_transition(mut self, transition: StageTransition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Latest recorded entry into `stage`, if the history has one.
    pub fn recorded_entry(&self, stage: StageId) -> Option<DateTime<Utc>> {
        self.transitions
            .iter()
            .filter(|t| t.to_stage == stage)
            .map(|t| t.changed_at)
            .max()
    }
}

/// A lifecycle stage and its position in the stage order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: StageId,
    pub name: String,
    /// 1-based rank in the lifecycle order
    pub rank: u32,
}

impl StageDefinition {
    pub fn new(id: i64, name: impl Into<String>, rank: u32) -> Self {
        Self {
            id: StageId::new(id),
            name: name.into(),
            rank,
        }
    }
}

/// Expected number of calendar months a product spends in a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageIntervalDefinition {
    pub stage_id: StageId,
    pub duration_months: u32,
}

impl StageIntervalDefinition {
    pub fn new(stage_id: i64, duration_months: u32) -> Self {
        Self {
            stage_id: StageId::new(stage_id),
            duration_months,
        }
    }
}
