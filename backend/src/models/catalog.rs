//! Stage interval catalog.
//!
//! The catalog fixes the total order of lifecycle stages and the expected
//! number of months a product spends in each of them. It is always passed
//! explicitly to the timeline builder and aggregator.

use std::collections::HashMap;

use super::product::{StageDefinition, StageId, StageIntervalDefinition};

/// Lifecycle stage names in the order the dashboard presents them.
pub const LIFECYCLE_STAGE_ORDER: [&str; 4] = ["Introduction", "Growth", "Maturity", "Decline"];

/// Position of a well-known lifecycle stage name (1-based, case-insensitive).
pub fn lifecycle_rank(name: &str) -> Option<u32> {
    LIFECYCLE_STAGE_ORDER
        .iter()
        .position(|known| known.eq_ignore_ascii_case(name.trim()))
        .map(|idx| idx as u32 + 1)
}

/// Ordered stages plus their configured durations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageCatalog {
    stages: Vec<StageDefinition>,
    durations: HashMap<StageId, u32>,
}

impl StageCatalog {
    /// Build a catalog from stage rows and interval definitions.
    ///
    /// Stages are ordered by `(rank, id)` and re-ranked `1..=n`; a repeated
    /// stage id keeps its first occurrence. When several interval definitions
    /// name the same stage the last one wins.
    pub fn new(mut stages: Vec<StageDefinition>, intervals: &[StageIntervalDefinition]) -> Self {
        stages.sort_by_key(|s| (s.rank, s.id));

        let mut seen = std::collections::HashSet::new();
        stages.retain(|s| seen.insert(s.id));

        for (idx, stage) in stages.iter_mut().enumerate() {
            stage.rank = idx as u32 + 1;
        }

        let durations = intervals
            .iter()
            .map(|def| (def.stage_id, def.duration_months))
            .collect();

        Self { stages, durations }
    }

    /// Build a catalog from bare `(id, name)` stage rows.
    ///
    /// Known lifecycle names take their conventional position; every other
    /// stage follows them, ordered by id.
    pub fn from_named_stages(
        stages: Vec<(StageId, String)>,
        intervals: &[StageIntervalDefinition],
    ) -> Self {
        let unknown_base = LIFECYCLE_STAGE_ORDER.len() as u32 + 1;
        let definitions = stages
            .into_iter()
            .map(|(id, name)| StageDefinition {
                id,
                rank: lifecycle_rank(&name).unwrap_or(unknown_base),
                name,
            })
            .collect();
        Self::new(definitions, intervals)
    }

    /// Introduction → Growth → Maturity → Decline with no durations configured.
    pub fn lifecycle_default() -> Self {
        let stages = LIFECYCLE_STAGE_ORDER
            .iter()
            .enumerate()
            .map(|(idx, name)| StageDefinition::new(idx as i64 + 1, *name, idx as u32 + 1))
            .collect();
        Self::new(stages, &[])
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage(&self, id: StageId) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn stage_by_name(&self, name: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn rank_of(&self, id: StageId) -> Option<u32> {
        self.stage(id).map(|s| s.rank)
    }

    /// Configured months in `id`; zero when the stage has no interval definition.
    pub fn duration_months(&self, id: StageId) -> u32 {
        self.durations.get(&id).copied().unwrap_or(0)
    }

    /// Stages `1..=K` for a product currently in the stage of rank `K`.
    ///
    /// Empty when `id` is not part of the catalog.
    pub fn path_to(&self, id: StageId) -> &[StageDefinition] {
        match self.stages.iter().position(|s| s.id == id) {
            Some(idx) => &self.stages[..=idx],
            None => &[],
        }
    }
}
