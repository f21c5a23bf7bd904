//! Shared fixtures for the behavioural merge scenarios.

use patchwise::{ErrorMode, MergeError, MergeOptions};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use serde_json::{Map, Value};
use std::sync::Arc;
use test_helpers::{collaborators::RecordingHooks, fixtures::Customer};

/// Scenario state shared between the steps of one merge scenario.
///
/// `Given` steps fill the customer, the patch document and the merge
/// settings; the `When` step stores the merged customer and the outcome.
#[derive(Debug, Default, ScenarioState)]
pub struct MergeWorld {
    /// Entity the patch is applied to; replaced by the merged entity.
    pub customer: Slot<Customer>,
    /// Patch document built field by field.
    pub document: Slot<Map<String, Value>>,
    /// Options used by the merge.
    pub options: Slot<MergeOptions>,
    /// Paths whose detachment the hooks refuse.
    pub refused: Slot<Vec<String>>,
    /// Whether the customer validation rules apply.
    pub validated: Slot<bool>,
    /// Hooks after the merge ran.
    pub hooks: Slot<RecordingHooks>,
    /// Outcome of the merge.
    pub outcome: Slot<Result<(), Arc<MergeError>>>,
}

impl MergeWorld {
    /// Options configured so far, starting from the defaults.
    pub fn take_options(&self) -> MergeOptions {
        self.options.take().unwrap_or_default()
    }

    /// Switch the merge to collect-all mode.
    pub fn collect_errors(&self) {
        let options = self.take_options().with_mode(ErrorMode::CollectAll);
        self.options.set(options);
    }
}

/// Creates a clean world for each scenario.
#[fixture]
pub fn merge_world() -> MergeWorld {
    MergeWorld::default()
}
