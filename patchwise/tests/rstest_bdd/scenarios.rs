//! Binds the behavioural feature files to the step registry.

use super::fixtures::{MergeWorld, merge_world};
use rstest_bdd_macros::scenarios;

scenarios!(
    "tests/features/customer_merge.feature",
    fixtures = [merge_world: MergeWorld]
);
scenarios!(
    "tests/features/collection_merge.feature",
    fixtures = [merge_world: MergeWorld]
);
scenarios!(
    "tests/features/error_collection.feature",
    fixtures = [merge_world: MergeWorld]
);
