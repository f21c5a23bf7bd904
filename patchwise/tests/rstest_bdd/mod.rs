//! `rstest-bdd` behavioural suite for `patchwise`.
//!
//! [`fixtures`] holds the shared scenario world, [`steps`] registers the step
//! implementations and [`scenarios`] binds the `.feature` files under
//! `tests/features` to them.

mod fixtures;
mod scenarios;
mod steps;
