//! Error types produced by the merge engine.

mod aggregate;
mod constructors;
mod types;

pub use aggregate::AggregatedErrors;
pub use types::{DetachRefusal, MergeError, ValidationFailure};

#[cfg(test)]
mod tests;
