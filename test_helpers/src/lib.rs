//! Test helpers shared across crates in the `patchwise` workspace.
//!
//! - [`fixtures`] provides a small customer domain with matching partial
//!   records;
//! - [`collaborators`] provides recording hooks and sample validation rules;
//! - [`options`] loads merge options inside a `figment::Jail`;
//! - [`text`] parses the scalar notation used by behavioural scenarios.

pub mod collaborators;
pub mod fixtures;
pub mod options;
pub mod text;
