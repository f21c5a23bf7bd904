//! Extensions for mapping errors to `PatchResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| Arc::new(MergeError::…))`
//! chains when hand-written [`PartialRecord`](crate::PartialRecord)
//! implementations or collaborators convert their own failures.
//!
//! - Use [`PatchResultExt::into_patch`] for error types that implement
//!   `Into<MergeError>` (e.g., `Box<figment::Error>`).
//! - Use [`ValidationResultExt::at_path`] to attach a [`FieldPath`] to a
//!   [`ValidationFailure`].
//!
//! # Examples
//!
//! ```
//! use patchwise::{FieldPath, PatchResult, ValidationFailure, ValidationResultExt};
//!
//! fn check(age: u8) -> PatchResult<u8> {
//!     let verdict = if age < 150 {
//!         Ok(age)
//!     } else {
//!         Err(ValidationFailure::new("implausible age"))
//!     };
//!     verdict.at_path(&FieldPath::parse("age"))
//! }
//!
//! let err = check(200).expect_err("age is rejected");
//! assert_eq!(err.to_string(), "validation failed for 'age': implausible age");
//! ```

use std::sync::Arc;

use crate::{FieldPath, MergeError, PatchResult, ValidationFailure};

/// Generic extension for mapping any `Result<T, E>` with `E: Into<MergeError>`
/// into a `PatchResult<T>`.
pub trait PatchResultExt<T, E> {
    /// Convert `Result<T, E>` into `PatchResult<T>` using `Into<MergeError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<MergeError>`.
    fn into_patch(self) -> PatchResult<T>;
}

impl<T, E> PatchResultExt<T, E> for Result<T, E>
where
    E: Into<MergeError>,
{
    fn into_patch(self) -> PatchResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Extension tailored to reporting validator rejections at a field.
pub trait ValidationResultExt<T> {
    /// Convert `Result<T, ValidationFailure>` into `PatchResult<T>` as a
    /// [`MergeError::ValidationFailed`] at `path`.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::ValidationFailed` wrapped in `Arc` when the input
    /// is `Err`.
    fn at_path(self, path: &FieldPath) -> PatchResult<T>;
}

impl<T> ValidationResultExt<T> for Result<T, ValidationFailure> {
    fn at_path(self, path: &FieldPath) -> PatchResult<T> {
        self.map_err(|cause| Arc::new(MergeError::validation(path.clone(), cause)))
    }
}
