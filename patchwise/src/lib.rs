//! Presence-aware optional values and selective merges for partial updates.
//!
//! A field in a partial-update document (an HTTP `PATCH` body, an incremental
//! feed record) is in one of three states: missing, explicitly null, or
//! supplied with a value. [`OptionalValue`] carries that state and the merge
//! engine applies a [`PartialRecord`] built from such values onto an existing
//! entity, field by field and recursively through nested records. The derive
//! macro lives in the companion `patchwise_macros` crate and is re-exported
//! here.
//!
//! ```rust
//! use patchwise::{OptionalValue, PartialRecord, merge};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Address {
//!     street: Option<String>,
//!     city: Option<String>,
//! }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Customer {
//!     email: Option<String>,
//!     address: Option<Address>,
//! }
//!
//! #[derive(Default, PartialRecord)]
//! #[patch(target = Address)]
//! struct AddressPatch {
//!     street: OptionalValue<String>,
//!     city: OptionalValue<String>,
//! }
//!
//! #[derive(Default, PartialRecord)]
//! #[patch(target = Customer)]
//! struct CustomerPatch {
//!     email: OptionalValue<String>,
//!     #[patch(nested)]
//!     address: OptionalValue<AddressPatch>,
//! }
//!
//! let mut customer = Customer {
//!     email: Some("a@x.com".into()),
//!     address: Some(Address {
//!         street: Some("Main".into()),
//!         city: Some("X".into()),
//!     }),
//! };
//! let patch = CustomerPatch {
//!     address: OptionalValue::present(AddressPatch {
//!         city: OptionalValue::present("Y".into()),
//!         ..AddressPatch::default()
//!     }),
//!     ..CustomerPatch::default()
//! };
//! merge(&mut customer, patch).expect("merge succeeds");
//! let address = customer.address.expect("address kept");
//! assert_eq!(address.street.as_deref(), Some("Main"));
//! assert_eq!(address.city.as_deref(), Some("Y"));
//! ```

pub use patchwise_macros::PartialRecord;

mod collaborator;
pub mod collection;
pub mod document;
pub mod engine;
mod error;
mod options;
mod path;
pub mod presence;
pub mod record;
mod result_ext;
mod value;

use std::sync::Arc;

pub use collaborator::{AcceptAll, AssociationHooks, FieldValue, NoHooks, Rules, Validator};
pub use collection::CollectionStrategy;
pub use document::DocumentMode;
pub use engine::{MergeContext, Merger, merge};
pub use error::{AggregatedErrors, DetachRefusal, MergeError, ValidationFailure};
pub use options::{CONFIG_FILE, ENV_PREFIX, ErrorMode, MergeOptions};
pub use path::{FieldPath, Segment};
pub use presence::PresenceMap;
pub use record::{NoIdentity, PartialRecord};
pub use result_ext::{PatchResultExt, ValidationResultExt};
pub use value::{NullMarker, OptionalValue, Presence};

/// Result alias used throughout the crate.
///
/// Errors are shared so collect-all merges can aggregate them cheaply.
pub type PatchResult<T> = Result<T, Arc<MergeError>>;
