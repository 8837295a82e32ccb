//! The live-value model.
//!
//! Serializers and deserializers never see concrete field types. They see
//! an [`AnyRef`] (absent, null, or a `&dyn Any`) and report an [`AnyValue`].
//! The [`Field`] trait translates between those and real struct fields.

// -----------------------------------------------------------------------------
// Modules

mod field;
mod maybe;
mod object;

// -----------------------------------------------------------------------------
// Exports

#[doc(hidden)]
pub use field::mismatch;

pub use field::Field;
pub use maybe::{AnyRef, AnyValue, Maybe};
pub use object::{AnyObject, Instance};
pub use object::{downcast_value, erase, value_ref};
