//! Schema descriptors.
//!
//! - [`PropSchema`]: how one field maps to JSON.
//! - [`ModelSchema`]: the field bindings of a model type.
//! - [`TypeRef`]: a possibly unresolved reference to a model schema.

// -----------------------------------------------------------------------------
// Modules

mod model;
mod prop;
mod type_ref;

// -----------------------------------------------------------------------------
// Exports

pub use model::{FieldBinding, ModelSchema, ModelSchemaBuilder};
pub use prop::{DeserializeFn, PropSchema, SerializeFn};
pub use type_ref::TypeRef;
