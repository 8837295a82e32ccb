//! Serialization.
//!
//! Serialization is synchronous: every prop serializer returns its JSON
//! value directly, or nothing to leave the key out.

// -----------------------------------------------------------------------------
// Modules

mod driver;

// -----------------------------------------------------------------------------
// Exports

pub use driver::{serialize, serialize_with_schema};
