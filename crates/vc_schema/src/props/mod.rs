//! [`PropSchema`](crate::schema::PropSchema) factories.
//!
//! - [`object`], [`object_with`]: a nested model object.
//! - [`primitive`]: a value with its own `serde` representation.
//! - [`custom`]: a value converted by the given functions.
//! - [`raw`]: a `serde_json::Value` passed through.
//! - [`alias`], [`skip`], [`with_default`]: key and presence tweaks.
//! - [`with_hooks`]: callbacks around any prop.

// -----------------------------------------------------------------------------
// Modules

mod basic;
mod hooks;
mod object;
mod primitive;

// -----------------------------------------------------------------------------
// Exports

pub use basic::{alias, skip, with_default};
pub use hooks::{PropHooks, with_hooks};
pub use object::{object, object_with};
pub use primitive::{custom, primitive, raw};
