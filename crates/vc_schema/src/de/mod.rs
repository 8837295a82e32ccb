//! Deserialization.
//!
//! A field deserializer reports its outcome through a [`Done`] instead of
//! returning it, so it may complete right away or at some later point.
//! [`deserialize_object_with_schema`] composes field continuations into the
//! continuation of the whole object, and the entry points below turn the
//! final one into a plain `Result` or a [`Completion`] future.
//!
//! A [`Context`] is shared by the whole call graph of one deserialization.

// -----------------------------------------------------------------------------
// Modules

mod context;
mod done;
mod driver;
mod future;

// -----------------------------------------------------------------------------
// Exports

pub use context::{Args, Context};
pub use done::{Done, DoneResult};
pub use driver::{deserialize_object_with_schema, update_with_schema};
pub use driver::{deserialize, deserialize_with_callback, deserialize_with_schema, update};
pub use future::{Completion, deserialize_async};
