#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Lets doc examples and macros name the crate as `vc_schema` from inside it.
extern crate self as vc_schema;

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod assert;
mod macros;
mod utils;

pub mod de;
pub mod error;
pub mod props;
pub mod registry;
pub mod schema;
pub mod ser;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports {
    pub use alloc::sync::Arc;

    #[cfg(feature = "auto_register")]
    pub use inventory;
}

pub use assert::{assert_or_fail, require};
pub use error::{ConfigError, DataError, DeserializeError, SerializeError};
