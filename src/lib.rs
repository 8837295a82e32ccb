#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_schema as schema;

pub use vc_schema::{auto_register, impl_field, model_schema};
