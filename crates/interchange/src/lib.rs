//! modelson-interchange: schema descriptors as JSON.
//!
//! Provides typed structs for the descriptor format (classes with their
//! fields and children, plus type hierarchy adapters) and a single
//! `load_descriptor()` entry point that registers a descriptor into a
//! fresh [`modelson_core::SchemaRegistry`].
//!
//! The formal JSON Schema for descriptors lives at
//! `schema/descriptor-schema.json` in the repository root.

pub mod load;
pub mod types;

pub use load::{build, load_descriptor, load_descriptor_str, DescriptorError, LoadedSchema};
pub use types::*;
