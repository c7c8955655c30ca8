#![allow(clippy::result_large_err)]
//! modelson-core: declarative field and schema types.
//!
//! Classes are declared through a [`ClassBuilder`] and registered once in a
//! [`SchemaRegistry`], which checks every field configuration, merges the
//! ancestor chain and hands back a stable [`ClassId`]. Instances of a
//! registered class hold validated [`Value`]s addressed by declared field
//! name.
//!
//! # Public API
//!
//! - [`Field`] -- one declared slot; [`FieldKind`] is the closed kind catalog
//! - [`SchemaRegistry`], [`ClassBuilder`], [`Class`] -- the registrar
//! - [`Instance`], [`InitArgs`] -- per-object value holders
//! - [`Value`], [`FieldEnum`] -- the stored value model
//! - [`ConstructionError`], [`ValidationError`], [`Error`] -- error taxonomy

pub mod error;
pub mod field;
pub mod instance;
pub mod schema;
pub mod value;

// ── Convenience re-exports: key types ────────────────────────────────

pub use error::{ConstructionError, Error, Result, ValidationError};
pub use field::{ClassRef, EnumSpec, Field, FieldKind, ListItem, PrimitiveType};
pub use instance::{InitArgs, Instance};
pub use schema::{Accessor, Child, Class, ClassBuilder, ClassId, Constructor, Member, SchemaRegistry};
pub use value::{EnumMember, FieldEnum, Value};
