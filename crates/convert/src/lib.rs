#![allow(clippy::result_large_err)]
//! modelson-convert: JSON and CSV conversion for registered classes.
//!
//! A [`Converter`] decodes parsed JSON (or JSON text, or CSV rows) into
//! [`modelson_core::Instance`] graphs and encodes them back, dispatching
//! polymorphic documents through registered [`TypeHierarchyAdapter`]s.

pub mod adapter;
pub mod config;
pub mod converter;
pub mod delimited;
pub mod error;

pub use adapter::TypeHierarchyAdapter;
pub use config::{ConverterConfig, CsvOptions, DecodeOptions, DEFAULT_MAX_DEPTH};
pub use converter::{Converter, Decoded};
pub use error::{Error, Result, SchemaResolutionError};
