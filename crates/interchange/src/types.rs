//! Typed structs for the schema descriptor JSON format.
//!
//! A descriptor declares classes and type hierarchy adapters as data. Every
//! field kind that needs no Rust code is expressible here; computed fields,
//! enum-backed fields and explicit constructors are not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level descriptor document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaDescriptor {
    /// Classes in registration order. A class may only reference classes
    /// declared before it.
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
    #[serde(default)]
    pub adapters: Vec<AdapterDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: KindDescriptor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_name: Option<String>,
    /// Defaults to nullable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

/// Field kind plus its options, tagged by `"kind"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindDescriptor {
    Integer {
        #[serde(default)]
        accepts_string: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Float {
        #[serde(default)]
        accepts_string: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Boolean {
        #[serde(default)]
        accepts_string: bool,
    },
    String {
        #[serde(default)]
        accepts_non_string: bool,
    },
    StringChoice {
        options: Vec<String>,
    },
    IntegerChoice {
        options: Vec<i64>,
    },
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    Time {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    #[serde(rename = "datetime")]
    DateTime {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        /// Parse without a declared format.
        #[serde(default)]
        free_form: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    TimestampSeconds {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    TimestampMillis {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_zone: Option<String>,
    },
    Decimal {
        #[serde(default)]
        accepts_string: bool,
    },
    Identifier,
    Bytes,
    Json,
    Object {
        class: String,
    },
    ObjectList {
        class: String,
    },
    List {
        item: ListItemDescriptor,
    },
}

/// Item of a list field: a primitive type name or a nested field kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ListItemDescriptor {
    Primitive(PrimitiveName),
    Field(Box<KindDescriptor>),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveName {
    Integer,
    String,
    Boolean,
    Float,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChildDescriptor {
    pub name: String,
    pub class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub base: String,
    pub type_key: String,
    /// Discriminator value to class name.
    pub subtypes: BTreeMap<String, String>,
    #[serde(default)]
    pub accept_subtypes: bool,
}
