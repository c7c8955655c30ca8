//! Registering descriptor classes and adapters.
//!
//! The main entry point is [`load_descriptor`], which takes a
//! `&serde_json::Value` and produces a [`LoadedSchema`].

use std::collections::BTreeMap;
use std::sync::Arc;

use modelson_convert::{Converter, ConverterConfig, TypeHierarchyAdapter};
use modelson_core::{ClassBuilder, ClassId, ConstructionError, Field, PrimitiveType, SchemaRegistry, Value};
use serde::Deserialize;
use tracing::debug;

use crate::types::*;

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("invalid descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{referrer} references undeclared class '{name}'")]
    UnknownClass { referrer: String, name: String },

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Convert(#[from] modelson_convert::Error),
}

/// Registry built from a descriptor, plus name lookups and its adapters.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub registry: Arc<SchemaRegistry>,
    pub classes: BTreeMap<String, ClassId>,
    pub adapters: Vec<TypeHierarchyAdapter>,
}

impl LoadedSchema {
    pub fn class_id(&self, name: &str) -> Result<ClassId, DescriptorError> {
        self.classes
            .get(name)
            .copied()
            .ok_or_else(|| DescriptorError::UnknownClass {
                referrer: "lookup".to_string(),
                name: name.to_string(),
            })
    }

    /// A converter over this registry with every declared adapter registered.
    pub fn converter(&self, config: ConverterConfig) -> Result<Converter, DescriptorError> {
        let mut converter = Converter::new(Arc::clone(&self.registry), config);
        for adapter in &self.adapters {
            converter.register_adapter(adapter.clone())?;
        }
        Ok(converter)
    }
}

/// Parse and register a descriptor document.
pub fn load_descriptor(value: &serde_json::Value) -> Result<LoadedSchema, DescriptorError> {
    let descriptor = SchemaDescriptor::deserialize(value)?;
    build(&descriptor)
}

pub fn load_descriptor_str(text: &str) -> Result<LoadedSchema, DescriptorError> {
    let descriptor: SchemaDescriptor = serde_json::from_str(text)?;
    build(&descriptor)
}

/// Register every class of `descriptor` in order, then resolve adapters.
pub fn build(descriptor: &SchemaDescriptor) -> Result<LoadedSchema, DescriptorError> {
    let mut registry = SchemaRegistry::new();
    let mut classes = BTreeMap::new();

    for class in &descriptor.classes {
        let mut builder = ClassBuilder::new(class.name.clone());
        if let Some(parent) = &class.extends {
            builder = builder.extends(resolve(&classes, parent, &class.name)?);
        }
        for field in &class.fields {
            builder = builder.field(field.name.clone(), build_field(field, &classes, &class.name)?);
        }
        for child in &class.children {
            builder = builder.child(child.name.clone(), resolve(&classes, &child.class, &class.name)?);
        }
        let id = registry.register(builder)?;
        classes.insert(class.name.clone(), id);
    }

    let mut adapters = Vec::with_capacity(descriptor.adapters.len());
    for adapter in &descriptor.adapters {
        let referrer = format!("adapter on {}", adapter.base);
        let mut built = TypeHierarchyAdapter::new(
            resolve(&classes, &adapter.base, &referrer)?,
            adapter.type_key.clone(),
        )
        .accept_subtypes(adapter.accept_subtypes);
        for (value, class) in &adapter.subtypes {
            built = built.subtype(value.clone(), resolve(&classes, class, &referrer)?);
        }
        adapters.push(built);
    }

    debug!(
        classes = classes.len(),
        adapters = adapters.len(),
        "loaded schema descriptor"
    );
    Ok(LoadedSchema {
        registry: Arc::new(registry),
        classes,
        adapters,
    })
}

fn resolve(
    classes: &BTreeMap<String, ClassId>,
    name: &str,
    referrer: &str,
) -> Result<ClassId, DescriptorError> {
    classes
        .get(name)
        .copied()
        .ok_or_else(|| DescriptorError::UnknownClass {
            referrer: referrer.to_string(),
            name: name.to_string(),
        })
}

fn build_field(
    desc: &FieldDescriptor,
    classes: &BTreeMap<String, ClassId>,
    referrer: &str,
) -> Result<Field, DescriptorError> {
    let mut field = build_kind(&desc.kind, classes, referrer)?;
    if let Some(name) = &desc.serialized_name {
        field = field.serialized_name(name.clone());
    }
    if let Some(nullable) = desc.nullable {
        field = field.nullable(nullable);
    }
    if let Some(default) = &desc.default {
        field = field.default_value(Value::from_json(default));
    }
    Ok(field)
}

fn build_kind(
    kind: &KindDescriptor,
    classes: &BTreeMap<String, ClassId>,
    referrer: &str,
) -> Result<Field, DescriptorError> {
    let field = match kind {
        KindDescriptor::Integer {
            accepts_string,
            min,
            max,
        } => {
            let mut f = Field::integer().accepts_string(*accepts_string);
            if let Some(min) = min {
                f = f.min(*min);
            }
            if let Some(max) = max {
                f = f.max(*max);
            }
            f
        }
        KindDescriptor::Float {
            accepts_string,
            min,
            max,
        } => {
            let mut f = Field::float().accepts_string(*accepts_string);
            if let Some(min) = min {
                f = f.min(*min);
            }
            if let Some(max) = max {
                f = f.max(*max);
            }
            f
        }
        KindDescriptor::Boolean { accepts_string } => Field::boolean().accepts_string(*accepts_string),
        KindDescriptor::String { accepts_non_string } => {
            Field::string().accepts_non_string(*accepts_non_string)
        }
        KindDescriptor::StringChoice { options } => Field::string_choice(options.iter().cloned()),
        KindDescriptor::IntegerChoice { options } => Field::integer_choice(options.iter().copied()),
        KindDescriptor::Date { format } => with_format(Field::date(), format),
        KindDescriptor::Time { format } => with_format(Field::time(), format),
        KindDescriptor::DateTime {
            format,
            free_form,
            time_zone,
        } => {
            let mut f = with_format(Field::datetime(), format);
            if *free_form {
                f = f.free_form();
            }
            with_zone(f, time_zone)
        }
        KindDescriptor::TimestampSeconds { time_zone } => with_zone(Field::timestamp_seconds(), time_zone),
        KindDescriptor::TimestampMillis { time_zone } => with_zone(Field::timestamp_millis(), time_zone),
        KindDescriptor::Decimal { accepts_string } => Field::decimal().accepts_string(*accepts_string),
        KindDescriptor::Identifier => Field::identifier(),
        KindDescriptor::Bytes => Field::bytes(),
        KindDescriptor::Json => Field::json(),
        KindDescriptor::Object { class } => Field::object(resolve(classes, class, referrer)?),
        KindDescriptor::ObjectList { class } => Field::object_list(resolve(classes, class, referrer)?),
        KindDescriptor::List { item } => match item {
            ListItemDescriptor::Primitive(name) => Field::list(match name {
                PrimitiveName::Integer => PrimitiveType::Integer,
                PrimitiveName::String => PrimitiveType::String,
                PrimitiveName::Boolean => PrimitiveType::Boolean,
                PrimitiveName::Float => PrimitiveType::Float,
            }),
            ListItemDescriptor::Field(kind) => Field::list_of(build_kind(kind, classes, referrer)?),
        },
    };
    Ok(field)
}

fn with_format(field: Field, format: &Option<String>) -> Field {
    match format {
        Some(format) => field.format(format.clone()),
        None => field,
    }
}

fn with_zone(field: Field, zone: &Option<String>) -> Field {
    match zone {
        Some(zone) => field.time_zone(zone.clone()),
        None => field,
    }
}
