//! Recursive decode and encode between JSON trees and instances.

use std::sync::Arc;

use modelson_core::{Class, ClassId, Field, FieldKind, InitArgs, Instance, Member, SchemaRegistry, Value};
use serde_json::{Map, Value as Json};
use tracing::{debug, trace};

use crate::adapter::TypeHierarchyAdapter;
use crate::config::{ConverterConfig, DecodeOptions};
use crate::error::{Error, Result, SchemaResolutionError};

/// Result of decoding a JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Null,
    One(Instance),
    Many(Vec<Instance>),
}

impl Decoded {
    pub fn is_null(&self) -> bool {
        matches!(self, Decoded::Null)
    }

    pub fn into_one(self) -> Option<Instance> {
        match self {
            Decoded::One(inst) => Some(inst),
            _ => None,
        }
    }

    /// All decoded instances; a single object becomes a one-element list.
    pub fn into_vec(self) -> Vec<Instance> {
        match self {
            Decoded::Null => Vec::new(),
            Decoded::One(inst) => vec![inst],
            Decoded::Many(items) => items,
        }
    }
}

/// Maps JSON documents onto registered classes and back.
///
/// Adapters are consulted in registration order. Register them during
/// setup; the converter is read-only afterwards and may be shared.
#[derive(Debug, Clone)]
pub struct Converter {
    registry: Arc<SchemaRegistry>,
    adapters: Vec<TypeHierarchyAdapter>,
    config: ConverterConfig,
}

impl Converter {
    pub fn new(registry: Arc<SchemaRegistry>, config: ConverterConfig) -> Self {
        Converter {
            registry,
            adapters: Vec::new(),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn adapters(&self) -> &[TypeHierarchyAdapter] {
        &self.adapters
    }

    pub fn register_adapter(&mut self, adapter: TypeHierarchyAdapter) -> Result<()> {
        adapter.check(&self.registry)?;
        debug!(
            base = adapter.base().index(),
            type_key = adapter.type_key(),
            subtypes = adapter.subtypes().len(),
            "registered type hierarchy adapter"
        );
        self.adapters.push(adapter);
        Ok(())
    }

    pub fn default_options(&self) -> DecodeOptions {
        DecodeOptions {
            accept_unknown: self.config.accept_unknown,
        }
    }

    pub(crate) fn class(&self, id: ClassId) -> Result<&Arc<Class>> {
        self.registry
            .get(id)
            .ok_or_else(|| SchemaResolutionError::UnknownClass { reference: id.index() }.into())
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Decode
// ──────────────────────────────────────────────

impl Converter {
    pub fn decode(&self, data: &Json, target: ClassId) -> Result<Decoded> {
        self.decode_with(data, target, self.default_options())
    }

    /// Decode a payload: null, one object, or an array of objects.
    pub fn decode_with(&self, data: &Json, target: ClassId, options: DecodeOptions) -> Result<Decoded> {
        match data {
            Json::Null => Ok(Decoded::Null),
            Json::Object(map) => Ok(Decoded::One(self.decode_object(map, target, options, 1)?)),
            Json::Array(items) => {
                let mut decoded = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Json::Object(map) => decoded.push(self.decode_object(map, target, options, 1)?),
                        other => {
                            return Err(Error::UnsupportedPayload {
                                found: json_type(other).to_string(),
                            })
                        }
                    }
                }
                Ok(Decoded::Many(decoded))
            }
            other => Err(Error::UnsupportedPayload {
                found: json_type(other).to_string(),
            }),
        }
    }

    /// Parse JSON text, then decode it.
    pub fn decode_str(&self, text: &str, target: ClassId) -> Result<Decoded> {
        let data: Json = serde_json::from_str(text)?;
        self.decode(&data, target)
    }

    /// Decode a payload that must not be an array.
    pub fn decode_one(&self, data: &Json, target: ClassId) -> Result<Option<Instance>> {
        match data {
            Json::Array(_) => Err(Error::UnsupportedPayload {
                found: "array".to_string(),
            }),
            other => Ok(self.decode(other, target)?.into_one()),
        }
    }

    /// Decode one mapping.
    ///
    /// The effective class is resolved through every applicable adapter,
    /// each recording its type key as an extra attribute. Keys are then
    /// matched against the effective class: object-list fields holding an
    /// array, child slots holding an object and object fields are decoded
    /// recursively; keys of computed fields are skipped; anything else
    /// passes through raw for the initializer.
    pub(crate) fn decode_object(
        &self,
        data: &Map<String, Json>,
        target: ClassId,
        options: DecodeOptions,
        depth: usize,
    ) -> Result<Instance> {
        self.check_depth(depth)?;
        let target_class = self.class(target)?;

        let mut class = Arc::clone(target_class);
        let mut extra_attributes = Vec::new();
        for adapter in &self.adapters {
            if adapter.applies_to(target_class) {
                let subtype = adapter.resolve(target_class, data)?;
                class = Arc::clone(self.class(subtype)?);
                trace!(
                    target = target_class.name(),
                    resolved = class.name(),
                    type_key = adapter.type_key(),
                    "resolved subtype"
                );
                extra_attributes.push(adapter.type_key().to_string());
            }
        }

        let mut values = Vec::with_capacity(data.len());
        for (key, raw) in data {
            let (field, child) = match class.member_by_key(key) {
                Some(Member::Field(i)) => (Some(&class.fields()[i]), None),
                Some(Member::Child(i)) => (None, Some(class.children()[i].class().id())),
                None => (None, None),
            };
            // Computed values are rendered on encode and recomputed on read.
            if field.is_some_and(|f| f.kind().is_computed()) {
                continue;
            }
            let value = match (field.map(Field::kind), raw, child) {
                (Some(FieldKind::ObjectList(item)), Json::Array(items), _) => {
                    let mut decoded = Vec::with_capacity(items.len());
                    for item_data in items {
                        decoded.push(self.decode_nested(item_data, item.id, options, depth + 1)?);
                    }
                    Value::List(decoded)
                }
                (None, Json::Object(_), Some(child)) => {
                    self.decode_nested(raw, child, options, depth + 1)?
                }
                (Some(FieldKind::Object(item)), _, _) => {
                    self.decode_nested(raw, item.id, options, depth + 1)?
                }
                _ => Value::from_json(raw),
            };
            let name = field.map_or(key.as_str(), Field::name);
            values.push((name.to_string(), value));
        }

        let args = InitArgs {
            values,
            accept_unknown: options.accept_unknown,
            extra_attributes,
        };
        Ok(class.instantiate(args)?)
    }

    /// Decode a nested value: objects become instances, arrays are walked,
    /// everything else is left for field validation to judge.
    fn decode_nested(
        &self,
        data: &Json,
        target: ClassId,
        options: DecodeOptions,
        depth: usize,
    ) -> Result<Value> {
        self.check_depth(depth)?;
        match data {
            Json::Object(map) => Ok(Value::from(self.decode_object(map, target, options, depth)?)),
            Json::Array(items) => {
                let mut decoded = Vec::with_capacity(items.len());
                for item in items {
                    decoded.push(self.decode_nested(item, target, options, depth + 1)?);
                }
                Ok(Value::List(decoded))
            }
            other => Ok(Value::from_json(other)),
        }
    }
}

// ──────────────────────────────────────────────
// Encode
// ──────────────────────────────────────────────

impl Converter {
    /// Encode one instance as a JSON object.
    ///
    /// Discriminators of every applicable adapter come first, then each
    /// merged member in encode order.
    pub fn encode(&self, instance: &Instance) -> Result<Json> {
        Ok(Json::Object(self.encode_instance(instance, 1)?))
    }

    pub fn encode_all(&self, instances: &[Instance]) -> Result<Json> {
        let mut items = Vec::with_capacity(instances.len());
        for inst in instances {
            items.push(self.encode(inst)?);
        }
        Ok(Json::Array(items))
    }

    pub fn encode_decoded(&self, decoded: &Decoded) -> Result<Json> {
        match decoded {
            Decoded::Null => Ok(Json::Null),
            Decoded::One(inst) => self.encode(inst),
            Decoded::Many(items) => self.encode_all(items),
        }
    }

    pub fn to_string(&self, instance: &Instance) -> Result<String> {
        Ok(serde_json::to_string(&self.encode(instance)?)?)
    }

    pub fn to_string_pretty(&self, instance: &Instance) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.encode(instance)?)?)
    }

    fn encode_instance(&self, instance: &Instance, depth: usize) -> Result<Map<String, Json>> {
        self.check_depth(depth)?;
        let class = instance.class();
        let mut out = Map::new();

        for adapter in &self.adapters {
            if !class.is_a(adapter.base()) {
                continue;
            }
            let value = adapter.discriminator_for(class).ok_or_else(|| {
                let base = self
                    .registry
                    .get(adapter.base())
                    .map(|b| b.name().to_string())
                    .unwrap_or_else(|| adapter.base().to_string());
                SchemaResolutionError::NoSubtypeMatch {
                    class: class.name().to_string(),
                    base,
                }
            })?;
            out.insert(adapter.type_key().to_string(), Json::String(value.to_string()));
        }

        for &member in class.members() {
            let key = class.member_key(member).to_string();
            let encoded = match member {
                Member::Field(i) => {
                    let field = &class.fields()[i];
                    let value = instance.field_value(i)?;
                    self.encode_value(class.name(), field, &value, depth)?
                }
                Member::Child(i) => match instance.child_value(i) {
                    Some(Value::Object(child)) => Json::Object(self.encode_instance(child, depth + 1)?),
                    _ => Json::Null,
                },
            };
            out.insert(key, encoded);
        }
        Ok(out)
    }

    fn encode_value(&self, class: &str, field: &Field, value: &Value, depth: usize) -> Result<Json> {
        match value {
            Value::Object(inst) => Ok(Json::Object(self.encode_instance(inst, depth + 1)?)),
            Value::List(items) => {
                let mut encoded = Vec::with_capacity(items.len());
                for item in items {
                    encoded.push(match item {
                        Value::Object(inst) => Json::Object(self.encode_instance(inst, depth + 1)?),
                        other => field.render_item(class, other)?,
                    });
                }
                Ok(Json::Array(encoded))
            }
            Value::Json(raw) => Ok(raw.clone()),
            other => Ok(field.render(class, other)?),
        }
    }
}

pub(crate) fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
