//! Per-object value holders.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result, ValidationError};
use crate::schema::{Class, Member};
use crate::value::Value;

/// Arguments for a class's initializer.
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// `(declared name, raw value)` pairs, applied in order.
    pub values: Vec<(String, Value)>,
    pub accept_unknown: bool,
    /// Keys stored verbatim as extras, e.g. a discriminator.
    pub extra_attributes: Vec<String>,
}

impl InitArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }

    pub fn accept_unknown(mut self, accept: bool) -> Self {
        self.accept_unknown = accept;
        self
    }

    pub fn extra_attribute(mut self, key: impl Into<String>) -> Self {
        self.extra_attributes.push(key.into());
        self
    }
}

/// One object of a registered class.
///
/// Slots are addressed through the class's field table; any read before an
/// explicit write returns the value the initializer stored, which is the
/// field's default.
#[derive(Clone)]
pub struct Instance {
    class: Arc<Class>,
    pub(crate) slots: Vec<Value>,
    pub(crate) children: Vec<Value>,
    pub(crate) extras: BTreeMap<String, Value>,
}

impl Instance {
    /// Every slot null, every child slot holding its registered default.
    pub(crate) fn blank(class: &Arc<Class>) -> Self {
        Instance {
            class: Arc::clone(class),
            slots: vec![Value::Null; class.slot_count()],
            children: class
                .children()
                .iter()
                .map(|c| Value::from(c.default.clone()))
                .collect(),
            extras: BTreeMap::new(),
        }
    }

    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Read a field or child by declared name. Computed fields call their
    /// accessor.
    pub fn get(&self, name: &str) -> Result<Value> {
        match self.class.route(name) {
            Some(Member::Field(i)) => self.field_value(i),
            Some(Member::Child(i)) => Ok(self.children[i].clone()),
            None => Err(self.unknown(name)),
        }
    }

    /// Read a field or child by its serialized key.
    pub fn get_serialized(&self, key: &str) -> Result<Value> {
        match self.class.member_by_key(key) {
            Some(Member::Field(i)) => self.field_value(i),
            Some(Member::Child(i)) => Ok(self.children[i].clone()),
            None => Err(self.unknown(key)),
        }
    }

    /// Value of the merged field at `index`.
    pub fn field_value(&self, index: usize) -> Result<Value> {
        let field = &self.class.fields()[index];
        match field.kind() {
            crate::field::FieldKind::Computed { accessor } => {
                let accessor = self.class.accessor(accessor).ok_or_else(|| {
                    ValidationError::Unformattable {
                        class: self.class.name().to_string(),
                        field: field.name().to_string(),
                        message: format!("accessor '{}' is not defined", accessor),
                    }
                })?;
                Ok(accessor(self)?)
            }
            _ => Ok(self.slots[self.class.field_slots[index]].clone()),
        }
    }

    /// Stored value of a non-computed field, without cloning.
    pub fn stored(&self, name: &str) -> Option<&Value> {
        let i = self.class.field_index(name)?;
        if self.class.fields()[i].kind().is_computed() {
            return None;
        }
        self.slots.get(self.class.field_slots[i])
    }

    /// Validate and store a value for a field or child slot.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.class.route(name) {
            Some(Member::Field(i)) => {
                let field = &self.class.fields()[i];
                let validated = field.validate(self.class.name(), value)?;
                let slot = self.class.field_slots[i];
                self.slots[slot] = validated;
                Ok(())
            }
            Some(Member::Child(i)) => self.set_child_at(i, value),
            None => Err(self.unknown(name)),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Instance> {
        let i = self.class.child_index(name)?;
        self.children[i].as_object()
    }

    pub fn set_child(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        match self.class.child_index(name) {
            Some(i) => self.set_child_at(i, value.into()),
            None => Err(self.unknown(name)),
        }
    }

    pub(crate) fn set_child_at(&mut self, index: usize, value: Value) -> Result<()> {
        self.class.check_child(index, &value)?;
        self.children[index] = value;
        Ok(())
    }

    /// Value of a child slot by merged index.
    pub fn child_value(&self, index: usize) -> Option<&Value> {
        self.children.get(index)
    }

    /// Discriminator or accepted unknown attribute.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    pub fn extras(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.extras.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extras.insert(key.into(), value.into());
    }

    fn unknown(&self, key: &str) -> Error {
        Error::UnknownKey {
            class: self.class.name().to_string(),
            key: key.to_string(),
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.class.id() == other.class.id()
            && self.slots == other.slots
            && self.children == other.children
            && self.extras == other.extras
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.class.name());
        for (i, field) in self.class.fields().iter().enumerate() {
            if self.class.field_index(field.name()) != Some(i) || field.kind().is_computed() {
                continue;
            }
            s.field(field.name(), &self.slots[self.class.field_slots[i]]);
        }
        for (child, value) in self.class.children().iter().zip(&self.children) {
            s.field(child.name(), value);
        }
        if !self.extras.is_empty() {
            s.field("extras", &self.extras);
        }
        s.finish()
    }
}
