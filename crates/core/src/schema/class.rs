//! Registered class descriptors and the generated initializer.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, ValidationError};
use crate::field::Field;
use crate::instance::{InitArgs, Instance};
use crate::schema::builder::{Accessor, Constructor};
use crate::schema::ClassId;
use crate::value::Value;

/// A statically embedded child object slot.
#[derive(Debug, Clone)]
pub struct Child {
    pub(crate) name: String,
    pub(crate) class: Arc<Class>,
    /// Built once at registration, cloned into every new instance.
    pub(crate) default: Instance,
}

impl Child {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }
}

/// One entry of the encode order: a merged field or a merged child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Field(usize),
    Child(usize),
}

/// Immutable, ancestor-merged description of one class.
pub struct Class {
    pub(crate) id: ClassId,
    pub(crate) name: String,
    pub(crate) parent: Option<ClassId>,
    /// This class followed by its ancestors, nearest first.
    pub(crate) lineage: Vec<ClassId>,
    /// Own fields, then each ancestor's own fields.
    pub(crate) fields: Vec<Field>,
    /// Slot index of each merged field.
    pub(crate) field_slots: Vec<usize>,
    /// Field that owns each slot: the first merged field with that
    /// serialized name.
    pub(crate) slot_owners: Vec<usize>,
    pub(crate) children: Vec<Child>,
    pub(crate) members: Vec<Member>,
    pub(crate) by_name: HashMap<String, usize>,
    /// Winning member for each JSON key.
    pub(crate) by_key: HashMap<String, Member>,
    pub(crate) child_by_name: HashMap<String, usize>,
    pub(crate) accessors: HashMap<String, Accessor>,
    pub(crate) constructor: Option<Constructor>,
}

impl Class {
    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    pub fn lineage(&self) -> &[ClassId] {
        &self.lineage
    }

    /// True if this class is `other` or descends from it.
    pub fn is_a(&self, other: ClassId) -> bool {
        self.lineage.contains(&other)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Merged members in encode order, one per distinct key.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Field lookup by declared name; descendants shadow ancestors.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_index(name).map(|i| &self.fields[i])
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// The member encoded under `key`, if any.
    pub fn member_by_key(&self, key: &str) -> Option<Member> {
        self.by_key.get(key).copied()
    }

    pub fn field_by_serialized(&self, key: &str) -> Option<&Field> {
        match self.member_by_key(key)? {
            Member::Field(i) => Some(&self.fields[i]),
            Member::Child(_) => None,
        }
    }

    /// Resolve a declared name to a field or child slot. A descendant's
    /// child shadows an ancestor field of the same name.
    pub fn route(&self, name: &str) -> Option<Member> {
        if let Some(Member::Child(i)) = self.member_by_key(name) {
            return Some(Member::Child(i));
        }
        self.field_index(name)
            .map(Member::Field)
            .or_else(|| self.child_index(name).map(Member::Child))
    }

    pub fn child(&self, name: &str) -> Option<&Child> {
        self.child_index(name).map(|i| &self.children[i])
    }

    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.child_by_name.get(name).copied()
    }

    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name)
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Key of a member in the JSON representation.
    pub fn member_key(&self, member: Member) -> &str {
        match member {
            Member::Field(i) => self.fields[i].serialized(),
            Member::Child(i) => &self.children[i].name,
        }
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slot_owners.len()
    }

    /// Build an instance through the explicit constructor, or the generated
    /// initializer when the class chain declares none.
    pub fn instantiate(self: &Arc<Self>, args: InitArgs) -> Result<Instance, Error> {
        match &self.constructor {
            Some(constructor) => constructor(self, args),
            None => self.initialize(args),
        }
    }

    /// The generated initializer.
    ///
    /// Every slot not covered by an argument receives its owner field's
    /// default, which passes through validation like any other value.
    /// Arguments are routed to fields by declared name, then to child slots,
    /// then to the declared extra attributes. Anything else is an
    /// `UnknownKey` error unless unknown keys are accepted.
    pub fn initialize(self: &Arc<Self>, args: InitArgs) -> Result<Instance, Error> {
        let mut instance = Instance::blank(self);

        let supplied_slots: HashSet<usize> = args
            .values
            .iter()
            .filter_map(|(key, _)| match self.route(key) {
                Some(Member::Field(i)) => Some(self.field_slots[i]),
                _ => None,
            })
            .collect();
        for (slot, &owner) in self.slot_owners.iter().enumerate() {
            let field = &self.fields[owner];
            if field.kind().is_computed() || supplied_slots.contains(&slot) {
                continue;
            }
            instance.slots[slot] = field.validate(&self.name, field.default().clone())?;
        }

        let extra_attributes: HashSet<&str> =
            args.extra_attributes.iter().map(String::as_str).collect();
        for (key, value) in args.values {
            match self.route(&key) {
                Some(Member::Field(i)) => {
                    let field = &self.fields[i];
                    instance.slots[self.field_slots[i]] = field.validate(&self.name, value)?;
                    continue;
                }
                Some(Member::Child(i)) => {
                    instance.set_child_at(i, value)?;
                    continue;
                }
                None => {}
            }
            if extra_attributes.contains(key.as_str()) {
                instance.extras.insert(key, value);
            } else if args.accept_unknown {
                warn!(class = %self.name, key = %key, "storing unknown key as auxiliary attribute");
                instance.extras.insert(key, value);
            } else {
                return Err(Error::UnknownKey {
                    class: self.name.clone(),
                    key,
                });
            }
        }
        Ok(instance)
    }

    pub(crate) fn check_child(&self, index: usize, value: &Value) -> Result<(), ValidationError> {
        let child = &self.children[index];
        match value {
            Value::Null => Ok(()),
            Value::Object(inst) if inst.class().is_a(child.class.id) => Ok(()),
            other => Err(ValidationError::TypeMismatch {
                class: self.name.clone(),
                field: child.name.clone(),
                expected: format!("object of class {}", child.class.name),
                actual: other.describe(),
            }),
        }
    }

    /// Summary of the merged schema: member key to kind, in encode order.
    pub fn describe(&self) -> Vec<(String, String)> {
        self.members
            .iter()
            .map(|&member| {
                let kind = match member {
                    Member::Field(i) => self.fields[i].kind().expected(),
                    Member::Child(i) => format!("child of class {}", self.children[i].class.name),
                };
                (self.member_key(member).to_string(), kind)
            })
            .collect()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("lineage", &self.lineage)
            .field(
                "fields",
                &self.fields.iter().map(Field::serialized).collect::<Vec<_>>(),
            )
            .field(
                "children",
                &self.children.iter().map(Child::name).collect::<Vec<_>>(),
            )
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}
