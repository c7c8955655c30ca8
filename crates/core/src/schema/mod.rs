//! Schema registrar.
//!
//! Classes are registered once, bottom-up: a class can only reference
//! classes (parents, nested fields, children) that are already registered.
//! Registration names and checks every own field, merges the ancestor chain
//! and caches the result on an immutable [`Class`].

pub mod builder;
pub mod class;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::ConstructionError;
use crate::field::FieldKind;
use crate::instance::InitArgs;

pub use builder::{Accessor, ClassBuilder, Constructor};
pub use class::{Child, Class, Member};

use builder::MemberDecl;

/// Stable, pointer-free handle of a registered class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Handle for a raw index. Meaningful only to the registry that issued it.
    pub fn from_index(index: usize) -> Self {
        ClassId(index)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns every registered class descriptor.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    classes: Vec<Arc<Class>>,
    by_name: HashMap<String, ClassId>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ClassId) -> Option<&Arc<Class>> {
        self.classes.get(id.0)
    }

    /// Lookup that reports an unknown id as a construction error on behalf
    /// of `referrer`.
    pub fn class(&self, id: ClassId, referrer: &str) -> Result<&Arc<Class>, ConstructionError> {
        self.get(id).ok_or_else(|| ConstructionError::UnknownClass {
            class: referrer.to_string(),
            reference: id.0,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn classes(&self) -> impl Iterator<Item = &Arc<Class>> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Register one class body.
    ///
    /// Fails if the body declares two members with the same serialized
    /// name. Members shadowing an ancestor's serialized name are allowed; the
    /// descendant's declaration wins.
    pub fn register(&mut self, builder: ClassBuilder) -> Result<ClassId, ConstructionError> {
        let ClassBuilder {
            name,
            parent,
            members: decls,
            accessors: own_accessors,
            constructor,
        } = builder;

        if self.by_name.contains_key(&name) {
            return Err(ConstructionError::DuplicateClass { class: name });
        }
        let parent = match parent {
            Some(id) => Some(Arc::clone(self.class(id, &name)?)),
            None => None,
        };
        let id = ClassId(self.classes.len());

        // ── own members ──

        let mut seen = HashSet::new();
        let mut own_fields = Vec::new();
        let mut own_children = Vec::new();
        let mut own_order = Vec::new();
        for decl in decls {
            match decl {
                MemberDecl::Field(field_name, mut field) => {
                    field.prepare(&name, &field_name, self)?;
                    if !seen.insert(field.serialized().to_string()) {
                        return Err(ConstructionError::DuplicateSerializedName {
                            class: name,
                            name: field.serialized().to_string(),
                        });
                    }
                    own_order.push(Member::Field(own_fields.len()));
                    own_fields.push(field);
                }
                MemberDecl::Child(child_name, child_id) => {
                    if !seen.insert(child_name.clone()) {
                        return Err(ConstructionError::DuplicateSerializedName {
                            class: name,
                            name: child_name,
                        });
                    }
                    let child_class = Arc::clone(self.class(child_id, &name)?);
                    let default = child_class.instantiate(InitArgs::default()).map_err(|e| {
                        ConstructionError::InvalidChild {
                            class: name.clone(),
                            child: child_name.clone(),
                            source: Box::new(e),
                        }
                    })?;
                    own_order.push(Member::Child(own_children.len()));
                    own_children.push(class::Child {
                        name: child_name,
                        class: child_class,
                        default,
                    });
                }
            }
        }

        // ── accessors ──

        let mut accessors = parent
            .as_ref()
            .map(|p| p.accessors.clone())
            .unwrap_or_default();
        for (accessor_name, accessor) in own_accessors {
            accessors.insert(accessor_name, accessor);
        }
        for field in &own_fields {
            if let FieldKind::Computed { accessor } = field.kind() {
                if !accessors.contains_key(accessor) {
                    return Err(ConstructionError::MissingAccessor {
                        class: name,
                        field: field.name().to_string(),
                        accessor: accessor.clone(),
                    });
                }
            }
        }

        // ── merge with the ancestor chain ──

        let own_field_count = own_fields.len();
        let mut fields = own_fields;
        let mut children = own_children;
        let mut members = own_order;
        let mut lineage = vec![id];
        if let Some(parent) = &parent {
            fields.extend(parent.fields.iter().cloned());
            for child in &parent.children {
                if !children.iter().any(|c| c.name == child.name) {
                    children.push(child.clone());
                }
            }
            for &member in &parent.members {
                members.push(match member {
                    Member::Field(i) => Member::Field(i + own_field_count),
                    Member::Child(i) => {
                        let child_name = &parent.children[i].name;
                        let index = children
                            .iter()
                            .position(|c| &c.name == child_name)
                            .unwrap_or(i);
                        Member::Child(index)
                    }
                });
            }
            lineage.extend(parent.lineage.iter().copied());
        }

        let mut slot_by_key: HashMap<String, usize> = HashMap::new();
        let mut field_slots = Vec::with_capacity(fields.len());
        let mut slot_owners = Vec::new();
        let mut by_name = HashMap::new();
        for (i, field) in fields.iter().enumerate() {
            let key = field.serialized().to_string();
            let slot = *slot_by_key.entry(key).or_insert_with(|| {
                slot_owners.push(i);
                slot_owners.len() - 1
            });
            field_slots.push(slot);
            by_name.entry(field.name().to_string()).or_insert(i);
        }
        let child_by_name = children
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();

        let mut by_key = HashMap::new();
        members.retain(|&member| {
            let key = match member {
                Member::Field(i) => fields[i].serialized(),
                Member::Child(i) => children[i].name.as_str(),
            };
            if by_key.contains_key(key) {
                return false;
            }
            by_key.insert(key.to_string(), member);
            true
        });

        let constructor = constructor.or_else(|| parent.as_ref().and_then(|p| p.constructor.clone()));

        debug!(
            class = %name,
            id = id.0,
            fields = fields.len(),
            children = children.len(),
            depth = lineage.len(),
            "registered class"
        );

        let class = Class {
            id,
            name: name.clone(),
            parent: parent.as_ref().map(|p| p.id),
            lineage,
            fields,
            field_slots,
            slot_owners,
            children,
            members,
            by_name,
            by_key,
            child_by_name,
            accessors,
            constructor,
        };
        self.classes.push(Arc::new(class));
        self.by_name.insert(name, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ValidationError};
    use crate::field::Field;
    use crate::value::Value;

    fn make_chain(registry: &mut SchemaRegistry) -> ClassId {
        let a = registry
            .register(ClassBuilder::new("A").field("a", Field::integer().default_value(1)))
            .unwrap();
        let b = registry
            .register(
                ClassBuilder::new("B")
                    .extends(a)
                    .field("b", Field::integer().default_value(2)),
            )
            .unwrap();
        let c = registry
            .register(
                ClassBuilder::new("C")
                    .extends(b)
                    .field("c", Field::integer().default_value(3)),
            )
            .unwrap();
        registry
            .register(
                ClassBuilder::new("D")
                    .extends(c)
                    .field("d", Field::integer().default_value(4)),
            )
            .unwrap()
    }

    #[test]
    fn test_four_level_defaults() {
        let mut registry = SchemaRegistry::new();
        let d = make_chain(&mut registry);
        let class = registry.get(d).unwrap();
        let inst = class.instantiate(InitArgs::default()).unwrap();
        for (name, expected) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
            assert_eq!(inst.get(name).unwrap(), Value::Int(expected), "field {}", name);
        }
        assert_eq!(class.lineage().len(), 4);
        assert!(class.is_a(registry.lookup("A").unwrap()));
        assert!(!registry.get(registry.lookup("A").unwrap()).unwrap().is_a(d));
    }

    #[test]
    fn test_duplicate_serialized_name_in_one_body() {
        let mut registry = SchemaRegistry::new();
        let err = registry
            .register(
                ClassBuilder::new("Person")
                    .field("first_name", Field::string().serialized_name("name"))
                    .field("name", Field::string()),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::DuplicateSerializedName {
                class: "Person".to_string(),
                name: "name".to_string(),
            }
        );
        assert!(registry.lookup("Person").is_none());
    }

    #[test]
    fn test_descendant_shadows_ancestor_name() {
        let mut registry = SchemaRegistry::new();
        let base = registry
            .register(ClassBuilder::new("Base").field("label", Field::string().default_value("base")))
            .unwrap();
        let derived = registry
            .register(
                ClassBuilder::new("Derived")
                    .extends(base)
                    .field("label", Field::string().default_value("derived")),
            )
            .unwrap();
        let class = registry.get(derived).unwrap();
        assert_eq!(class.fields().len(), 2);
        assert_eq!(class.members().len(), 1);
        let inst = class.instantiate(InitArgs::default()).unwrap();
        assert_eq!(inst.get("label").unwrap(), Value::from("derived"));
    }

    #[test]
    fn test_unknown_references() {
        let mut registry = SchemaRegistry::new();
        let missing = ClassId(7);
        assert!(matches!(
            registry.register(ClassBuilder::new("X").extends(missing)),
            Err(ConstructionError::UnknownClass { reference: 7, .. })
        ));
        assert!(matches!(
            registry.register(ClassBuilder::new("Y").field("z", Field::object(missing))),
            Err(ConstructionError::UnknownClass { .. })
        ));
        let first = registry.register(ClassBuilder::new("Z")).unwrap();
        assert_eq!(first.index(), 0);
        assert!(matches!(
            registry.register(ClassBuilder::new("Z")),
            Err(ConstructionError::DuplicateClass { .. })
        ));
    }

    #[test]
    fn test_computed_needs_accessor() {
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.register(
                ClassBuilder::new("Person").field("full", Field::computed("full_name"))
            ),
            Err(ConstructionError::MissingAccessor { .. })
        ));

        let person = registry
            .register(
                ClassBuilder::new("Person")
                    .field("first", Field::string().default_value("Ada"))
                    .field("last", Field::string().default_value("Lovelace"))
                    .field("full", Field::computed("full_name"))
                    .accessor("full_name", |inst| {
                        let first = inst.stored("first").and_then(Value::as_str).unwrap_or("");
                        let last = inst.stored("last").and_then(Value::as_str).unwrap_or("");
                        Ok(Value::from(format!("{} {}", first, last)))
                    }),
            )
            .unwrap();
        let mut inst = registry
            .get(person)
            .unwrap()
            .instantiate(InitArgs::default())
            .unwrap();
        assert_eq!(inst.get("full").unwrap(), Value::from("Ada Lovelace"));
        assert!(matches!(
            inst.set("full", "x"),
            Err(Error::Validation(ValidationError::ReadOnly { .. }))
        ));
    }

    #[test]
    fn test_explicit_constructor_is_inherited() {
        let mut registry = SchemaRegistry::new();
        let base = registry
            .register(
                ClassBuilder::new("Counter")
                    .field("count", Field::integer().default_value(0))
                    .constructor(|class, args| {
                        let mut inst = class.initialize(args.accept_unknown(true))?;
                        inst.set("count", 100)?;
                        Ok(inst)
                    }),
            )
            .unwrap();
        let derived = registry
            .register(ClassBuilder::new("SubCounter").extends(base))
            .unwrap();
        let class = registry.get(derived).unwrap();
        assert!(class.has_constructor());
        let inst = class
            .instantiate(InitArgs::new().with("anything", 1))
            .unwrap();
        assert_eq!(inst.get("count").unwrap(), Value::Int(100));
        assert_eq!(inst.extra("anything"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_child_slots() {
        let mut registry = SchemaRegistry::new();
        let address = registry
            .register(ClassBuilder::new("Address").field("city", Field::string().default_value("Tehran")))
            .unwrap();
        let person = registry
            .register(ClassBuilder::new("Person").child("address", address))
            .unwrap();
        let class = registry.get(person).unwrap();
        let inst = class.instantiate(InitArgs::default()).unwrap();
        let child = inst.child("address").unwrap();
        assert_eq!(child.get("city").unwrap(), Value::from("Tehran"));

        assert!(matches!(
            registry.register(
                ClassBuilder::new("Bad")
                    .field("address", Field::string())
                    .child("address", address)
            ),
            Err(ConstructionError::DuplicateSerializedName { .. })
        ));
    }
}
