//! Type hierarchy adapters: discriminator-driven polymorphism.
//!
//! An adapter binds a base class to a discriminator key and an ordered
//! table of `discriminator value -> subtype`. Decoding a document against
//! the base (or, with `accept_subtypes`, against any descendant of the base)
//! reads the key and switches to the named subtype. Encoding an instance of
//! the base or a descendant writes the key back.

use modelson_core::{Class, ClassId, SchemaRegistry};
use serde_json::{Map, Value as Json};

use crate::error::SchemaResolutionError;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeHierarchyAdapter {
    base: ClassId,
    type_key: String,
    subtypes: Vec<(String, ClassId)>,
    accept_subtypes: bool,
}

impl TypeHierarchyAdapter {
    pub fn new(base: ClassId, type_key: impl Into<String>) -> Self {
        TypeHierarchyAdapter {
            base,
            type_key: type_key.into(),
            subtypes: Vec::new(),
            accept_subtypes: false,
        }
    }

    pub fn subtype(mut self, value: impl Into<String>, class: ClassId) -> Self {
        self.subtypes.push((value.into(), class));
        self
    }

    /// Also apply when decoding against a descendant of the base.
    pub fn accept_subtypes(mut self, accept: bool) -> Self {
        self.accept_subtypes = accept;
        self
    }

    pub fn base(&self) -> ClassId {
        self.base
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn subtypes(&self) -> &[(String, ClassId)] {
        &self.subtypes
    }

    pub fn accepts_subtypes(&self) -> bool {
        self.accept_subtypes
    }

    /// Check that every referenced class is registered, that no
    /// discriminator value appears twice and that no class of the hierarchy
    /// encodes a member under the type key.
    pub(crate) fn check(&self, registry: &SchemaRegistry) -> Result<(), SchemaResolutionError> {
        let base = registry
            .get(self.base)
            .ok_or(SchemaResolutionError::UnknownClass {
                reference: self.base.index(),
            })?;
        for (i, (value, class)) in self.subtypes.iter().enumerate() {
            if registry.get(*class).is_none() {
                return Err(SchemaResolutionError::UnknownClass {
                    reference: class.index(),
                });
            }
            if self.subtypes[..i].iter().any(|(v, _)| v == value) {
                return Err(SchemaResolutionError::DuplicateDiscriminator {
                    base: base.name().to_string(),
                    value: value.clone(),
                });
            }
        }
        if let Some(class) = registry
            .classes()
            .find(|c| c.is_a(self.base) && c.member_by_key(&self.type_key).is_some())
        {
            return Err(SchemaResolutionError::DiscriminatorCollision {
                base: base.name().to_string(),
                class: class.name().to_string(),
                type_key: self.type_key.clone(),
            });
        }
        Ok(())
    }

    /// Whether decoding against `target` goes through this adapter.
    pub(crate) fn applies_to(&self, target: &Class) -> bool {
        target.id() == self.base || (self.accept_subtypes && target.is_a(self.base))
    }

    /// Subtype named by the discriminator in `data`.
    pub(crate) fn resolve(
        &self,
        target: &Class,
        data: &Map<String, Json>,
    ) -> Result<ClassId, SchemaResolutionError> {
        let value = match data.get(&self.type_key) {
            None | Some(Json::Null) => {
                return Err(SchemaResolutionError::MissingDiscriminator {
                    class: target.name().to_string(),
                    type_key: self.type_key.clone(),
                })
            }
            Some(Json::String(s)) => s,
            Some(other) => {
                return Err(SchemaResolutionError::InvalidDiscriminator {
                    class: target.name().to_string(),
                    type_key: self.type_key.clone(),
                    found: other.to_string(),
                })
            }
        };
        self.subtypes
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, class)| *class)
            .ok_or_else(|| SchemaResolutionError::UnknownDiscriminator {
                base: target.name().to_string(),
                value: value.clone(),
            })
    }

    /// Discriminator value for an instance of `class`: the exact subtype
    /// entry if there is one, otherwise the entry of its nearest ancestor.
    pub(crate) fn discriminator_for(&self, class: &Class) -> Option<&str> {
        if let Some((value, _)) = self.subtypes.iter().find(|(_, id)| *id == class.id()) {
            return Some(value);
        }
        class.lineage().iter().find_map(|ancestor| {
            self.subtypes
                .iter()
                .find(|(_, id)| id == ancestor)
                .map(|(value, _)| value.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelson_core::{ClassBuilder, Field};
    use serde_json::json;

    fn make_shapes() -> (SchemaRegistry, ClassId, ClassId, ClassId, ClassId) {
        let mut registry = SchemaRegistry::new();
        let shape = registry
            .register(ClassBuilder::new("Shape").field("name", Field::string()))
            .unwrap();
        let circle = registry
            .register(ClassBuilder::new("Circle").extends(shape).field("r", Field::float()))
            .unwrap();
        let square = registry
            .register(ClassBuilder::new("Square").extends(shape).field("side", Field::float()))
            .unwrap();
        let unit_square = registry
            .register(ClassBuilder::new("UnitSquare").extends(square))
            .unwrap();
        (registry, shape, circle, square, unit_square)
    }

    #[test]
    fn test_resolve_by_discriminator() {
        let (registry, shape, circle, square, _) = make_shapes();
        let adapter = TypeHierarchyAdapter::new(shape, "type")
            .subtype("circle", circle)
            .subtype("square", square);
        let base = registry.get(shape).unwrap();

        let data = json!({"type": "square", "side": 2.0});
        let data = data.as_object().unwrap();
        assert_eq!(adapter.resolve(base, data), Ok(square));

        let missing = json!({"side": 2.0});
        assert!(matches!(
            adapter.resolve(base, missing.as_object().unwrap()),
            Err(SchemaResolutionError::MissingDiscriminator { .. })
        ));

        let unknown = json!({"type": "hexagon"});
        assert!(matches!(
            adapter.resolve(base, unknown.as_object().unwrap()),
            Err(SchemaResolutionError::UnknownDiscriminator { .. })
        ));
    }

    #[test]
    fn test_applies_to_descendants_only_when_accepted() {
        let (registry, shape, circle, square, _) = make_shapes();
        let adapter = TypeHierarchyAdapter::new(shape, "type").subtype("circle", circle);
        let square_class = registry.get(square).unwrap();
        assert!(adapter.applies_to(registry.get(shape).unwrap()));
        assert!(!adapter.applies_to(square_class));
        assert!(adapter.accept_subtypes(true).applies_to(square_class));
    }

    #[test]
    fn test_discriminator_prefers_exact_match() {
        let (registry, shape, circle, square, unit_square) = make_shapes();
        let adapter = TypeHierarchyAdapter::new(shape, "type")
            .subtype("shape", shape)
            .subtype("square", square)
            .subtype("circle", circle);
        assert_eq!(
            adapter.discriminator_for(registry.get(circle).unwrap()),
            Some("circle")
        );
        assert_eq!(
            adapter.discriminator_for(registry.get(unit_square).unwrap()),
            Some("square")
        );

        let narrow = TypeHierarchyAdapter::new(shape, "type").subtype("circle", circle);
        assert_eq!(narrow.discriminator_for(registry.get(square).unwrap()), None);
    }

    #[test]
    fn test_check_rejects_duplicates() {
        let (registry, shape, circle, square, _) = make_shapes();
        let adapter = TypeHierarchyAdapter::new(shape, "type")
            .subtype("x", circle)
            .subtype("x", square);
        assert!(matches!(
            adapter.check(&registry),
            Err(SchemaResolutionError::DuplicateDiscriminator { .. })
        ));
        let dangling = TypeHierarchyAdapter::new(shape, "type").subtype("x", ClassId::from_index(99));
        assert!(dangling.check(&registry).is_err());
    }

    #[test]
    fn test_check_rejects_type_key_collision() {
        let (mut registry, shape, circle, _, _) = make_shapes();
        let labelled = registry
            .register(
                ClassBuilder::new("Labelled")
                    .extends(circle)
                    .field("label", Field::string().serialized_name("kind")),
            )
            .unwrap();
        let adapter = TypeHierarchyAdapter::new(shape, "kind").subtype("labelled", labelled);
        assert_eq!(
            adapter.check(&registry),
            Err(SchemaResolutionError::DiscriminatorCollision {
                base: "Shape".to_string(),
                class: "Labelled".to_string(),
                type_key: "kind".to_string(),
            })
        );
        assert!(TypeHierarchyAdapter::new(shape, "name").check(&registry).is_err());
        assert!(TypeHierarchyAdapter::new(shape, "type").check(&registry).is_ok());
    }
}
