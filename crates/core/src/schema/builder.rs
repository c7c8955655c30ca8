//! Declaration surface for one class body.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, ValidationError};
use crate::field::Field;
use crate::instance::{InitArgs, Instance};
use crate::schema::{Class, ClassId};
use crate::value::Value;

/// Zero-argument accessor backing a computed field.
pub type Accessor = Arc<dyn Fn(&Instance) -> Result<Value, ValidationError> + Send + Sync>;

/// Explicit constructor replacing the generated initializer.
pub type Constructor = Arc<dyn Fn(&Arc<Class>, InitArgs) -> Result<Instance, Error> + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) enum MemberDecl {
    Field(String, Field),
    Child(String, ClassId),
}

/// Collects one class's own declarations before registration.
///
/// ```ignore
/// let student = registry.register(
///     ClassBuilder::new("Student")
///         .field("first_name", Field::string().serialized_name("fn"))
///         .field("scores", Field::object_list(score)),
/// )?;
/// ```
#[derive(Clone)]
pub struct ClassBuilder {
    pub(crate) name: String,
    pub(crate) parent: Option<ClassId>,
    pub(crate) members: Vec<MemberDecl>,
    pub(crate) accessors: Vec<(String, Accessor)>,
    pub(crate) constructor: Option<Constructor>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            parent: None,
            members: Vec::new(),
            accessors: Vec::new(),
            constructor: None,
        }
    }

    pub fn extends(mut self, parent: ClassId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.members.push(MemberDecl::Field(name.into(), field));
        self
    }

    /// Statically embedded child object. The attribute name is also its key.
    pub fn child(mut self, name: impl Into<String>, class: ClassId) -> Self {
        self.members.push(MemberDecl::Child(name.into(), class));
        self
    }

    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Instance) -> Result<Value, ValidationError> + Send + Sync + 'static,
    {
        self.accessors.push((name.into(), Arc::new(accessor)));
        self
    }

    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&Arc<Class>, InitArgs) -> Result<Instance, Error> + Send + Sync + 'static,
    {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ClassBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassBuilder")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("members", &self.members)
            .field(
                "accessors",
                &self.accessors.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .field("constructor", &self.constructor.is_some())
            .finish()
    }
}
