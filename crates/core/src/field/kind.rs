//! The closed catalog of field kinds and their configuration payloads.

use std::fmt;

use crate::field::Field;
use crate::schema::ClassId;
use crate::value::{FieldEnum, Value};

/// Item types a primitive list accepts without a delegate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Integer,
    String,
    Boolean,
    Float,
}

impl PrimitiveType {
    /// Exact type check, no coercion.
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (PrimitiveType::Integer, Value::Int(_))
                | (PrimitiveType::String, Value::Text(_))
                | (PrimitiveType::Boolean, Value::Bool(_))
                | (PrimitiveType::Float, Value::Float(_))
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Integer => "int",
            PrimitiveType::String => "str",
            PrimitiveType::Boolean => "bool",
            PrimitiveType::Float => "float",
        }
    }
}

/// How a list field validates its items.
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Primitive(PrimitiveType),
    /// Every item is validated and formatted by this field.
    Field(Box<Field>),
}

/// Reference to a registered class from a nested-object field.
///
/// The class name is filled in when the owning class is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRef {
    pub id: ClassId,
    pub(crate) name: String,
}

impl ClassRef {
    pub fn new(id: ClassId) -> Self {
        ClassRef {
            id,
            name: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "class #{}", self.id.index())
        } else {
            write!(f, "class {}", self.name)
        }
    }
}

/// Option set of an enum-backed field.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    pub name: String,
    pub options: Vec<Value>,
}

impl EnumSpec {
    pub fn new(name: impl Into<String>, options: Vec<Value>) -> Self {
        EnumSpec {
            name: name.into(),
            options,
        }
    }

    pub fn of<E: FieldEnum>() -> Self {
        EnumSpec {
            name: E::NAME.to_string(),
            options: E::members().iter().map(|m| m.value()).collect(),
        }
    }

    pub(crate) fn option_strings(&self) -> Vec<String> {
        self.options.iter().map(|o| o.to_json().to_string()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Integer {
        accepts_string: bool,
        min: Option<i64>,
        max: Option<i64>,
    },
    Float {
        accepts_string: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean {
        accepts_string: bool,
    },
    String {
        accepts_non_string: bool,
    },
    StringChoice {
        options: Vec<String>,
    },
    IntegerChoice {
        options: Vec<i64>,
    },
    EnumString(EnumSpec),
    EnumInteger(EnumSpec),
    Date {
        format: String,
    },
    Time {
        format: String,
    },
    /// `format: None` parses free-form text and renders RFC 3339.
    DateTime {
        format: Option<String>,
        time_zone: String,
    },
    TimestampSeconds {
        time_zone: String,
    },
    TimestampMillis {
        time_zone: String,
    },
    Decimal {
        accepts_string: bool,
    },
    Identifier,
    Bytes,
    Json,
    Object(ClassRef),
    ObjectList(ClassRef),
    List {
        item: ListItem,
    },
    Computed {
        accessor: String,
    },
}

impl FieldKind {
    /// Name of the kind as used in type mismatch messages.
    pub fn expected(&self) -> String {
        match self {
            FieldKind::Integer { .. } | FieldKind::IntegerChoice { .. } => "int".to_string(),
            FieldKind::EnumInteger(spec) => format!("int of enum {}", spec.name),
            FieldKind::Float { .. } => "float".to_string(),
            FieldKind::Boolean { .. } => "bool".to_string(),
            FieldKind::String { .. } | FieldKind::StringChoice { .. } => "str".to_string(),
            FieldKind::EnumString(spec) => format!("str of enum {}", spec.name),
            FieldKind::Date { .. } => "date".to_string(),
            FieldKind::Time { .. } => "time".to_string(),
            FieldKind::DateTime { .. }
            | FieldKind::TimestampSeconds { .. }
            | FieldKind::TimestampMillis { .. } => "datetime".to_string(),
            FieldKind::Decimal { .. } => "decimal".to_string(),
            FieldKind::Identifier => "uuid".to_string(),
            FieldKind::Bytes => "bytes".to_string(),
            FieldKind::Json => "dict".to_string(),
            FieldKind::Object(class) => format!("object of {}", class),
            FieldKind::ObjectList(class) => format!("list of {}", class),
            FieldKind::List { .. } => "list".to_string(),
            FieldKind::Computed { .. } => "computed".to_string(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FieldKind::List { .. } | FieldKind::ObjectList(_))
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, FieldKind::Computed { .. })
    }

    /// The class a nested-object or object-list field decodes into.
    pub fn nested_class(&self) -> Option<ClassId> {
        match self {
            FieldKind::Object(class) | FieldKind::ObjectList(class) => Some(class.id),
            _ => None,
        }
    }
}
