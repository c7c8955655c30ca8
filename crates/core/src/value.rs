//! Runtime values stored in instance slots.
//!
//! `Value` is the closed set of everything a field can hold after
//! validation, plus the loose shapes that arrive from parsed JSON before a
//! field has coerced them.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::instance::Instance;

// ──────────────────────────────────────────────
// Enum members
// ──────────────────────────────────────────────

/// A Rust enum usable as the option set of an enum-backed field.
///
/// Each member maps to its underlying value, which must be `Value::Text`
/// for string enums and `Value::Int` for integer enums.
pub trait FieldEnum: Copy + 'static {
    const NAME: &'static str;

    fn members() -> &'static [Self];

    fn value(self) -> Value;
}

/// A typed enum member that has not yet been normalized by a field.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub enum_name: String,
    pub value: Box<Value>,
}

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Decimal(Decimal),
    Date(Date),
    Time(Time),
    DateTime(OffsetDateTime),
    Uuid(Uuid),
    Bytes(Vec<u8>),
    /// Raw JSON object held by a dict-valued field, passed through untouched.
    Json(serde_json::Value),
    Member(EnumMember),
    Object(Box<Instance>),
    List(Vec<Value>),
}

impl Value {
    /// Wrap a typed enum member.
    pub fn member<E: FieldEnum>(member: E) -> Value {
        Value::Member(EnumMember {
            enum_name: E::NAME.to_string(),
            value: Box::new(member.value()),
        })
    }

    /// Convert a parsed JSON tree into loose values.
    ///
    /// Objects are kept as `Value::Json`; the converter decides separately
    /// whether an object becomes a nested instance.
    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(_) => Value::Json(v.clone()),
        }
    }

    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "str",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Uuid(_) => "uuid",
            Value::Bytes(_) => "bytes",
            Value::Json(_) => "dict",
            Value::Member(_) => "enum member",
            Value::Object(_) => "object",
            Value::List(_) => "list",
        }
    }

    /// Short description of the value for error messages: its type and a
    /// rendering of the value itself.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Object(inst) => format!("object of class {}", inst.class().name()),
            Value::List(items) => format!("list of {} items", items.len()),
            Value::Member(m) => format!("member of enum {}", m.enum_name),
            other => format!("{} {}", other.type_name(), other.to_json()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Instance> {
        match self {
            Value::Object(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Render a scalar without field context.
    ///
    /// Nested instances render as `null` here; encoding them needs the
    /// converter's type hierarchy adapters.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Object(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::Date(d) => serde_json::Value::String(
                d.format(format_description!("[year]-[month]-[day]"))
                    .unwrap_or_else(|_| d.to_string()),
            ),
            Value::Time(t) => serde_json::Value::String(
                t.format(format_description!("[hour]:[minute]:[second]"))
                    .unwrap_or_else(|_| t.to_string()),
            ),
            Value::DateTime(dt) => serde_json::Value::String(
                dt.format(&Rfc3339).unwrap_or_else(|_| dt.to_string()),
            ),
            Value::Uuid(u) => serde_json::Value::String(u.hyphenated().to_string()),
            Value::Bytes(b) => serde_json::Value::String(BASE64.encode(b)),
            Value::Json(v) => v.clone(),
            Value::Member(m) => m.value.to_json(),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }

    /// Text form used by string fields that accept non-string input.
    /// Returns `None` for values that have no scalar text form.
    pub(crate) fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Uuid(u) => Some(u.hyphenated().to_string()),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
                self.to_json().as_str().map(str::to_string)
            }
            Value::Json(v) => Some(v.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Date> for Value {
    fn from(d: Date) -> Self {
        Value::Date(d)
    }
}

impl From<Time> for Value {
    fn from(t: Time) -> Self {
        Value::Time(t)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(dt: OffsetDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Object(Box::new(inst))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
