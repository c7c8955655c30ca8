//! Declared, typed, validated slots.
//!
//! A `Field` is built once with one of the kind constructors below and the
//! chainable modifiers, then handed to a `ClassBuilder`. Registration names
//! it, checks its configuration and validates its default.
//!
//! Validation of one raw value runs in a fixed order: null policy, kind
//! coercion, type check, domain check. Lists and object lists treat null as
//! an empty list before the null policy applies.

pub mod kind;
pub mod temporal;

use std::collections::HashSet;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{ConstructionError, ValidationError};
use crate::schema::{ClassId, SchemaRegistry};
use crate::value::{FieldEnum, Value};

pub use kind::{ClassRef, EnumSpec, FieldKind, ListItem, PrimitiveType};
pub use temporal::{DEFAULT_DATETIME_FORMAT, DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT};

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    serialized_name: Option<String>,
    nullable: bool,
    default: Value,
    kind: FieldKind,
    /// Modifiers applied to a kind that does not support them; reported at
    /// registration.
    misconfigured: Vec<String>,
}

// ──────────────────────────────────────────────
// Kind constructors
// ──────────────────────────────────────────────

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Field {
            name: String::new(),
            serialized_name: None,
            nullable: true,
            default: Value::Null,
            kind,
            misconfigured: Vec::new(),
        }
    }

    pub fn integer() -> Self {
        Field::new(FieldKind::Integer {
            accepts_string: false,
            min: None,
            max: None,
        })
    }

    pub fn float() -> Self {
        Field::new(FieldKind::Float {
            accepts_string: false,
            min: None,
            max: None,
        })
    }

    pub fn boolean() -> Self {
        Field::new(FieldKind::Boolean {
            accepts_string: false,
        })
    }

    pub fn string() -> Self {
        Field::new(FieldKind::String {
            accepts_non_string: false,
        })
    }

    pub fn string_choice<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Field::new(FieldKind::StringChoice {
            options: options.into_iter().map(Into::into).collect(),
        })
    }

    pub fn integer_choice(options: impl IntoIterator<Item = i64>) -> Self {
        Field::new(FieldKind::IntegerChoice {
            options: options.into_iter().collect(),
        })
    }

    /// String field whose options are the values of `E`.
    pub fn enum_string<E: FieldEnum>() -> Self {
        Field::new(FieldKind::EnumString(EnumSpec::of::<E>()))
    }

    /// Integer field whose options are the values of `E`.
    pub fn enum_integer<E: FieldEnum>() -> Self {
        Field::new(FieldKind::EnumInteger(EnumSpec::of::<E>()))
    }

    pub fn date() -> Self {
        Field::new(FieldKind::Date {
            format: DEFAULT_DATE_FORMAT.to_string(),
        })
    }

    pub fn time() -> Self {
        Field::new(FieldKind::Time {
            format: DEFAULT_TIME_FORMAT.to_string(),
        })
    }

    pub fn datetime() -> Self {
        Field::new(FieldKind::DateTime {
            format: Some(DEFAULT_DATETIME_FORMAT.to_string()),
            time_zone: "UTC".to_string(),
        })
    }

    pub fn timestamp_seconds() -> Self {
        Field::new(FieldKind::TimestampSeconds {
            time_zone: "UTC".to_string(),
        })
    }

    pub fn timestamp_millis() -> Self {
        Field::new(FieldKind::TimestampMillis {
            time_zone: "UTC".to_string(),
        })
    }

    pub fn decimal() -> Self {
        Field::new(FieldKind::Decimal {
            accepts_string: false,
        })
    }

    pub fn identifier() -> Self {
        Field::new(FieldKind::Identifier)
    }

    pub fn bytes() -> Self {
        Field::new(FieldKind::Bytes)
    }

    pub fn json() -> Self {
        Field::new(FieldKind::Json)
    }

    pub fn object(class: ClassId) -> Self {
        Field::new(FieldKind::Object(ClassRef::new(class)))
    }

    pub fn object_list(class: ClassId) -> Self {
        Field::new(FieldKind::ObjectList(ClassRef::new(class)))
    }

    pub fn list(item: PrimitiveType) -> Self {
        Field::new(FieldKind::List {
            item: ListItem::Primitive(item),
        })
    }

    /// List whose items are each validated by `item`.
    pub fn list_of(item: Field) -> Self {
        Field::new(FieldKind::List {
            item: ListItem::Field(Box::new(item)),
        })
    }

    /// Read-only field backed by the class accessor named `accessor`.
    pub fn computed(accessor: impl Into<String>) -> Self {
        Field::new(FieldKind::Computed {
            accessor: accessor.into(),
        })
    }
}

// ──────────────────────────────────────────────
// Modifiers
// ──────────────────────────────────────────────

impl Field {
    pub fn serialized_name(mut self, name: impl Into<String>) -> Self {
        self.serialized_name = Some(name.into());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Numeric, boolean and decimal kinds: coerce text input.
    pub fn accepts_string(mut self, accepts: bool) -> Self {
        match &mut self.kind {
            FieldKind::Integer { accepts_string, .. }
            | FieldKind::Float { accepts_string, .. }
            | FieldKind::Boolean { accepts_string }
            | FieldKind::Decimal { accepts_string } => *accepts_string = accepts,
            other => self
                .misconfigured
                .push(format!("accepts_string is not supported by {}", other.expected())),
        }
        self
    }

    /// String kind: render scalar input to text.
    pub fn accepts_non_string(mut self, accepts: bool) -> Self {
        match &mut self.kind {
            FieldKind::String { accepts_non_string } => *accepts_non_string = accepts,
            other => self.misconfigured.push(format!(
                "accepts_non_string is not supported by {}",
                other.expected()
            )),
        }
        self
    }

    pub fn min(mut self, bound: impl Into<Value>) -> Self {
        let bound = bound.into();
        match (&mut self.kind, &bound) {
            (FieldKind::Integer { min, .. }, Value::Int(i)) => *min = Some(*i),
            (FieldKind::Float { min, .. }, Value::Float(f)) => *min = Some(*f),
            (FieldKind::Float { min, .. }, Value::Int(i)) => *min = Some(*i as f64),
            (other, _) => self.misconfigured.push(format!(
                "min {} is not supported by {}",
                bound.describe(),
                other.expected()
            )),
        }
        self
    }

    pub fn max(mut self, bound: impl Into<Value>) -> Self {
        let bound = bound.into();
        match (&mut self.kind, &bound) {
            (FieldKind::Integer { max, .. }, Value::Int(i)) => *max = Some(*i),
            (FieldKind::Float { max, .. }, Value::Float(f)) => *max = Some(*f),
            (FieldKind::Float { max, .. }, Value::Int(i)) => *max = Some(*i as f64),
            (other, _) => self.misconfigured.push(format!(
                "max {} is not supported by {}",
                bound.describe(),
                other.expected()
            )),
        }
        self
    }

    /// Date, time and date-time kinds: the text format description.
    pub fn format(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        match &mut self.kind {
            FieldKind::Date { format } | FieldKind::Time { format } => *format = description,
            FieldKind::DateTime { format, .. } => *format = Some(description),
            other => self
                .misconfigured
                .push(format!("format is not supported by {}", other.expected())),
        }
        self
    }

    /// Date-time kind: parse text without a declared format.
    pub fn free_form(mut self) -> Self {
        match &mut self.kind {
            FieldKind::DateTime { format, .. } => *format = None,
            other => self
                .misconfigured
                .push(format!("free_form is not supported by {}", other.expected())),
        }
        self
    }

    /// Date-time and timestamp kinds: zone applied to zone-less input.
    pub fn time_zone(mut self, zone: impl Into<String>) -> Self {
        let zone = zone.into();
        match &mut self.kind {
            FieldKind::DateTime { time_zone, .. }
            | FieldKind::TimestampSeconds { time_zone }
            | FieldKind::TimestampMillis { time_zone } => *time_zone = zone,
            other => self
                .misconfigured
                .push(format!("time_zone is not supported by {}", other.expected())),
        }
        self
    }
}

// ──────────────────────────────────────────────
// Accessors
// ──────────────────────────────────────────────

impl Field {
    /// Declared (in-code) name. Empty until the field is registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key used in the JSON representation.
    pub fn serialized(&self) -> &str {
        self.serialized_name.as_deref().unwrap_or(&self.name)
    }

    pub fn explicit_serialized_name(&self) -> Option<&str> {
        self.serialized_name.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

// ──────────────────────────────────────────────
// Validation
// ──────────────────────────────────────────────

impl Field {
    /// Validate and coerce one raw value for storage.
    pub fn validate(&self, class: &str, value: Value) -> Result<Value, ValidationError> {
        if self.kind.is_computed() {
            return Err(self.read_only(class));
        }
        let value = match value {
            Value::Null if self.kind.is_list() => Value::List(Vec::new()),
            other => other,
        };
        if value.is_null() {
            return if self.nullable {
                Ok(Value::Null)
            } else {
                Err(ValidationError::NullNotAllowed {
                    class: class.to_string(),
                    field: self.name.clone(),
                })
            };
        }

        match &self.kind {
            FieldKind::Integer {
                accepts_string,
                min,
                max,
            } => {
                let value = match value {
                    Value::Text(s) if *accepts_string && !s.is_empty() => {
                        s.trim().parse::<i64>().map(Value::Int).unwrap_or(Value::Text(s))
                    }
                    other => other,
                };
                let i = value.as_int().ok_or_else(|| self.mismatch(class, &value))?;
                if min.map_or(false, |m| i < m) || max.map_or(false, |m| i > m) {
                    return Err(self.out_of_bounds(class, i, *min, *max));
                }
                Ok(value)
            }
            FieldKind::Float {
                accepts_string,
                min,
                max,
            } => {
                let value = match value {
                    Value::Text(s) if *accepts_string && !s.is_empty() => {
                        s.trim().parse::<f64>().map(Value::Float).unwrap_or(Value::Text(s))
                    }
                    Value::Int(i) => Value::Float(i as f64),
                    other => other,
                };
                let f = value.as_float().ok_or_else(|| self.mismatch(class, &value))?;
                if !f.is_finite() {
                    return Err(self.malformed(class, "finite float", &f.to_string()));
                }
                if min.map_or(false, |m| f < m) || max.map_or(false, |m| f > m) {
                    return Err(self.out_of_bounds(class, f, *min, *max));
                }
                Ok(value)
            }
            FieldKind::Boolean { accepts_string } => {
                let value = match value {
                    Value::Text(s) if *accepts_string => match s.as_str() {
                        "True" | "true" => Value::Bool(true),
                        "False" | "false" => Value::Bool(false),
                        _ => Value::Text(s),
                    },
                    other => other,
                };
                match value {
                    Value::Bool(_) => Ok(value),
                    other => Err(self.mismatch(class, &other)),
                }
            }
            FieldKind::String { accepts_non_string } => {
                let value = match value {
                    Value::Text(_) => value,
                    other if *accepts_non_string => {
                        other.to_text().map(Value::Text).unwrap_or(other)
                    }
                    other => other,
                };
                match value {
                    Value::Text(_) => Ok(value),
                    other => Err(self.mismatch(class, &other)),
                }
            }
            FieldKind::StringChoice { options } => match &value {
                Value::Text(s) if options.contains(s) => Ok(value),
                Value::Text(s) => Err(self.not_in_options(class, s.clone(), options.clone())),
                other => Err(self.mismatch(class, other)),
            },
            FieldKind::IntegerChoice { options } => match &value {
                Value::Int(i) if options.contains(i) => Ok(value),
                Value::Int(i) => Err(self.not_in_options(
                    class,
                    i.to_string(),
                    options.iter().map(|o| o.to_string()).collect(),
                )),
                other => Err(self.mismatch(class, other)),
            },
            FieldKind::EnumString(spec) | FieldKind::EnumInteger(spec) => {
                let value = match value {
                    Value::Member(m) if m.enum_name == spec.name && spec.options.contains(&m.value) => {
                        *m.value
                    }
                    other => other,
                };
                let type_ok = match (&self.kind, &value) {
                    (FieldKind::EnumString(_), Value::Text(_)) => true,
                    (FieldKind::EnumInteger(_), Value::Int(_)) => true,
                    _ => false,
                };
                if !type_ok {
                    return Err(self.mismatch(class, &value));
                }
                if !spec.options.contains(&value) {
                    return Err(self.not_in_options(
                        class,
                        value.to_json().to_string(),
                        spec.option_strings(),
                    ));
                }
                Ok(value)
            }
            FieldKind::Date { format } => match value {
                Value::Text(s) => temporal::parse_date(&s, format)
                    .map(Value::Date)
                    .ok_or_else(|| self.malformed(class, "date", &s)),
                Value::Date(_) => Ok(value),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::Time { format } => match value {
                Value::Text(s) => temporal::parse_time(&s, format)
                    .map(Value::Time)
                    .ok_or_else(|| self.malformed(class, "time", &s)),
                Value::Time(_) => Ok(value),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::DateTime { format, time_zone } => match value {
                Value::Text(s) => {
                    let zone = self.zone(time_zone);
                    let parsed = match format {
                        Some(format) => temporal::parse_datetime(&s, format, zone),
                        None => temporal::parse_datetime_free_form(&s, zone),
                    };
                    parsed
                        .map(Value::DateTime)
                        .ok_or_else(|| self.malformed(class, "datetime", &s))
                }
                Value::DateTime(_) => Ok(value),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::TimestampSeconds { time_zone } => match value {
                Value::Int(secs) => temporal::from_unix_seconds(secs, self.zone(time_zone))
                    .map(Value::DateTime)
                    .ok_or_else(|| self.malformed(class, "timestamp (in seconds)", &secs.to_string())),
                Value::DateTime(_) => Ok(value),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::TimestampMillis { time_zone } => match value {
                Value::Int(ms) => temporal::from_unix_millis(ms, self.zone(time_zone))
                    .map(Value::DateTime)
                    .ok_or_else(|| {
                        self.malformed(class, "timestamp (in milliseconds)", &ms.to_string())
                    }),
                Value::DateTime(_) => Ok(value),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::Decimal { accepts_string } => match value {
                Value::Decimal(_) => Ok(value),
                Value::Int(i) => Ok(Value::Decimal(Decimal::from(i))),
                Value::Float(f) => Decimal::try_from(f)
                    .map(Value::Decimal)
                    .map_err(|_| self.malformed(class, "decimal", &f.to_string())),
                Value::Text(s) if *accepts_string => Decimal::from_str(s.trim())
                    .map(Value::Decimal)
                    .map_err(|_| self.malformed(class, "decimal", &s)),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::Identifier => match value {
                Value::Uuid(_) => Ok(value),
                Value::Text(s) => Uuid::parse_str(s.trim())
                    .map(Value::Uuid)
                    .map_err(|_| self.malformed(class, "uuid", &s)),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::Bytes => match value {
                Value::Bytes(_) => Ok(value),
                Value::Text(s) => BASE64
                    .decode(s.as_bytes())
                    .map(Value::Bytes)
                    .map_err(|_| self.malformed(class, "base64 bytes", &s)),
                other => Err(self.mismatch(class, &other)),
            },
            FieldKind::Json => match &value {
                Value::Json(v) if v.is_object() => Ok(value),
                other => Err(self.mismatch(class, other)),
            },
            FieldKind::Object(target) => match &value {
                Value::Object(inst) if inst.class().is_a(target.id) => Ok(value),
                other => Err(self.mismatch(class, other)),
            },
            FieldKind::ObjectList(target) => {
                let items = match value {
                    Value::List(items) => items,
                    other => return Err(self.mismatch(class, &other)),
                };
                for item in &items {
                    let ok = matches!(item, Value::Object(inst) if inst.class().is_a(target.id));
                    if !ok {
                        return Err(self.invalid_item(class, target.to_string(), item));
                    }
                }
                Ok(Value::List(items))
            }
            FieldKind::List { item } => {
                let items = match value {
                    Value::List(items) => items,
                    other => return Err(self.mismatch(class, &other)),
                };
                let mut validated = Vec::with_capacity(items.len());
                for value in items {
                    if value.is_null() {
                        return Err(self.invalid_item(class, "a non-null item".to_string(), &value));
                    }
                    match item {
                        ListItem::Primitive(ty) => {
                            if !ty.matches(&value) {
                                return Err(self.invalid_item(class, ty.name().to_string(), &value));
                            }
                            validated.push(value);
                        }
                        ListItem::Field(delegate) => validated.push(delegate.validate(class, value)?),
                    }
                }
                Ok(Value::List(validated))
            }
            FieldKind::Computed { .. } => Err(self.read_only(class)),
        }
    }

    fn zone(&self, time_zone: &str) -> time::UtcOffset {
        temporal::parse_time_zone(time_zone).unwrap_or(time::UtcOffset::UTC)
    }

    fn read_only(&self, class: &str) -> ValidationError {
        ValidationError::ReadOnly {
            class: class.to_string(),
            field: self.name.clone(),
        }
    }

    fn mismatch(&self, class: &str, actual: &Value) -> ValidationError {
        ValidationError::TypeMismatch {
            class: class.to_string(),
            field: self.name.clone(),
            expected: self.kind.expected(),
            actual: actual.describe(),
        }
    }

    fn out_of_bounds<T: ToString>(
        &self,
        class: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> ValidationError {
        ValidationError::OutOfBounds {
            class: class.to_string(),
            field: self.name.clone(),
            value: value.to_string(),
            min: min.map_or_else(|| "-inf".to_string(), |m| m.to_string()),
            max: max.map_or_else(|| "inf".to_string(), |m| m.to_string()),
        }
    }

    fn not_in_options(&self, class: &str, value: String, options: Vec<String>) -> ValidationError {
        ValidationError::NotInOptions {
            class: class.to_string(),
            field: self.name.clone(),
            value,
            options,
        }
    }

    fn malformed(&self, class: &str, expected: &str, value: &str) -> ValidationError {
        ValidationError::Malformed {
            class: class.to_string(),
            field: self.name.clone(),
            expected: expected.to_string(),
            value: value.to_string(),
        }
    }

    fn invalid_item(&self, class: &str, expected: String, found: &Value) -> ValidationError {
        ValidationError::InvalidListItem {
            class: class.to_string(),
            field: self.name.clone(),
            expected,
            found: found.describe(),
        }
    }
}

// ──────────────────────────────────────────────
// Output formatting
// ──────────────────────────────────────────────

impl Field {
    /// Render a stored scalar for JSON output.
    ///
    /// Nested instances and lists are walked by the converter, which calls
    /// back into [`Field::render_item`] for non-object list items.
    pub fn render(&self, class: &str, value: &Value) -> Result<serde_json::Value, ValidationError> {
        let rendered = match (&self.kind, value) {
            (_, Value::Null) => return Ok(serde_json::Value::Null),
            (FieldKind::Date { format }, Value::Date(d)) => temporal::format_date(*d, format),
            (FieldKind::Time { format }, Value::Time(t)) => temporal::format_time(*t, format),
            (FieldKind::DateTime { format, .. }, Value::DateTime(dt)) => {
                temporal::format_datetime(*dt, format.as_deref())
            }
            (FieldKind::TimestampSeconds { .. }, Value::DateTime(dt)) => {
                return Ok(serde_json::Value::from(dt.unix_timestamp()))
            }
            (FieldKind::TimestampMillis { .. }, Value::DateTime(dt)) => {
                return Ok(serde_json::Value::from(temporal::to_unix_millis(*dt)))
            }
            (_, other) => return Ok(other.to_json()),
        };
        rendered
            .map(serde_json::Value::String)
            .map_err(|message| ValidationError::Unformattable {
                class: class.to_string(),
                field: self.name.clone(),
                message,
            })
    }

    /// Render one non-object item of a list field.
    pub fn render_item(&self, class: &str, item: &Value) -> Result<serde_json::Value, ValidationError> {
        match &self.kind {
            FieldKind::List {
                item: ListItem::Field(delegate),
            } => delegate.render(class, item),
            _ => Ok(item.to_json()),
        }
    }
}

// ──────────────────────────────────────────────
// Registration-time checks
// ──────────────────────────────────────────────

impl Field {
    /// Name the field, resolve class references and check its configuration.
    pub(crate) fn prepare(
        &mut self,
        class: &str,
        name: &str,
        registry: &SchemaRegistry,
    ) -> Result<(), ConstructionError> {
        self.name = name.to_string();
        let invalid = |message: String| ConstructionError::InvalidField {
            class: class.to_string(),
            field: name.to_string(),
            message,
        };

        if let Some(problem) = self.misconfigured.first() {
            return Err(invalid(problem.clone()));
        }
        self.check_kind().map_err(invalid)?;

        match &mut self.kind {
            FieldKind::Object(target) | FieldKind::ObjectList(target) => {
                let resolved = registry
                    .get(target.id)
                    .ok_or_else(|| ConstructionError::UnknownClass {
                        class: class.to_string(),
                        reference: target.id.index(),
                    })?;
                target.name = resolved.name().to_string();
            }
            FieldKind::List {
                item: ListItem::Field(delegate),
            } => {
                if delegate.serialized_name.is_some() {
                    return Err(invalid(
                        "list item field should not have a serialized name".to_string(),
                    ));
                }
                delegate.prepare(class, name, registry)?;
            }
            _ => {}
        }

        if self.kind.is_computed() {
            if !self.default.is_null() {
                return Err(invalid("computed fields cannot declare a default".to_string()));
            }
        } else if !self.default.is_null() {
            self.default = self.validate(class, self.default.clone()).map_err(|source| {
                ConstructionError::InvalidDefault {
                    class: class.to_string(),
                    field: name.to_string(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    /// Kind-level configuration checks that need no registry.
    fn check_kind(&self) -> Result<(), String> {
        match &self.kind {
            FieldKind::Integer {
                min: Some(lo),
                max: Some(hi),
                ..
            } if lo > hi => Err(format!("min {} is greater than max {}", lo, hi)),
            FieldKind::Float {
                min: Some(lo),
                max: Some(hi),
                ..
            } if lo > hi => Err(format!("min {} is greater than max {}", lo, hi)),
            FieldKind::StringChoice { options } => check_options(options.iter()),
            FieldKind::IntegerChoice { options } => check_options(options.iter()),
            FieldKind::EnumString(spec) => {
                check_options(spec.option_strings())?;
                if spec.options.iter().any(|o| !matches!(o, Value::Text(_))) {
                    return Err(format!("enum {} has non-string values", spec.name));
                }
                Ok(())
            }
            FieldKind::EnumInteger(spec) => {
                check_options(spec.option_strings())?;
                if spec.options.iter().any(|o| !matches!(o, Value::Int(_))) {
                    return Err(format!("enum {} has non-integer values", spec.name));
                }
                Ok(())
            }
            FieldKind::Date { format } | FieldKind::Time { format } => temporal::check_format(format),
            FieldKind::DateTime { format, time_zone } => {
                if let Some(format) = format {
                    temporal::check_format(format)?;
                }
                temporal::parse_time_zone(time_zone).map(|_| ())
            }
            FieldKind::TimestampSeconds { time_zone } | FieldKind::TimestampMillis { time_zone } => {
                temporal::parse_time_zone(time_zone).map(|_| ())
            }
            _ => Ok(()),
        }
    }
}

/// Option sets must be non-empty and duplicate-free.
fn check_options<T, I>(options: I) -> Result<(), String>
where
    T: std::fmt::Debug,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(format!("{:?}", option)) {
            return Err(format!("duplicate option {:?}", option));
        }
    }
    if seen.is_empty() {
        return Err("empty options".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn named(mut field: Field) -> Field {
        field
            .prepare("Sample", "value", &SchemaRegistry::new())
            .unwrap();
        field
    }

    fn prepare_err(mut field: Field) -> ConstructionError {
        field
            .prepare("Sample", "value", &SchemaRegistry::new())
            .unwrap_err()
    }

    #[derive(Clone, Copy)]
    enum Level {
        Low,
        High,
    }

    impl FieldEnum for Level {
        const NAME: &'static str = "Level";

        fn members() -> &'static [Self] {
            &[Level::Low, Level::High]
        }

        fn value(self) -> Value {
            match self {
                Level::Low => Value::Int(1),
                Level::High => Value::Int(10),
            }
        }
    }

    #[test]
    fn test_null_policy() {
        let nullable = named(Field::integer());
        assert_eq!(nullable.validate("Sample", Value::Null), Ok(Value::Null));

        let strict = named(Field::integer().nullable(false));
        assert!(matches!(
            strict.validate("Sample", Value::Null),
            Err(ValidationError::NullNotAllowed { .. })
        ));
    }

    #[test]
    fn test_integer_coercion_and_bounds() {
        let field = named(Field::integer().accepts_string(true).min(0).max(100));
        assert_eq!(field.validate("Sample", Value::from("42")), Ok(Value::Int(42)));
        assert!(matches!(
            field.validate("Sample", Value::from("abc")),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            field.validate("Sample", Value::Int(101)),
            Err(ValidationError::OutOfBounds { .. })
        ));

        let strict = named(Field::integer());
        assert!(matches!(
            strict.validate("Sample", Value::from("42")),
            Err(ValidationError::TypeMismatch { .. })
        ));
        assert!(matches!(
            strict.validate("Sample", Value::Bool(true)),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_float_promotes_integers() {
        let field = named(Field::float().max(1.5));
        assert_eq!(field.validate("Sample", Value::Int(1)), Ok(Value::Float(1.0)));
        assert!(matches!(
            field.validate("Sample", Value::Float(2.0)),
            Err(ValidationError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_float_rejects_non_finite() {
        let bounded = named(Field::float().accepts_string(true).min(0).max(1));
        for text in ["NaN", "inf", "-inf"] {
            assert!(matches!(
                bounded.validate("Sample", Value::from(text)),
                Err(ValidationError::Malformed { .. })
            ));
        }
        assert!(matches!(
            bounded.validate("Sample", Value::Float(f64::NAN)),
            Err(ValidationError::Malformed { .. })
        ));
        assert_eq!(bounded.validate("Sample", Value::from("0.25")), Ok(Value::Float(0.25)));

        let open = named(Field::float().accepts_string(true));
        assert!(open.validate("Sample", Value::from("inf")).is_err());
    }

    #[test]
    fn test_boolean_text() {
        let field = named(Field::boolean().accepts_string(true));
        assert_eq!(field.validate("Sample", Value::from("True")), Ok(Value::Bool(true)));
        assert_eq!(field.validate("Sample", Value::from("false")), Ok(Value::Bool(false)));
        assert!(field.validate("Sample", Value::from("yes")).is_err());
    }

    #[test]
    fn test_string_accepts_non_string() {
        let field = named(Field::string().accepts_non_string(true));
        assert_eq!(field.validate("Sample", Value::Int(7)), Ok(Value::from("7")));
        let strict = named(Field::string());
        assert!(strict.validate("Sample", Value::Int(7)).is_err());
    }

    #[test]
    fn test_choice_fields() {
        let field = named(Field::string_choice(["a", "b"]));
        assert_eq!(field.validate("Sample", Value::from("a")), Ok(Value::from("a")));
        assert!(matches!(
            field.validate("Sample", Value::from("c")),
            Err(ValidationError::NotInOptions { .. })
        ));

        let ints = named(Field::integer_choice([1, 2, 3]));
        assert!(ints.validate("Sample", Value::Int(2)).is_ok());
        assert!(matches!(
            ints.validate("Sample", Value::Int(4)),
            Err(ValidationError::NotInOptions { .. })
        ));
        assert!(matches!(
            ints.validate("Sample", Value::from("2")),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_enum_normalizes_members() {
        let field = named(Field::enum_integer::<Level>());
        assert_eq!(
            field.validate("Sample", Value::member(Level::High)),
            Ok(Value::Int(10))
        );
        assert_eq!(field.validate("Sample", Value::Int(1)), Ok(Value::Int(1)));
        assert!(matches!(
            field.validate("Sample", Value::Int(5)),
            Err(ValidationError::NotInOptions { .. })
        ));
    }

    #[test]
    fn test_option_set_checks() {
        assert!(matches!(
            prepare_err(Field::string_choice(Vec::<String>::new())),
            ConstructionError::InvalidField { .. }
        ));
        assert!(matches!(
            prepare_err(Field::integer_choice([1, 1])),
            ConstructionError::InvalidField { .. }
        ));
        assert!(matches!(
            prepare_err(Field::integer().min(5).max(1)),
            ConstructionError::InvalidField { .. }
        ));
        assert!(matches!(
            prepare_err(Field::string_choice(["a"]).default_value("b")),
            ConstructionError::InvalidDefault { .. }
        ));
        assert!(matches!(
            prepare_err(Field::string().min(3)),
            ConstructionError::InvalidField { .. }
        ));
    }

    #[test]
    fn test_temporal_kinds() {
        let d = named(Field::date().format("[day]/[month]/[year]"));
        let parsed = d.validate("Sample", Value::from("09/03/2024")).unwrap();
        assert_eq!(parsed, Value::Date(date!(2024-03-09)));
        assert_eq!(
            d.render("Sample", &parsed).unwrap(),
            serde_json::json!("09/03/2024")
        );
        assert!(matches!(
            d.validate("Sample", Value::from("2024-03-09")),
            Err(ValidationError::Malformed { .. })
        ));

        let dt = named(Field::datetime().time_zone("+03:30"));
        let parsed = dt
            .validate("Sample", Value::from("2024-03-09 12:00:00"))
            .unwrap();
        assert_eq!(parsed, Value::DateTime(datetime!(2024-03-09 12:00:00 +3:30)));

        let ts = named(Field::timestamp_millis());
        let parsed = ts.validate("Sample", Value::Int(1_000)).unwrap();
        assert_eq!(parsed, Value::DateTime(datetime!(1970-01-01 00:00:01 UTC)));
        assert_eq!(ts.render("Sample", &parsed).unwrap(), serde_json::json!(1000));

        assert!(matches!(
            prepare_err(Field::datetime().time_zone("Mars/Olympus")),
            ConstructionError::InvalidField { .. }
        ));
        assert!(matches!(
            prepare_err(Field::date().format("[year")),
            ConstructionError::InvalidField { .. }
        ));
    }

    #[test]
    fn test_decimal_identifier_bytes() {
        let dec = named(Field::decimal().accepts_string(true));
        assert_eq!(
            dec.validate("Sample", Value::from("10.25")),
            Ok(Value::Decimal("10.25".parse().unwrap()))
        );
        assert_eq!(
            dec.validate("Sample", Value::Int(3)),
            Ok(Value::Decimal(Decimal::from(3)))
        );

        let id = named(Field::identifier());
        assert!(id
            .validate("Sample", Value::from("67e55044-10b1-426f-9247-bb680e5fe0c8"))
            .is_ok());
        assert!(matches!(
            id.validate("Sample", Value::from("not-a-uuid")),
            Err(ValidationError::Malformed { .. })
        ));

        let bytes = named(Field::bytes());
        assert_eq!(
            bytes.validate("Sample", Value::from("aGk=")),
            Ok(Value::Bytes(b"hi".to_vec()))
        );
    }

    #[test]
    fn test_primitive_list_is_exact() {
        let field = named(Field::list(PrimitiveType::Integer));
        assert_eq!(
            field.validate("Sample", Value::List(vec![Value::Int(1), Value::Int(2)])),
            Ok(Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
        assert!(matches!(
            field.validate("Sample", Value::List(vec![Value::Int(1), Value::Float(2.0)])),
            Err(ValidationError::InvalidListItem { .. })
        ));
        assert!(matches!(
            field.validate("Sample", Value::List(vec![Value::Null])),
            Err(ValidationError::InvalidListItem { .. })
        ));
        assert_eq!(field.validate("Sample", Value::Null), Ok(Value::List(vec![])));
    }

    #[test]
    fn test_list_with_delegate_field() {
        let field = named(Field::list_of(Field::date()));
        let validated = field
            .validate("Sample", Value::List(vec![Value::from("2020-01-02")]))
            .unwrap();
        assert_eq!(validated, Value::List(vec![Value::Date(date!(2020-01-02))]));
        assert_eq!(
            field
                .render_item("Sample", &Value::Date(date!(2020-01-02)))
                .unwrap(),
            serde_json::json!("2020-01-02")
        );
        assert!(matches!(
            prepare_err(Field::list_of(Field::date().serialized_name("d"))),
            ConstructionError::InvalidField { .. }
        ));
    }

    #[test]
    fn test_computed_is_read_only() {
        let field = named(Field::computed("full_name"));
        assert!(matches!(
            field.validate("Sample", Value::from("x")),
            Err(ValidationError::ReadOnly { .. })
        ));
    }
}
