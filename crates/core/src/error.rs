//! Error taxonomy for schema construction, value validation and instance
//! initialization.

/// Raised once, while a class is being registered. Always fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    /// Two members of one class body share a serialized name.
    #[error("duplicate serialized name '{name}' found in class {class}")]
    DuplicateSerializedName { class: String, name: String },

    /// A class with this name is already registered.
    #[error("class {class} is already registered")]
    DuplicateClass { class: String },

    /// A class, nested field or child slot references an unregistered class.
    #[error("class {class} references unknown class id {reference}")]
    UnknownClass { class: String, reference: usize },

    /// A field's own configuration is inconsistent.
    #[error("invalid configuration for field '{field}' in class {class}: {message}")]
    InvalidField {
        class: String,
        field: String,
        message: String,
    },

    /// A field's default value fails the field's own validation.
    #[error("invalid default for field '{field}' in class {class}: {source}")]
    InvalidDefault {
        class: String,
        field: String,
        #[source]
        source: ValidationError,
    },

    /// The default instance of a child slot could not be built.
    #[error("cannot build default for child '{child}' in class {class}: {source}")]
    InvalidChild {
        class: String,
        child: String,
        #[source]
        source: Box<Error>,
    },

    /// A computed field names an accessor the class chain does not define.
    #[error("computed field '{field}' in class {class} uses undefined accessor '{accessor}'")]
    MissingAccessor {
        class: String,
        field: String,
        accessor: String,
    },
}

/// Raised per value while a field is being set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("null value passed for not nullable field '{field}' in class {class}")]
    NullNotAllowed { class: String, field: String },

    #[error("type mismatch for field '{field}' in class {class}: expected {expected}, got {actual}")]
    TypeMismatch {
        class: String,
        field: String,
        expected: String,
        actual: String,
    },

    #[error("value {value} of field '{field}' in class {class} is out of bounds [{min}, {max}]")]
    OutOfBounds {
        class: String,
        field: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("invalid value {value} for field '{field}' in class {class}, not present in options {options:?}")]
    NotInOptions {
        class: String,
        field: String,
        value: String,
        options: Vec<String>,
    },

    /// Text that should hold a date, time, UUID, base64 payload and so on
    /// could not be parsed.
    #[error("error parsing {expected} '{value}' for field '{field}' in class {class}")]
    Malformed {
        class: String,
        field: String,
        expected: String,
        value: String,
    },

    #[error("invalid list item for field '{field}' in class {class}: expected {expected}, found {found}")]
    InvalidListItem {
        class: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("field '{field}' in class {class} is read-only")]
    ReadOnly { class: String, field: String },

    #[error("cannot format field '{field}' in class {class}: {message}")]
    Unformattable {
        class: String,
        field: String,
        message: String,
    },
}

/// Top-level error for class registration, instance construction and access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A constructor key or accessed name is not declared on the class.
    #[error("key '{key}' was given but is not defined in class {class}")]
    UnknownKey { class: String, key: String },
}

pub type Result<T> = std::result::Result<T, Error>;
