//! Conversion errors.

use modelson_core::{ConstructionError, ValidationError};

/// A document could not be mapped onto the type hierarchy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaResolutionError {
    #[error("no sub-type key '{type_key}' provided for class {class}")]
    MissingDiscriminator { class: String, type_key: String },

    #[error("sub-type key '{type_key}' for class {class} must be a string, got {found}")]
    InvalidDiscriminator {
        class: String,
        type_key: String,
        found: String,
    },

    #[error("no sub-type registered in type hierarchy of {base} for sub-type key '{value}'")]
    UnknownDiscriminator { base: String, value: String },

    #[error("no sub-type key registered for item of class {class} in type hierarchy of base class {base}")]
    NoSubtypeMatch { class: String, base: String },

    #[error("type hierarchy adapter references unknown class id {reference}")]
    UnknownClass { reference: usize },

    #[error("sub-type key '{value}' registered twice in type hierarchy of {base}")]
    DuplicateDiscriminator { base: String, value: String },

    #[error("sub-type key '{type_key}' of type hierarchy {base} collides with a member of class {class}")]
    DiscriminatorCollision {
        base: String,
        class: String,
        type_key: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] modelson_core::Error),

    #[error(transparent)]
    SchemaResolution(#[from] SchemaResolutionError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV line {line}: {message}")]
    CsvRow { line: u64, message: String },

    #[error("nesting depth exceeds the limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("unable to decode payload of type {found}")]
    UnsupportedPayload { found: String },
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Core(e.into())
    }
}

impl From<ConstructionError> for Error {
    fn from(e: ConstructionError) -> Self {
        Error::Core(e.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
