//! Validation errors raised while coercing request input into documents.

use thiserror::Error;

/// Input that cannot become (part of) a valid document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request body was not a JSON object.
    #[error("request body must be a JSON object")]
    NotAnObject,

    /// A required field was absent (or `null`).
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field was present but could not be coerced to its declared type.
    #[error("invalid value for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl ValidationError {
    pub(crate) const fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidField { field, reason }
    }
}
