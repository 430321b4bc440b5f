//! Error types for decoding and entity binding.
//!
//! Two conditions are deliberately **not** errors: a response with a non-2xx
//! status, and an alias root that matches nothing (that yields an empty
//! `Vec`). Callers check `is_empty()` for "no data".

use thiserror::Error;

use crate::Format;

/// The body could not be parsed as the declared format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed {format} document: {message}")]
pub struct DecodeError {
    /// Format the body was decoded as.
    pub format: Format,
    /// Parser diagnostic.
    pub message: String,
}

impl DecodeError {
    /// Creates a [`DecodeError`].
    pub fn new(format: Format, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
        }
    }
}

/// A binding table is inconsistent with its entity type or with the alias map.
///
/// Detected before any document is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Two bindings of the same entity type use the same field name.
    #[error("Entity '{type_name}' binds field '{field}' more than once")]
    DuplicateField {
        /// Entity type identifier.
        type_name: &'static str,
        /// The repeated field name.
        field: String,
    },

    /// The alias map declares a binding mode for a field the entity does not bind.
    #[error("Alias declares field '{field}' for entity '{type_name}', which has no such binding")]
    UnknownField {
        /// Entity type identifier.
        type_name: String,
        /// The undeclared field name.
        field: String,
    },
}

/// Errors returned by a transform call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The body failed structural parsing.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The entity's binding table is invalid for the supplied alias.
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Why a single field kept its default value. Logged, never returned.
#[derive(Debug, Error)]
pub(crate) enum FieldError {
    #[error("expected a scalar value")]
    NotScalar,

    #[error("expected a structured node, found an attribute")]
    NotStructured,

    #[error("'{value}' is not a valid {target}: {message}")]
    Coercion {
        value: String,
        target: &'static str,
        message: String,
    },
}
