//! Conversion errors.

use std::fmt;

use super::NodeKind;
use crate::context::ContextError;
use crate::error::{ErrorSeverity, LootError};

/// Errors raised while serializing or deserializing loot structures.
///
/// As errors bubble up through tables, pools and lists they are wrapped in
/// [`ConversionError::Located`], building a path such as
/// `pools[0].entries[2].conditions[0]` that names the failing element.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// No converter is registered for a discriminator value.
    #[error("could not find {category} converter for type \"{key}\"")]
    NoConverter { category: &'static str, key: String },

    /// A node has the wrong structural kind.
    #[error("expected {label} to be a {expected}, found {found}")]
    ShapeMismatch {
        label: String,
        expected: &'static str,
        found: NodeKind,
    },

    /// A required field is absent or null.
    #[error("missing required field \"{field}\"")]
    MissingField { field: String },

    /// Neither typed dispatch nor the default deserializer accepted a node.
    #[error("could not deserialize {category}: expected a value at \"{label}\", found {found}")]
    ExpectedValue {
        category: &'static str,
        label: String,
        found: NodeKind,
    },

    /// A converter was handed a value of another concrete type.
    #[error("converter \"{key}\" cannot serialize a value that is not a {expected}")]
    UnexpectedValue { key: String, expected: &'static str },

    /// A field is well-formed but semantically invalid.
    #[error("invalid {label}: {reason}")]
    Invalid { label: String, reason: String },

    /// A conversion fact was read with the wrong type.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// Wraps an error with the path of the element that produced it.
    #[error("at {path}: {cause}")]
    Located {
        path: String,
        cause: Box<ConversionError>,
    },
}

impl ConversionError {
    pub fn invalid(label: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Invalid {
            label: label.into(),
            reason: reason.to_string(),
        }
    }

    /// Prepends `segment` to this error's location.
    #[must_use]
    pub fn at(self, segment: impl fmt::Display) -> Self {
        match self {
            Self::Located { path, cause } => Self::Located {
                path: format!("{segment}.{path}"),
                cause,
            },
            other => Self::Located {
                path: segment.to_string(),
                cause: Box::new(other),
            },
        }
    }

    /// The location of the failing element, if known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Located { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The error without its location.
    pub fn root_cause(&self) -> &ConversionError {
        match self {
            Self::Located { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

impl LootError for ConversionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Context(err) => err.severity(),
            Self::Located { cause, .. } => cause.severity(),
            Self::UnexpectedValue { .. } => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoConverter { .. } => "CONVERT_NO_CONVERTER",
            Self::ShapeMismatch { .. } => "CONVERT_SHAPE_MISMATCH",
            Self::MissingField { .. } => "CONVERT_MISSING_FIELD",
            Self::ExpectedValue { .. } => "CONVERT_EXPECTED_VALUE",
            Self::UnexpectedValue { .. } => "CONVERT_UNEXPECTED_VALUE",
            Self::Invalid { .. } => "CONVERT_INVALID",
            Self::Context(err) => err.error_code(),
            Self::Located { cause, .. } => cause.error_code(),
        }
    }
}
