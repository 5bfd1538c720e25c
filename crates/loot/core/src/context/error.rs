//! Typed-key lookup errors.

use crate::error::{ErrorSeverity, LootError};

/// Errors raised when reading typed information out of a context.
///
/// Absence is not an error for [`get`](super::LootContext::get); these
/// variants only surface when a value is required or stored with another type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// A required key has no value.
    #[error("value for key \"{key}\" could not be found")]
    MissingValue { key: String },

    /// A value exists under the key's name but was stored with another type.
    #[error("value for key \"{key}\" is a {found}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl LootError for ContextError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingValue { .. } => "CONTEXT_MISSING_VALUE",
            Self::TypeMismatch { .. } => "CONTEXT_TYPE_MISMATCH",
        }
    }
}
