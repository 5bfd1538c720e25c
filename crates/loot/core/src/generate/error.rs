//! Generation errors.

use std::fmt;

use crate::context::ContextError;
use crate::error::{ErrorSeverity, LootError};

/// Errors raised while resolving pools and generating items.
///
/// Conditions evaluating to `false` never produce one of these. Tables and
/// pools wrap failures in [`GenerationError::Located`] on the way out, so a
/// bad weight reads as `pools[1].entries[0]: ...`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// An option reported a weight below 1.
    #[error("option weight must be at least 1, got {weight}")]
    InvalidWeight { weight: i64 },

    /// No option survived to be picked.
    #[error("pool has no options to pick from")]
    EmptyPool,

    #[error(transparent)]
    Context(#[from] ContextError),

    /// A pool asked for more rolls than a single generation allows.
    #[error("pool rolled {rolls} times, the limit is {limit}")]
    TooManyRolls { rolls: i64, limit: i64 },

    /// A provider or modifier received parameters it cannot work with.
    #[error("{message}")]
    Invalid { message: String },

    /// Wraps an error with the path of the element that produced it.
    #[error("at {path}: {cause}")]
    Located {
        path: String,
        cause: Box<GenerationError>,
    },
}

impl GenerationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
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

    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Located { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The error without its location.
    pub fn root_cause(&self) -> &GenerationError {
        match self {
            Self::Located { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

impl LootError for GenerationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Context(err) => err.severity(),
            Self::Located { cause, .. } => cause.severity(),
            Self::InvalidWeight { .. }
            | Self::EmptyPool
            | Self::TooManyRolls { .. }
            | Self::Invalid { .. } => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidWeight { .. } => "GENERATE_INVALID_WEIGHT",
            Self::EmptyPool => "GENERATE_EMPTY_POOL",
            Self::TooManyRolls { .. } => "GENERATE_TOO_MANY_ROLLS",
            Self::Context(err) => err.error_code(),
            Self::Invalid { .. } => "GENERATE_INVALID",
            Self::Located { cause, .. } => cause.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_accumulate_outward() {
        let err = GenerationError::InvalidWeight { weight: 0 }
            .at("entries[1]")
            .at("pools[1]");

        assert_eq!(err.path(), Some("pools[1].entries[1]"));
        assert_eq!(err.root_cause(), &GenerationError::InvalidWeight { weight: 0 });
        assert_eq!(err.error_code(), "GENERATE_INVALID_WEIGHT");
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(
            err.to_string(),
            "at pools[1].entries[1]: option weight must be at least 1, got 0"
        );
    }
}
