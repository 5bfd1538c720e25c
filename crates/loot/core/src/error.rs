//! Common error infrastructure for loot-core.
//!
//! This module provides the shared severity classification and the
//! build-time misconfiguration error. Domain-specific errors live next to the
//! code that produces them:
//!
//! - [`crate::context::ContextError`]: typed-key lookups
//! - [`crate::convert::ConversionError`]: registry dispatch and node shapes
//! - [`crate::generate::GenerationError`]: weights, pools and providers
//!
//! # Design Principles
//!
//! - **No retries**: every error reflects a data or configuration defect
//! - **Located diagnostics**: conversion and generation errors carry the path of the element that failed
//! - **Severity Classification**: errors are categorized for logging and reporting

/// Severity level of an error, used for categorization and reporting.
///
/// Nothing in this crate is retried, so there is no recoverable level:
/// - **Validation**: malformed or unsupported declarative input
/// - **Internal**: a caller handed the engine inconsistent data (wrong context types, missing facts)
/// - **Fatal**: an invariant of the generation model was violated, or the engine was misconfigured
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// Invalid declarative input, should not be retried without changing the document.
    ///
    /// Examples: unknown discriminator, scalar where a map was required
    Validation,

    /// Caller bug.
    ///
    /// Examples: context value stored under the wrong type, required fact absent
    Internal,

    /// The current operation cannot produce a meaningful result.
    ///
    /// Examples: option weight below 1, empty pool, registry without element name
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates a bug outside the document.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all loot-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by who has to fix the problem, not by impact
pub trait LootError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// A builder was asked to produce a value without one of its required parts.
///
/// Raised by `build()` before any runtime use of the built value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A conversion registry has no discriminator field name.
    #[error("registry '{category}' must have an element name")]
    MissingElementName { category: &'static str },

    /// A conversion context has no owning loader.
    #[error("conversion context must have a loader")]
    MissingLoader,

    /// A generation context has no random source.
    #[error("generation context must have a random source")]
    MissingRandom,
}

impl LootError for BuildError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingElementName { .. } => "BUILD_MISSING_ELEMENT_NAME",
            Self::MissingLoader => "BUILD_MISSING_LOADER",
            Self::MissingRandom => "BUILD_MISSING_RANDOM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_errors_are_fatal() {
        let err = BuildError::MissingElementName {
            category: "conditions",
        };
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.error_code(), "BUILD_MISSING_ELEMENT_NAME");
        assert_eq!(
            err.to_string(),
            "registry 'conditions' must have an element name"
        );
    }

    #[test]
    fn severity_labels() {
        assert_eq!(ErrorSeverity::Validation.as_str(), "validation");
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
    }
}
