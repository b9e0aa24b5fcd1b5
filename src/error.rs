//! Unified error handling for route-arbiter.
//!
//! This module provides the error hierarchy for the registry: construction-time
//! registration errors, failures reported by handlers during setup/teardown, and
//! the errors surfaced to callers of the registry itself.

use crate::registry::RegistrationId;
use thiserror::Error;

// ============================================================================
// Registration Errors (construction-time validation)
// ============================================================================

/// Errors detected while building a [`Registration`](crate::registry::Registration).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("registration claims no paths")]
    NoPaths,

    #[error("empty path pattern")]
    EmptyPath,

    #[error("duplicate path pattern: {0}")]
    DuplicatePath(String),
}

// ============================================================================
// Handler Errors (setup/teardown of the underlying handler)
// ============================================================================

/// Errors raised by a [`PathHandler`](crate::registry::PathHandler) during
/// activation or deactivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("setup failed: {0}")]
    Setup(String),

    #[error("teardown failed: {0}")]
    Teardown(String),

    #[error("handler error: {0}")]
    Other(String),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::Teardown(_) => "teardown",
            Self::Other(_) => "other",
        }
    }
}

// ============================================================================
// Registry Errors (surfaced to callers of add/retry)
// ============================================================================

/// Errors returned by [`Registry`](crate::registry::Registry) operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registration {0} is already registered")]
    DuplicateRegistration(RegistrationId),

    /// The binding won `path` but its handler could not be set up.
    ///
    /// The registry state is fully committed when this is returned; the binding
    /// keeps the head position with a failure status.
    #[error("activation of registration {id} failed on {path}: {source}")]
    Activation {
        id: RegistrationId,
        path: String,
        #[source]
        source: HandlerError,
    },

    #[error("registration {0} not found")]
    NotFound(RegistrationId),
}

impl RegistryError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateRegistration(_) => "duplicate_registration",
            Self::Activation { .. } => "activation",
            Self::NotFound(_) => "not_found",
        }
    }
}

/// Result type for registry mutations.
pub type RegistryResult<T = ()> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_codes() {
        assert_eq!(HandlerError::Setup("x".into()).error_code(), "setup");
        assert_eq!(HandlerError::Teardown("x".into()).error_code(), "teardown");
        assert_eq!(HandlerError::Other("x".into()).error_code(), "other");
    }

    #[test]
    fn registry_error_codes() {
        let id = RegistrationId(7);
        assert_eq!(
            RegistryError::DuplicateRegistration(id).error_code(),
            "duplicate_registration"
        );
        assert_eq!(RegistryError::NotFound(id).error_code(), "not_found");
        let err = RegistryError::Activation {
            id,
            path: "/foo".into(),
            source: HandlerError::Setup("boom".into()),
        };
        assert_eq!(err.error_code(), "activation");
    }

    #[test]
    fn activation_error_display_includes_path_and_cause() {
        let err = RegistryError::Activation {
            id: RegistrationId(3),
            path: "/foo".into(),
            source: HandlerError::Setup("boom".into()),
        };
        let text = err.to_string();
        assert!(text.contains("/foo"));
        assert!(text.contains("boom"));
        assert!(text.contains('3'));
    }

    #[test]
    fn activation_error_exposes_source() {
        use std::error::Error as _;
        let err = RegistryError::Activation {
            id: RegistrationId(1),
            path: "/a".into(),
            source: HandlerError::Setup("nope".into()),
        };
        assert!(err.source().is_some());
    }
}
