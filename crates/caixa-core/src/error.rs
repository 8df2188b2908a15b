//! # Error Types
//!
//! Domain-specific error types for caixa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  caixa-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                      │
//! │  ├── ValidationError  - Input validation failures                  │
//! │  └── LifecycleError   - Rejected status transitions                │
//! │                                                                     │
//! │  caixa-db errors (separate crate)                                  │
//! │  └── DbError          - Store operation failures                   │
//! │                                                                     │
//! │  caixa-service errors                                              │
//! │  └── ApiError         - What the presentation layer sees           │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal: every variant maps to a user-visible message and
//! the UI returns to its previous stable state.

use thiserror::Error;

use crate::types::RegisterStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The register is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Recording a transaction against a closed register
    /// - Closing an already-closed register
    #[error("Register {register_id} is {current_status}, cannot perform operation")]
    InvalidRegisterState {
        register_id: String,
        current_status: RegisterStatus,
    },

    /// A status transition outside the permitted edges.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Lifecycle Error
// =============================================================================

/// Rejected status transition.
///
/// Callers surface this as a warning toast rather than a hard failure:
/// the write is skipped and the form stays on screen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// `from → to` is not one of the permitted edges of the state machine.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: RegisterStatus,
        to: RegisterStatus,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or greater (opening balance).
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g. not a UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LifecycleError::InvalidTransition {
            from: RegisterStatus::Reconciled,
            to: RegisterStatus::Open,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition: reconciled -> open"
        );

        let err = CoreError::InvalidRegisterState {
            register_id: "r1".to_string(),
            current_status: RegisterStatus::Closed,
        };
        assert_eq!(
            err.to_string(),
            "Register r1 is closed, cannot perform operation"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "operator_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_lifecycle_converts_to_core_error() {
        let err = LifecycleError::InvalidTransition {
            from: RegisterStatus::Open,
            to: RegisterStatus::Reconciled,
        };
        let core_err: CoreError = err.into();
        assert!(matches!(core_err, CoreError::Lifecycle(_)));
    }
}
