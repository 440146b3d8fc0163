//! # DomainError
//!
//! Centralized error handling for the thinking-models workspace.
//! Maps domain-specific failures to actionable error kinds; the API layer
//! turns each kind into an HTTP status.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Record not found (e.g., Discussion, Meetup, Action)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// Validation failure (e.g., completion rate out of range, empty title)
    #[error("validation error: {0}")]
    Validation(String),

    /// A status change the transition table does not allow
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Resource already exists or state forbids the operation (e.g., meetup full)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or invalid credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to touch this record
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Infrastructure failure (e.g., hashing backend, token signing)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// A specialized Result type for domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("Meetup", "m9");
        assert_eq!(err.to_string(), "Meetup not found with ID m9");
    }

    #[test]
    fn transition_message_uses_display_forms() {
        let err = DomainError::transition("completed", "pending");
        assert_eq!(
            err.to_string(),
            "invalid status transition from completed to pending"
        );
    }
}
