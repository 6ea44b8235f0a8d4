//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! The HTTP status mapping lives in the API layer.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Missing, empty or malformed input
    Validation(String),
    /// Uniqueness violation (ISBN, member email)
    Conflict(String),
    /// Referenced id absent; carries the entity name
    NotFound(&'static str),
    /// Foreign id absent when issuing a loan
    InvalidReference(String),
    /// No available copies left for the book
    Capacity,
    /// Loan was already returned
    AlreadyReturned,
    /// Database/persistence error
    Database(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "{}", msg),
            DomainError::Conflict(msg) => write!(f, "{}", msg),
            DomainError::NotFound(what) => write!(f, "{} not found", what),
            DomainError::InvalidReference(msg) => write!(f, "{}", msg),
            DomainError::Capacity => write!(f, "No available copies"),
            DomainError::AlreadyReturned => write!(f, "Loan already returned"),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in the service layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}
