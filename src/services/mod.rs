pub mod book_service;
pub mod loan_service;
pub mod member_service;

use crate::domain::DomainError;

/// Trim a required string field, rejecting empty/whitespace-only values.
pub(crate) fn required_field(value: &str, field: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!(
            "Missing or empty field: {}",
            field
        )));
    }
    Ok(trimmed.to_string())
}
