//! # Validation Module
//!
//! Input validation for register operations, run before any business logic.
//!
//! ## Validation Layers
//! ```text
//! Layer 1: Browser form (immediate feedback, not trusted)
//! Layer 2: THIS MODULE (typed, authoritative)
//! Layer 3: SQLite CHECK / NOT NULL / FK constraints (last line)
//! ```
//! Defense in depth: each layer catches a different class of mistake.

use crate::error::ValidationError;
use crate::{DEFAULT_PAGE_SIZE, MAX_NOTES_LEN, MAX_PAGE_SIZE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates an operator id. Must be a well-formed UUID.
pub fn validate_operator_id(id: &str) -> ValidationResult<()> {
    validate_uuid_field("operator_id", id)
}

/// Validates a register id.
pub fn validate_register_id(id: &str) -> ValidationResult<()> {
    validate_uuid_field("register_id", id)
}

fn validate_uuid_field(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Validates an opening balance.
///
/// ## Rules
/// - Must be >= 0; zero is allowed (till opened without a float)
pub fn validate_opening_balance_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "opening_balance".to_string(),
        });
    }
    Ok(())
}

/// Validates a transaction amount. Direction lives on the kind, so the
/// amount itself must be strictly positive.
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Validates a notes field, returning the trimmed value.
///
/// Empty after trimming means "no notes" and maps to `None`.
pub fn validate_notes(field: &str, notes: &str) -> ValidationResult<Option<String>> {
    let notes = notes.trim();

    if notes.len() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    if notes.is_empty() {
        Ok(None)
    } else {
        Ok(Some(notes.to_string()))
    }
}

/// Validates a listing search query, returning the trimmed string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Clamps and validates a page size. `None` falls back to the default.
pub fn validate_page_size(limit: Option<i64>) -> ValidationResult<i64> {
    match limit {
        None => Ok(DEFAULT_PAGE_SIZE),
        Some(n) if n <= 0 || n > MAX_PAGE_SIZE => Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE,
        }),
        Some(n) => Ok(n),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_fields() {
        assert!(validate_operator_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_operator_id("").is_err());
        assert!(validate_operator_id("not-a-uuid").is_err());

        assert!(validate_register_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_register_id("ghost").is_err());
    }

    #[test]
    fn test_validate_opening_balance() {
        assert!(validate_opening_balance_cents(0).is_ok());
        assert!(validate_opening_balance_cents(10_000).is_ok());
        assert!(validate_opening_balance_cents(-1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount_cents(1).is_ok());
        assert!(validate_amount_cents(0).is_err());
        assert!(validate_amount_cents(-500).is_err());
    }

    #[test]
    fn test_validate_notes_trims_and_maps_empty_to_none() {
        assert_eq!(
            validate_notes("opening_notes", "  morning shift  ").unwrap(),
            Some("morning shift".to_string())
        );
        assert_eq!(validate_notes("opening_notes", "   ").unwrap(), None);
        assert!(validate_notes("opening_notes", &"x".repeat(MAX_NOTES_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_page_size() {
        assert_eq!(validate_page_size(None).unwrap(), DEFAULT_PAGE_SIZE);
        assert_eq!(validate_page_size(Some(50)).unwrap(), 50);
        assert!(validate_page_size(Some(0)).is_err());
        assert!(validate_page_size(Some(MAX_PAGE_SIZE + 1)).is_err());
    }
}
