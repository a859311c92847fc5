//! Input validation helpers
//!
//! Centralized text length constants and validation functions for the
//! CRUD handlers.

use shared::error::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// Menu, section and item names
pub const MAX_NAME_LEN: usize = 200;

/// Descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Upper bound for item prices in cents
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
///
/// `empty_code` is the domain code reported for a blank value.
pub fn validate_required_text(
    value: &str,
    field: &str,
    max_len: usize,
    empty_code: ErrorCode,
) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            empty_code,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate an item price in cents.
pub fn validate_price(price: i64) -> Result<(), AppError> {
    if !(0..=MAX_PRICE_CENTS).contains(&price) {
        return Err(AppError::with_message(
            ErrorCode::MenuItemInvalidPrice,
            format!("price must be between 0 and {MAX_PRICE_CENTS} cents"),
        )
        .with_detail("price", price));
    }
    Ok(())
}
