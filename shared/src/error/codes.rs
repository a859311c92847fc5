//! Unified error codes for GetTheMenu
//!
//! This module defines all error codes used across menu-server, menu-client and frontend.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 6xxx: Menu catalog errors (menus, sections, items, ordering)
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,

    // ==================== 60xx: Menu ====================
    /// Menu not found
    MenuNotFound = 6001,
    /// Menu name must not be empty
    MenuNameRequired = 6002,

    // ==================== 61xx: Section ====================
    /// Section not found
    SectionNotFound = 6101,
    /// Section name must not be empty
    SectionNameRequired = 6102,

    // ==================== 62xx: Menu item ====================
    /// Menu item not found
    MenuItemNotFound = 6201,
    /// Menu item has invalid price
    MenuItemInvalidPrice = 6202,
    /// Menu item name must not be empty
    MenuItemNameRequired = 6203,

    // ==================== 63xx: Ordering ====================
    /// Drag index outside the collection
    IndexOutOfRange = 6301,
    /// Record does not belong to the requested parent scope
    ScopeMismatch = 6302,
    /// Position batch lists the same id twice
    DuplicatePositionId = 6303,
    /// Only menu items can move between parent groups
    CrossScopeMoveNotAllowed = 6304,
    /// Position must be non-negative
    InvalidPosition = 6305,
    /// Batch would leave a parent's positions out of sequence
    PositionConflict = 6306,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",

            // Menu catalog
            ErrorCode::MenuNotFound => "Menu not found",
            ErrorCode::MenuNameRequired => "Menu name is required",
            ErrorCode::SectionNotFound => "Section not found",
            ErrorCode::SectionNameRequired => "Section name is required",
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemInvalidPrice => "Menu item price is invalid",
            ErrorCode::MenuItemNameRequired => "Menu item name is required",

            // Ordering
            ErrorCode::IndexOutOfRange => "Index is out of range",
            ErrorCode::ScopeMismatch => "Record does not belong to the requested scope",
            ErrorCode::DuplicatePositionId => "Position batch contains a duplicate id",
            ErrorCode::CrossScopeMoveNotAllowed => "Only menu items can move between groups",
            ErrorCode::InvalidPosition => "Position must not be negative",
            ErrorCode::PositionConflict => "Positions changed since the list was loaded",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),

            // Menu catalog
            6001 => Ok(ErrorCode::MenuNotFound),
            6002 => Ok(ErrorCode::MenuNameRequired),
            6101 => Ok(ErrorCode::SectionNotFound),
            6102 => Ok(ErrorCode::SectionNameRequired),
            6201 => Ok(ErrorCode::MenuItemNotFound),
            6202 => Ok(ErrorCode::MenuItemInvalidPrice),
            6203 => Ok(ErrorCode::MenuItemNameRequired),

            // Ordering
            6301 => Ok(ErrorCode::IndexOutOfRange),
            6302 => Ok(ErrorCode::ScopeMismatch),
            6303 => Ok(ErrorCode::DuplicatePositionId),
            6304 => Ok(ErrorCode::CrossScopeMoveNotAllowed),
            6305 => Ok(ErrorCode::InvalidPosition),
            6306 => Ok(ErrorCode::PositionConflict),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);

        assert_eq!(ErrorCode::MenuNotFound.code(), 6001);
        assert_eq!(ErrorCode::SectionNotFound.code(), 6101);
        assert_eq!(ErrorCode::MenuItemNotFound.code(), 6201);
        assert_eq!(ErrorCode::IndexOutOfRange.code(), 6301);
        assert_eq!(ErrorCode::ScopeMismatch.code(), 6302);
        assert_eq!(ErrorCode::DuplicatePositionId.code(), 6303);
        assert_eq!(ErrorCode::CrossScopeMoveNotAllowed.code(), 6304);
        assert_eq!(ErrorCode::PositionConflict.code(), 6306);

        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::IndexOutOfRange.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(6101), Ok(ErrorCode::SectionNotFound));
        assert_eq!(ErrorCode::try_from(6301), Ok(ErrorCode::IndexOutOfRange));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4001), Err(InvalidErrorCode(4001)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_every_code_roundtrips_through_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::MenuNotFound,
            ErrorCode::MenuNameRequired,
            ErrorCode::SectionNotFound,
            ErrorCode::SectionNameRequired,
            ErrorCode::MenuItemNotFound,
            ErrorCode::MenuItemInvalidPrice,
            ErrorCode::MenuItemNameRequired,
            ErrorCode::IndexOutOfRange,
            ErrorCode::ScopeMismatch,
            ErrorCode::DuplicatePositionId,
            ErrorCode::CrossScopeMoveNotAllowed,
            ErrorCode::InvalidPosition,
            ErrorCode::PositionConflict,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
        ];

        for code in codes {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw), Ok(code));
        }
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::NotFound).unwrap();
        assert_eq!(json, "3");

        let json = serde_json::to_string(&ErrorCode::IndexOutOfRange).unwrap();
        assert_eq!(json, "6301");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("6302").unwrap();
        assert_eq!(code, ErrorCode::ScopeMismatch);

        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::MenuItemNotFound), "6201");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::IndexOutOfRange.message(), "Index is out of range");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
