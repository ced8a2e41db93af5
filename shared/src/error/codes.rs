//! Unified error codes for the content service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors (session, CSRF)
//! - 2xxx: Permission errors
//! - 3xxx: Content section errors
//! - 6xxx: Menu validation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the admin editor can
/// switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Resource not found
    NotFound = 3,
    /// Invalid format (malformed body)
    InvalidFormat = 6,
    /// HTTP method not allowed on this route
    MethodNotAllowed = 9,

    // ==================== 1xxx: Auth ====================
    /// No admin session presented
    NotAuthenticated = 1001,
    /// Session token has expired
    TokenExpired = 1003,
    /// Session token is invalid
    TokenInvalid = 1004,
    /// Anti-forgery token missing
    CsrfTokenMissing = 1010,
    /// Anti-forgery token does not match the session
    CsrfTokenInvalid = 1011,

    // ==================== 2xxx: Permission ====================
    /// Admin role required
    AdminRequired = 2003,

    // ==================== 3xxx: Content ====================
    /// Section name missing or empty
    SectionRequired = 3001,
    /// Section content missing
    ContentRequired = 3002,
    /// Section is computed by the server and cannot be written
    SectionNotEditable = 3003,

    // ==================== 6xxx: Menu ====================
    /// Menu section is not an object
    InvalidMenuSection = 6001,
    /// Menu item is not an object
    InvalidMenuItem = 6002,
    /// Price is not numeric
    InvalidPrice = 6101,
    /// Quantity value is not numeric
    InvalidQuantity = 6201,
    /// Quantity value below the section minimum
    QuantityBelowMinimum = 6202,
    /// Legacy scalar quantity rejected by policy
    LegacyQuantityRejected = 6203,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Document could not be persisted
    StorageError = 9002,
    /// Stored document is unreadable or not a JSON object
    DocumentCorrupted = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidFormat => "Invalid request body",
            ErrorCode::MethodNotAllowed => "Method not allowed",

            // Auth
            ErrorCode::NotAuthenticated => "Unauthorized",
            ErrorCode::TokenExpired => "Session expired",
            ErrorCode::TokenInvalid => "Invalid session",
            ErrorCode::CsrfTokenMissing => "Missing CSRF token",
            ErrorCode::CsrfTokenInvalid => "Invalid CSRF token",

            // Permission
            ErrorCode::AdminRequired => "Admin role required",

            // Content
            ErrorCode::SectionRequired => "Missing section",
            ErrorCode::ContentRequired => "Missing content",
            ErrorCode::SectionNotEditable => "Section is not editable",

            // Menu
            ErrorCode::InvalidMenuSection => "Invalid menu section",
            ErrorCode::InvalidMenuItem => "Invalid menu item",
            ErrorCode::InvalidPrice => "Invalid price",
            ErrorCode::InvalidQuantity => "Invalid quantity",
            ErrorCode::QuantityBelowMinimum => "Quantity below minimum",
            ErrorCode::LegacyQuantityRejected => "Legacy quantity field is not accepted",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageError => "Failed to save content",
            ErrorCode::DocumentCorrupted => "Content document is unreadable",
        }
    }
}

impl From<ErrorCode> for u16 {
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
            3 => Ok(ErrorCode::NotFound),
            6 => Ok(ErrorCode::InvalidFormat),
            9 => Ok(ErrorCode::MethodNotAllowed),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1010 => Ok(ErrorCode::CsrfTokenMissing),
            1011 => Ok(ErrorCode::CsrfTokenInvalid),

            // Permission
            2003 => Ok(ErrorCode::AdminRequired),

            // Content
            3001 => Ok(ErrorCode::SectionRequired),
            3002 => Ok(ErrorCode::ContentRequired),
            3003 => Ok(ErrorCode::SectionNotEditable),

            // Menu
            6001 => Ok(ErrorCode::InvalidMenuSection),
            6002 => Ok(ErrorCode::InvalidMenuItem),
            6101 => Ok(ErrorCode::InvalidPrice),
            6201 => Ok(ErrorCode::InvalidQuantity),
            6202 => Ok(ErrorCode::QuantityBelowMinimum),
            6203 => Ok(ErrorCode::LegacyQuantityRejected),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),
            9004 => Ok(ErrorCode::DocumentCorrupted),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
