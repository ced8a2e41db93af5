//! HTTP status code mapping for error codes

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    ///
    /// Session and anti-forgery failures all surface as 403 so the admin
    /// editor treats them uniformly (re-login prompt).
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => match self.category() {
                ErrorCategory::Auth | ErrorCategory::Permission => StatusCode::FORBIDDEN,
                ErrorCategory::System => StatusCode::INTERNAL_SERVER_ERROR,
                // 400 Bad Request (default for payload/validation errors)
                ErrorCategory::General | ErrorCategory::Content | ErrorCategory::Menu => {
                    StatusCode::BAD_REQUEST
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_method() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::MethodNotAllowed.http_status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_auth_errors_are_forbidden() {
        for code in [
            ErrorCode::NotAuthenticated,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::CsrfTokenMissing,
            ErrorCode::CsrfTokenInvalid,
            ErrorCode::AdminRequired,
        ] {
            assert_eq!(code.http_status(), StatusCode::FORBIDDEN, "{code:?}");
        }
    }

    #[test]
    fn test_bad_request_status() {
        for code in [
            ErrorCode::InvalidFormat,
            ErrorCode::SectionRequired,
            ErrorCode::ContentRequired,
            ErrorCode::SectionNotEditable,
            ErrorCode::InvalidPrice,
            ErrorCode::InvalidQuantity,
            ErrorCode::QuantityBelowMinimum,
            ErrorCode::LegacyQuantityRejected,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST, "{code:?}");
        }
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(
            ErrorCode::StorageError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::DocumentCorrupted.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
