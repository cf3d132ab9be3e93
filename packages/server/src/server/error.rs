//! Error types for the HTTP surface.
//!
//! Bridges engine and infrastructure errors to HTTP responses via Axum's
//! `IntoResponse`. Every response body carries a stable `code` plus a
//! human-readable `message`; internals stay in the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domains::bookings::BookingError;

/// Application error type for route handlers.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl ApiError {
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "invalid_input")
    }

    /// 401 Unauthorized
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message.into(), "unauthorized")
    }

    /// 403 Forbidden
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message.into(), "forbidden")
    }

    /// 404 Not Found
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} not found"),
            "not_found",
        )
    }

    /// 409 Conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "conflict")
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "internal_error",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "request failed"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Map engine errors onto the HTTP taxonomy.
///
/// Validation failures that are structurally malformed are 400; rule
/// violations on well-formed input (lead time, quotas) are 422; a booked
/// slot is a 409 conflict. Store failures surface as opaque 500s.
impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        let code = err.code();
        match err {
            BookingError::InvalidInput(_) => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string(), code)
            }
            BookingError::LeadTimeViolation { .. }
            | BookingError::UserQuotaExceeded { .. }
            | BookingError::SystemQuotaExceeded { .. } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string(), code)
            }
            BookingError::Unavailable => {
                Self::new(StatusCode::CONFLICT, err.to_string(), code)
            }
            BookingError::Forbidden => {
                Self::new(StatusCode::FORBIDDEN, err.to_string(), code)
            }
            BookingError::NotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string(), code)
            }
            BookingError::Store(source) => {
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    code,
                )
                .with_source(source)
            }
        }
    }
}

/// Convert `anyhow::Error` to `ApiError`.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[invalid_input] Invalid input");
    }

    #[test]
    fn test_booking_error_status_mapping() {
        let cases: Vec<(BookingError, StatusCode)> = vec![
            (
                BookingError::InvalidInput("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                BookingError::LeadTimeViolation { required_days: 3 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                BookingError::UserQuotaExceeded { limit: 5 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                BookingError::SystemQuotaExceeded { limit: 30 },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (BookingError::Unavailable, StatusCode::CONFLICT),
            (BookingError::Forbidden, StatusCode::FORBIDDEN),
            (BookingError::NotFound("booking"), StatusCode::NOT_FOUND),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_store_errors_are_opaque() {
        let err = ApiError::from(BookingError::Store(anyhow::anyhow!(
            "connection refused to db.internal:5432"
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("db.internal"));
    }
}
