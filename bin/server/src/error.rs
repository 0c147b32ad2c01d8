//! HTTP error responses.
//!
//! Every failure reaches the client as a JSON [`Notification`]. Domain
//! rejections are warnings carrying a specific message; store failures are
//! logged and shown as a generic error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventgate_booking::{BookingError, Severity};
use eventgate_platform_access::{AuthenticationError, ProfileError};
use rootcause::Report;
use tracing::{error, warn};

use crate::types::{Level, Notification};

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Errors returned by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    Authentication(Report<AuthenticationError>),
    Booking(Report<BookingError>),
    Profile(Report<ProfileError>),
    /// A malformed path or body.
    BadRequest(String),
    /// A failure already logged at its source.
    Internal,
}

impl From<Report<AuthenticationError>> for ApiError {
    fn from(report: Report<AuthenticationError>) -> Self {
        Self::Authentication(report)
    }
}

impl From<Report<BookingError>> for ApiError {
    fn from(report: Report<BookingError>) -> Self {
        Self::Booking(report)
    }
}

impl From<Report<ProfileError>> for ApiError {
    fn from(report: Report<ProfileError>) -> Self {
        Self::Profile(report)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, Level, String) {
        match self {
            Self::Authentication(report) => {
                let err = report.current_context();
                let status = match err {
                    AuthenticationError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    AuthenticationError::DuplicateEmail => StatusCode::CONFLICT,
                    AuthenticationError::WeakPassword
                    | AuthenticationError::InvalidEmail
                    | AuthenticationError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    AuthenticationError::AccountDisabled => StatusCode::FORBIDDEN,
                    AuthenticationError::ProviderError { .. } => StatusCode::BAD_GATEWAY,
                    AuthenticationError::ProfileUnavailable { .. } => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, Level::Error, err.user_message().to_string())
            }
            Self::Booking(report) => {
                let err = report.current_context();
                let status = match err {
                    BookingError::EventNotFound { .. } => StatusCode::NOT_FOUND,
                    BookingError::EventFull { .. }
                    | BookingError::AlreadyJoined { .. }
                    | BookingError::NotJoined { .. } => StatusCode::CONFLICT,
                    BookingError::InvalidDraft { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    BookingError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                    BookingError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let level = match err.severity() {
                    Severity::Warning => Level::Warning,
                    Severity::Error => Level::Error,
                };
                (status, level, err.user_message())
            }
            Self::Profile(report) => match report.current_context() {
                ProfileError::NotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    Level::Warning,
                    "Profile not found".to_string(),
                ),
                ProfileError::InvalidDisplayName { reason } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Level::Warning,
                    reason.clone(),
                ),
                ProfileError::Store { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Level::Error,
                    GENERIC_FAILURE.to_string(),
                ),
            },
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, Level::Warning, message.clone()),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Level::Error,
                GENERIC_FAILURE.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, level, message) = self.parts();
        match &self {
            Self::Authentication(report) if status.is_server_error() => {
                error!(error = %report, "authentication failed");
            }
            Self::Booking(report) if status.is_server_error() => {
                error!(error = %report, "booking operation failed");
            }
            Self::Profile(report) if status.is_server_error() => {
                error!(error = %report, "profile operation failed");
            }
            Self::Authentication(report) => warn!(error = %report, "authentication rejected"),
            Self::Booking(report) => warn!(error = %report, "booking rejected"),
            Self::Profile(report) => warn!(error = %report, "profile update rejected"),
            Self::BadRequest(_) | Self::Internal => {}
        }
        (status, Json(Notification { level, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventgate_core::EventId;

    #[test]
    fn domain_rejections_are_warnings() {
        let err = ApiError::from(Report::<BookingError>::from(BookingError::EventFull {
            event_id: EventId::new(),
            capacity: 3,
        }));
        let (status, level, message) = err.parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(level, Level::Warning);
        assert_eq!(message, "This event is full");
    }

    #[test]
    fn store_failures_hide_details() {
        let err = ApiError::from(Report::<BookingError>::from(BookingError::Storage {
            details: "connection refused".to_string(),
        }));
        let (status, level, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(level, Level::Error);
        assert_eq!(message, GENERIC_FAILURE);
    }

    #[test]
    fn provider_errors_use_fixed_messages() {
        let err = ApiError::from(Report::<AuthenticationError>::from(
            AuthenticationError::InvalidCredentials,
        ));
        let (status, level, message) = err.parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(level, Level::Error);
        assert_eq!(message, "Incorrect email or password");
    }
}
