//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// The wrapped string is the caller-facing message; `Display` adds a
/// category prefix for logs.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Client sent an invalid request.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Uploaded payload exceeds the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Server is missing required configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// External service reported success with an unusable result.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    ///
    /// Oversized uploads are reported as 400 like every other client input
    /// defect; callers tell them apart through [`AppError::error_code`].
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Validation(_) | Self::PayloadTooLarge(_) => 400,
            Self::Configuration(_)
            | Self::ExternalService(_)
            | Self::Integrity(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Integrity(_) => "INTEGRITY_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the caller-facing message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(msg)
            | Self::Validation(msg)
            | Self::PayloadTooLarge(msg)
            | Self::Configuration(msg)
            | Self::ExternalService(msg)
            | Self::Integrity(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// Returns true for errors caused by the caller rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::PayloadTooLarge(String::new()), 400, "PAYLOAD_TOO_LARGE")]
    #[case(AppError::Configuration(String::new()), 500, "CONFIGURATION_ERROR")]
    #[case(AppError::ExternalService(String::new()), 500, "EXTERNAL_SERVICE_ERROR")]
    #[case(AppError::Integrity(String::new()), 500, "INTEGRITY_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_error_status_and_code(
        #[case] error: AppError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
        assert_eq!(error.is_client_error(), status < 500);
    }

    #[test]
    fn test_too_large_is_distinct_from_validation() {
        let too_large = AppError::PayloadTooLarge("big".into());
        let invalid = AppError::Validation("bad".into());
        assert_eq!(too_large.status_code(), invalid.status_code());
        assert_ne!(too_large.error_code(), invalid.error_code());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Unauthorized("msg".into()).to_string(),
            "Authentication failed: msg"
        );
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::Configuration("msg".into()).to_string(),
            "Configuration error: msg"
        );
        assert_eq!(
            AppError::ExternalService("msg".into()).to_string(),
            "External service error: msg"
        );
    }

    #[test]
    fn test_message_strips_prefix() {
        assert_eq!(
            AppError::Validation("No file uploaded".into()).message(),
            "No file uploaded"
        );
        assert_eq!(AppError::Integrity("no url".into()).message(), "no url");
    }
}
