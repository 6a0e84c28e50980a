//! Upload pipeline error types.

use parley_shared::AppError;
use thiserror::Error;

use super::credentials::MissingCredentials;

/// Fallback message when the store fails without saying why.
pub const GENERIC_UPLOAD_FAILURE: &str =
    "Failed to upload image. Please check your asset store configuration.";

/// Rejections raised while reading the multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    /// Part content type is not an image.
    #[error("Only image files are allowed")]
    UnsupportedMediaType {
        /// The rejected content type, as sent.
        mime_type: String,
    },

    /// File exceeds the size limit.
    #[error("File size too large. Maximum size is {}.", size_limit(.max))]
    PayloadTooLarge {
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// Request carried no file in the image field.
    #[error("No file uploaded")]
    MissingFile,

    /// File part was present but had no content.
    #[error("Uploaded file is empty")]
    EmptyFile,

    /// A file arrived in a field other than the expected one, or twice.
    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    /// Multipart body could not be parsed.
    #[error("File upload error: {0}")]
    Malformed(String),
}

const MIB: usize = 1024 * 1024;
const KIB: usize = 1024;

/// Render a byte limit in the largest unit that divides it exactly.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn size_limit(max: &usize) -> String {
    let max = *max;
    if max >= MIB && max % MIB == 0 {
        format!("{}MB", max / MIB)
    } else if max >= KIB && max % KIB == 0 {
        format!("{}KB", max / KIB)
    } else {
        format!("{max} bytes")
    }
}

impl IntakeError {
    /// Create a malformed-body error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// True when the rejection is due to the size limit.
    #[must_use]
    pub const fn is_too_large(&self) -> bool {
        matches!(self, Self::PayloadTooLarge { .. })
    }
}

/// Broad category of an [`UploadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    /// Caller sent something unusable.
    ClientInput,
    /// Operator has not configured the store.
    Configuration,
    /// Store or network failed.
    Store,
    /// Store claimed success but returned an unusable result.
    Integrity,
}

/// Errors produced anywhere in the upload pipeline.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Multipart intake rejected the request.
    #[error(transparent)]
    Intake(#[from] IntakeError),

    /// Store credentials are incomplete.
    #[error(
        "Asset store is not configured ({0}). Please set STORE_NAME, STORE_API_KEY, and STORE_API_SECRET in your environment."
    )]
    NotConfigured(#[from] MissingCredentials),

    /// Upload was attempted with no bytes.
    #[error("Empty buffer provided for upload")]
    EmptyBuffer,

    /// Store rejected the upload or could not be reached.
    #[error("{}", store_message(.code, .message))]
    Store {
        /// Status code reported by the store, if any.
        code: Option<u16>,
        /// Message reported by the store or transport.
        message: String,
    },

    /// Request body stopped before the multipart body was complete.
    #[error("File upload interrupted: {0}")]
    Interrupted(String),

    /// Store response carried no secure URL.
    #[error(
        "Failed to upload image to asset store. The upload completed but no URL was returned."
    )]
    MissingUrl,

    /// Store response carried no public identifier.
    #[error(
        "Failed to upload image to asset store. The upload completed but no public identifier was returned."
    )]
    MissingPublicId,
}

#[allow(clippy::ref_option)]
fn store_message(code: &Option<u16>, message: &str) -> String {
    match (*code, message.is_empty()) {
        (Some(code), false) => format!("Asset store error ({code}): {message}"),
        (Some(code), true) => format!("Asset store error ({code}): Unknown error"),
        (None, false) => message.to_string(),
        (None, true) => GENERIC_UPLOAD_FAILURE.to_string(),
    }
}

impl UploadError {
    /// Create a store error.
    #[must_use]
    pub fn store(code: Option<u16>, message: impl Into<String>) -> Self {
        Self::Store {
            code,
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> UploadErrorKind {
        match self {
            Self::Intake(_) | Self::EmptyBuffer => UploadErrorKind::ClientInput,
            Self::NotConfigured(_) => UploadErrorKind::Configuration,
            Self::Store { .. } | Self::Interrupted(_) => UploadErrorKind::Store,
            Self::MissingUrl | Self::MissingPublicId => UploadErrorKind::Integrity,
        }
    }

    /// Returns the store-reported status code, if any.
    #[must_use]
    pub const fn code(&self) -> Option<u16> {
        match self {
            Self::Store { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let message = err.to_string();
        match err {
            UploadError::Intake(IntakeError::PayloadTooLarge { .. }) => {
                Self::PayloadTooLarge(message)
            }
            UploadError::Intake(_) | UploadError::EmptyBuffer => Self::Validation(message),
            UploadError::NotConfigured(_) => Self::Configuration(message),
            UploadError::Store { .. } => Self::ExternalService(message),
            UploadError::Interrupted(_) => Self::Internal(message),
            UploadError::MissingUrl | UploadError::MissingPublicId => Self::Integrity(message),
        }
    }
}
