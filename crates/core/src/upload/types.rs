//! Upload request and result types.

use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use super::error::{UploadError, UploadErrorKind};

/// Resource type requested from the store.
pub const IMAGE_RESOURCE_TYPE: &str = "image";

/// Server-side resize constraint: shrink to fit, never enlarge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Maximum width in pixels.
    pub max_width: u32,
    /// Maximum height in pixels.
    pub max_height: u32,
}

impl BoundingBox {
    /// The 1000x1000 limit applied to chat images.
    pub const CHAT_IMAGE: Self = Self {
        max_width: 1000,
        max_height: 1000,
    };

    /// Transformation string in limit crop mode.
    #[must_use]
    pub fn transformation(&self) -> String {
        format!("c_limit,h_{},w_{}", self.max_height, self.max_width)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::CHAT_IMAGE
    }
}

/// Everything the store needs for one upload.
#[derive(Debug, Clone)]
pub struct StoreUploadRequest {
    /// Image bytes.
    pub bytes: Bytes,
    /// Logical folder in the store.
    pub folder: String,
    /// Store resource type.
    pub resource_type: &'static str,
    /// Resize constraint.
    pub transform: BoundingBox,
}

/// Relevant fields of a successful store response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreResponse {
    /// HTTPS URL of the stored asset.
    #[serde(default)]
    pub secure_url: Option<String>,
    /// Store-side identifier, including the folder prefix.
    #[serde(default)]
    pub public_id: Option<String>,
}

/// Failure reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreFailure {
    /// Status code from the store, if it sent one.
    pub code: Option<u16>,
    /// Store or transport message.
    pub message: String,
}

impl StoreFailure {
    /// Create a store failure.
    #[must_use]
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<StoreFailure> for UploadError {
    fn from(failure: StoreFailure) -> Self {
        Self::Store {
            code: failure.code,
            message: failure.message,
        }
    }
}

/// Durable reference to an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    /// HTTPS URL, never empty.
    pub secure_url: String,
    /// Store identifier, never empty.
    pub public_id: String,
}

impl TryFrom<StoreResponse> for UploadedAsset {
    type Error = UploadError;

    fn try_from(response: StoreResponse) -> Result<Self, Self::Error> {
        let secure_url = response
            .secure_url
            .filter(|url| !url.is_empty())
            .ok_or(UploadError::MissingUrl)?;
        let public_id = response
            .public_id
            .filter(|id| !id.is_empty())
            .ok_or(UploadError::MissingPublicId)?;

        Ok(Self {
            secure_url,
            public_id,
        })
    }
}

/// Terminal state of one upload request.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Stored; respond 200.
    Succeeded(UploadedAsset),
    /// Caller defect; respond 400.
    Rejected(UploadError),
    /// Server or store defect; respond 500.
    Failed(UploadError),
}

impl UploadOutcome {
    /// HTTP status for this outcome.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Succeeded(_) => 200,
            Self::Rejected(_) => 400,
            Self::Failed(_) => 500,
        }
    }

    /// Short state name for logs.
    #[must_use]
    pub const fn state(&self) -> &'static str {
        match self {
            Self::Succeeded(_) => "succeeded",
            Self::Rejected(_) => "rejected",
            Self::Failed(_) => "failed",
        }
    }
}

impl From<Result<UploadedAsset, UploadError>> for UploadOutcome {
    fn from(result: Result<UploadedAsset, UploadError>) -> Self {
        match result {
            Ok(asset) => Self::Succeeded(asset),
            Err(err) if err.kind() == UploadErrorKind::ClientInput => Self::Rejected(err),
            Err(err) => Self::Failed(err),
        }
    }
}
