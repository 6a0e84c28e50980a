//! Image upload routes.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::post,
};
use parley_core::upload::{IntakePolicy, UploadOutcome, UploadedAsset};
use serde::Serialize;

use crate::{
    AppState,
    extractors::{ImageUpload, MULTIPART_OVERHEAD},
    middleware::AuthUser,
    response::{ApiError, ApiResponse},
};

/// Creates the upload routes.
///
/// The body limit sits just above the intake limit so the intake check is
/// the one that fires for oversized files.
pub fn routes(policy: &IntakePolicy) -> Router<AppState> {
    Router::new()
        .route("/image", post(upload_image))
        .layer(DefaultBodyLimit::max(
            policy.max_file_size().saturating_add(MULTIPART_OVERHEAD),
        ))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Reference to an uploaded image.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    /// Public HTTPS URL.
    pub url: String,
    /// Store identifier, needed to delete or transform the image later.
    pub public_id: String,
}

impl From<UploadedAsset> for UploadedImage {
    fn from(asset: UploadedAsset) -> Self {
        Self {
            url: asset.secure_url,
            public_id: asset.public_id,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/api/upload/image`
/// Upload one image to the asset store.
#[tracing::instrument(skip_all, fields(user_id = %auth.user_id()))]
async fn upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    ImageUpload(file): ImageUpload,
) -> Result<Json<ApiResponse<UploadedImage>>, ApiError> {
    match state.uploads.handle(file).await {
        UploadOutcome::Succeeded(asset) => Ok(Json(ApiResponse::ok(asset.into()))),
        UploadOutcome::Rejected(e) | UploadOutcome::Failed(e) => Err(e.into()),
    }
}
