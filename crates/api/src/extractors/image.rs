//! Multipart image extractor.

use axum::{
    extract::{FromRequest, Multipart, Request, multipart::MultipartError},
    http::StatusCode,
};
use bytes::BytesMut;
use parley_core::upload::{IncomingFile, IntakeError, IntakePolicy, UploadError, UploadErrorKind};
use tracing::{error, warn};

use crate::AppState;
use crate::response::ApiError;

/// Bytes allowed on top of the file limit for multipart framing and
/// text fields, so oversize files surface as an intake rejection rather
/// than a bare body-limit error.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// The image file from a multipart request, if one was sent.
///
/// `None` means the body was valid multipart but carried no file in the
/// image field; the handler decides how to answer that.
#[derive(Debug)]
pub struct ImageUpload(pub Option<IncomingFile>);

impl FromRequest<AppState> for ImageUpload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| IntakeError::malformed(e.body_text()))?;

        read_image(multipart, &state.intake)
            .await
            .map(Self)
            .map_err(|e| {
                if e.kind() == UploadErrorKind::ClientInput {
                    warn!(state = "rejected", error = %e, "Multipart intake rejected");
                } else {
                    error!(state = "failed", error = %e, "Multipart intake failed");
                }
                ApiError::from(e)
            })
    }
}

/// Read at most one image file from `multipart`, enforcing `policy`.
///
/// The content type is checked from the part headers before any of the
/// part body is buffered, and the size limit is enforced per chunk. A body
/// that stops arriving mid-stream is [`UploadError::Interrupted`]; every
/// other error is an intake rejection.
pub async fn read_image(
    mut multipart: Multipart,
    policy: &IntakePolicy,
) -> Result<Option<IncomingFile>, UploadError> {
    let to_error = |e: MultipartError| multipart_error(e, policy);
    let mut file = None;

    while let Some(mut field) = multipart.next_field().await.map_err(to_error)? {
        // Plain text fields are ignored.
        if field.file_name().is_none() {
            continue;
        }

        let name = field.name().unwrap_or_default().to_string();
        if name != policy.field_name() || file.is_some() {
            return Err(IntakeError::UnexpectedField(name).into());
        }

        let mime_type = policy.check_content_type(field.content_type())?;
        let file_name = field.file_name().map(str::to_string);

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(to_error)? {
            policy.check_size(buffer.len() + chunk.len())?;
            buffer.extend_from_slice(&chunk);
        }

        file = Some(policy.accept(buffer.freeze(), Some(&mime_type), file_name)?);
    }

    Ok(file)
}

fn multipart_error(err: MultipartError, policy: &IntakePolicy) -> UploadError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        IntakeError::PayloadTooLarge {
            max: policy.max_file_size(),
        }
        .into()
    } else if status.is_server_error() {
        // Reading the request body itself failed.
        UploadError::Interrupted(err.body_text())
    } else {
        IntakeError::malformed(err.body_text()).into()
    }
}
