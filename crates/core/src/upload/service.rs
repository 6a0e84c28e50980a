//! Upload orchestration behind the HTTP endpoint.

use tracing::{debug, error, info, warn};

use super::client::AssetUploadClient;
use super::error::{IntakeError, UploadError};
use super::intake::IncomingFile;
use super::types::{UploadOutcome, UploadedAsset};

/// Runs one upload request from intake result to terminal outcome.
///
/// Holds no per-request state; a single call makes at most one store call
/// and never retries.
#[derive(Clone)]
pub struct ImageUploadService {
    client: AssetUploadClient,
    folder: String,
}

impl ImageUploadService {
    /// Create a service uploading into `folder`.
    #[must_use]
    pub fn new(client: AssetUploadClient, folder: impl Into<String>) -> Self {
        Self {
            client,
            folder: folder.into(),
        }
    }

    /// Folder uploads are filed under.
    #[must_use]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Whether the remote store is currently usable.
    pub fn is_store_configured(&self) -> bool {
        self.client.configuration().is_configured()
    }

    /// Handle an upload whose multipart body has already been read.
    pub async fn handle(&self, file: Option<IncomingFile>) -> UploadOutcome {
        let outcome = UploadOutcome::from(self.run(file).await);

        let state = outcome.state();
        match &outcome {
            UploadOutcome::Succeeded(asset) => {
                info!(state, public_id = %asset.public_id, "Image uploaded");
            }
            UploadOutcome::Rejected(e) => warn!(state, error = %e, "Image upload rejected"),
            UploadOutcome::Failed(e) => {
                error!(state, error = %e, code = ?e.code(), "Image upload failed");
            }
        }

        outcome
    }

    async fn run(&self, file: Option<IncomingFile>) -> Result<UploadedAsset, UploadError> {
        let Some(file) = file else {
            return Err(IntakeError::MissingFile.into());
        };
        debug!(
            mime_type = file.mime_type(),
            size = file.declared_size(),
            "Upload validated"
        );

        if let Err(missing) = self.client.configuration().configure_store_client_once() {
            error!(missing = ?missing.missing(), "Asset store configuration missing");
            return Err(missing.into());
        }

        self.client.upload(file.into_buffer(), &self.folder).await
    }
}
