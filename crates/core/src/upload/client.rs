//! Asset upload client.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error};

use super::credentials::{StoreConfiguration, UploadCredentials};
use super::error::UploadError;
use super::types::{
    BoundingBox, IMAGE_RESOURCE_TYPE, StoreFailure, StoreResponse, StoreUploadRequest,
    UploadedAsset,
};

/// A remote asset store that accepts one upload per call.
///
/// Implementations perform at most one network round trip and never retry.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Upload `request` using `credentials`.
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        request: StoreUploadRequest,
    ) -> Result<StoreResponse, StoreFailure>;
}

/// Uploads validated buffers and turns store responses into [`UploadedAsset`]s.
#[derive(Clone)]
pub struct AssetUploadClient {
    configuration: Arc<StoreConfiguration>,
    store: Arc<dyn AssetStore>,
    transform: BoundingBox,
}

impl AssetUploadClient {
    /// Create a client with the default 1000x1000 limit transform.
    #[must_use]
    pub fn new(configuration: Arc<StoreConfiguration>, store: Arc<dyn AssetStore>) -> Self {
        Self {
            configuration,
            store,
            transform: BoundingBox::default(),
        }
    }

    /// Override the resize constraint.
    #[must_use]
    pub fn with_transform(mut self, transform: BoundingBox) -> Self {
        self.transform = transform;
        self
    }

    /// The store configuration this client checks before uploading.
    #[must_use]
    pub fn configuration(&self) -> &StoreConfiguration {
        &self.configuration
    }

    /// Upload `buffer` into `folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Store credentials are incomplete (no network call is made)
    /// - `buffer` is empty (no network call is made)
    /// - The store rejects the upload or cannot be reached
    /// - The store response lacks a URL or public identifier
    pub async fn upload(&self, buffer: Bytes, folder: &str) -> Result<UploadedAsset, UploadError> {
        let credentials = self.configuration.configure_store_client_once()?;

        if buffer.is_empty() {
            return Err(UploadError::EmptyBuffer);
        }

        let request = StoreUploadRequest {
            bytes: buffer,
            folder: folder.to_string(),
            resource_type: IMAGE_RESOURCE_TYPE,
            transform: self.transform,
        };

        debug!(folder, size = request.bytes.len(), "Uploading image to asset store");

        let response = self
            .store
            .upload(credentials, request)
            .await
            .map_err(|failure| {
                error!(code = ?failure.code, error = %failure.message, "Asset store upload error");
                UploadError::from(failure)
            })?;

        UploadedAsset::try_from(response).inspect_err(|e| {
            error!(error = %e, "Asset store returned an incomplete response");
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::MockAssetStore;
    use super::*;
    use crate::upload::{StaticCredentialSource, STORE_API_SECRET_VAR, STORE_API_KEY_VAR, STORE_NAME_VAR};

    fn configured() -> Arc<StoreConfiguration> {
        Arc::new(StoreConfiguration::new(StaticCredentialSource::complete(
            "demo", "key", "secret",
        )))
    }

    fn client(configuration: Arc<StoreConfiguration>, store: &Arc<MockAssetStore>) -> AssetUploadClient {
        AssetUploadClient::new(configuration, store.clone())
    }

    #[tokio::test]
    async fn test_upload_success() {
        let store = Arc::new(MockAssetStore::succeeding("https://x/y.jpg", "chat-app/abc"));
        let client = client(configured(), &store);

        let asset = client
            .upload(Bytes::from_static(b"jpeg-bytes"), "chat-app")
            .await
            .unwrap();

        assert_eq!(asset.secure_url, "https://x/y.jpg");
        assert_eq!(asset.public_id, "chat-app/abc");
        assert_eq!(store.calls(), 1);

        let request = store.last_request().unwrap();
        assert_eq!(request.folder, "chat-app");
        assert_eq!(request.resource_type, "image");
        assert_eq!(request.transform, BoundingBox::CHAT_IMAGE);
        assert_eq!(request.bytes.as_ref(), b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_empty_buffer_makes_no_call() {
        let store = Arc::new(MockAssetStore::succeeding("https://x/y.jpg", "abc"));
        let client = client(configured(), &store);

        let err = client.upload(Bytes::new(), "chat-app").await.unwrap_err();

        assert!(matches!(err, UploadError::EmptyBuffer));
        assert_eq!(err.to_string(), "Empty buffer provided for upload");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_call() {
        let store = Arc::new(MockAssetStore::succeeding("https://x/y.jpg", "abc"));
        let configuration = Arc::new(StoreConfiguration::new(
            StaticCredentialSource::empty()
                .with(STORE_NAME_VAR, "demo")
                .with(STORE_API_KEY_VAR, "key"),
        ));
        let client = client(configuration, &store);

        let err = client
            .upload(Bytes::from_static(b"data"), "chat-app")
            .await
            .unwrap_err();

        match err {
            UploadError::NotConfigured(missing) => {
                assert_eq!(missing.missing(), &[STORE_API_SECRET_VAR]);
            }
            other => panic!("expected NotConfigured, got {other:?}"),
        }
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_preserves_code() {
        let store = Arc::new(MockAssetStore::returning(Err(StoreFailure::new(
            Some(420),
            "rate limited",
        ))));
        let client = client(configured(), &store);

        let err = client
            .upload(Bytes::from_static(b"data"), "chat-app")
            .await
            .unwrap_err();

        assert_eq!(err.code(), Some(420));
        assert!(err.to_string().contains("rate limited"));
        assert!(err.to_string().contains("420"));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_url_is_failure() {
        let store = Arc::new(MockAssetStore::returning(Ok(StoreResponse {
            secure_url: None,
            public_id: Some("abc".to_string()),
        })));
        let client = client(configured(), &store);

        let err = client
            .upload(Bytes::from_static(b"data"), "chat-app")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::MissingUrl));
    }

    #[tokio::test]
    async fn test_custom_transform_forwarded() {
        let store = Arc::new(MockAssetStore::succeeding("https://x/y.jpg", "abc"));
        let transform = BoundingBox {
            max_width: 256,
            max_height: 256,
        };
        let client = client(configured(), &store).with_transform(transform);

        client
            .upload(Bytes::from_static(b"data"), "avatars")
            .await
            .unwrap();

        assert_eq!(store.last_request().unwrap().transform, transform);
    }
}
