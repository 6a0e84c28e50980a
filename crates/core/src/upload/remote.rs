//! HTTP implementation of [`AssetStore`] for Cloudinary-compatible upload APIs.
//!
//! Requests are signed: the signed parameters are sorted by name, joined as
//! `key=value` pairs with `&`, suffixed with the API secret and hashed with
//! SHA-256.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parley_shared::config::StoreSettings;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::client::AssetStore;
use super::credentials::UploadCredentials;
use super::types::{StoreFailure, StoreResponse, StoreUploadRequest};

/// Store client speaking the signed multipart upload protocol.
#[derive(Debug, Clone)]
pub struct HttpAssetStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAssetStore {
    /// Create a store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreFailure> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreFailure::new(None, format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Create a store client from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &StoreSettings) -> Result<Self, StoreFailure> {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }

    /// Upload endpoint for an account and resource type.
    #[must_use]
    pub fn upload_url(&self, cloud_name: &str, resource_type: &str) -> String {
        format!(
            "{}/{cloud_name}/{resource_type}/upload",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl AssetStore for HttpAssetStore {
    async fn upload(
        &self,
        credentials: &UploadCredentials,
        request: StoreUploadRequest,
    ) -> Result<StoreResponse, StoreFailure> {
        let mut signed = BTreeMap::new();
        signed.insert("folder", request.folder);
        signed.insert("timestamp", Utc::now().timestamp().to_string());
        signed.insert("transformation", request.transform.transformation());
        let signature = sign_params(&signed, credentials.api_secret());

        let length = request.bytes.len() as u64;
        let file = Part::stream_with_length(reqwest::Body::from(request.bytes), length)
            .file_name("upload");

        let form = signed.into_iter().fold(
            Form::new()
                .part("file", file)
                .text("api_key", credentials.api_key().to_string())
                .text("signature", signature)
                .text("signature_algorithm", "sha256"),
            |form, (key, value)| form.text(key, value),
        );

        let url = self.upload_url(credentials.cloud_name(), request.resource_type);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport_failure)?;

        if status.is_success() {
            parse_success_body(&body)
        } else {
            Err(parse_error_body(status.as_u16(), status.canonical_reason(), &body))
        }
    }
}

/// Compute the request signature over `params`.
#[must_use]
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn transport_failure(err: reqwest::Error) -> StoreFailure {
    StoreFailure::new(err.status().map(|s| s.as_u16()), err.to_string())
}

fn parse_success_body(body: &[u8]) -> Result<StoreResponse, StoreFailure> {
    serde_json::from_slice(body)
        .map_err(|e| StoreFailure::new(None, format!("invalid response from asset store: {e}")))
}

fn parse_error_body(status: u16, reason: Option<&str>, body: &[u8]) -> StoreFailure {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| reason.unwrap_or("Unknown error").to_string());
    StoreFailure::new(Some(status), message)
}
