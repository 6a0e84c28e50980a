//! Image upload pipeline.
//!
//! ```text
//! multipart body ──► IntakePolicy ──► ImageUploadService
//!                                         │
//!                     StoreConfiguration ◄┤ (credentials resolved on first use)
//!                                         │
//!                     AssetUploadClient ──┴──► AssetStore (HttpAssetStore)
//!                                                   │
//!                     UploadOutcome ◄── UploadedAsset / UploadError
//! ```
//!
//! Every request ends in exactly one [`UploadOutcome`]: `Succeeded`,
//! `Rejected` (caller defect) or `Failed` (operator or store defect).

mod client;
mod credentials;
mod error;
mod intake;
mod remote;
mod service;
mod types;

pub use client::{AssetStore, AssetUploadClient};
pub use credentials::{
    CredentialSource, EnvCredentialSource, MissingCredentials, STORE_API_KEY_VAR,
    STORE_API_SECRET_VAR, STORE_NAME_VAR, StaticCredentialSource, StoreConfiguration,
    UploadCredentials,
};
pub use error::{GENERIC_UPLOAD_FAILURE, IntakeError, UploadError, UploadErrorKind};
pub use intake::{DEFAULT_FIELD_NAME, DEFAULT_MAX_FILE_SIZE, IncomingFile, IntakePolicy};
pub use remote::{HttpAssetStore, sign_params};
pub use service::ImageUploadService;
pub use types::{
    BoundingBox, IMAGE_RESOURCE_TYPE, StoreFailure, StoreResponse, StoreUploadRequest,
    UploadOutcome, UploadedAsset,
};
