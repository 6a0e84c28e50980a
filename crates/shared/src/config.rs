//! Application configuration management.
//!
//! Remote store credentials are not part of this config. They are read
//! lazily from the process environment at upload time (see
//! `parley_core::upload::StoreConfiguration`).

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Upload intake configuration.
    #[serde(default)]
    pub upload: UploadSettings,
    /// Remote asset store endpoint configuration.
    #[serde(default)]
    pub store: StoreSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origin (the web client).
    #[serde(default = "default_client_url")]
    pub client_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_url: default_client_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_client_url() -> String {
    "http://localhost:5173".to_string()
}

/// JWT configuration as read from config sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Upload intake configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Logical folder the remote store files uploads under.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Maximum accepted file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Multipart field carrying the image.
    #[serde(default = "default_field_name")]
    pub field_name: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            max_file_size: default_max_file_size(),
            field_name: default_field_name(),
        }
    }
}

fn default_folder() -> String {
    "chat-app".to_string()
}

fn default_max_file_size() -> usize {
    5 * 1024 * 1024
}

fn default_field_name() -> String {
    "image".to_string()
}

/// Remote asset store endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the upload API; the cloud name is appended per request.
    #[serde(default = "default_store_base_url")]
    pub base_url: String,
    /// Request timeout for a single upload round trip.
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
            timeout_secs: default_store_timeout(),
        }
    }
}

fn default_store_base_url() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_store_timeout() -> u64 {
    60
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PARLEY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
