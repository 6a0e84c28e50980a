//! Lazily resolved credentials for the remote asset store.
//!
//! Credentials are read when an upload is first attempted, never at process
//! start. A complete set is memoized for the life of the process; an
//! incomplete set is not cached, so every attempt re-reads the source.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::info;

/// Environment variable holding the store account (cloud) name.
pub const STORE_NAME_VAR: &str = "STORE_NAME";
/// Environment variable holding the store API key.
pub const STORE_API_KEY_VAR: &str = "STORE_API_KEY";
/// Environment variable holding the store API secret.
pub const STORE_API_SECRET_VAR: &str = "STORE_API_SECRET";

/// Where credential values come from.
pub trait CredentialSource: Send + Sync {
    /// Returns the raw value for `name`, if set.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialSource;

impl CredentialSource for EnvCredentialSource {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed set of credential values, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialSource {
    values: HashMap<String, String>,
}

impl StaticCredentialSource {
    /// Source with no values at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Source with all three store values set.
    #[must_use]
    pub fn complete(cloud_name: &str, api_key: &str, api_secret: &str) -> Self {
        Self::empty()
            .with(STORE_NAME_VAR, cloud_name)
            .with(STORE_API_KEY_VAR, api_key)
            .with(STORE_API_SECRET_VAR, api_secret)
    }

    /// Set one value.
    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl CredentialSource for StaticCredentialSource {
    fn var(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Complete credential set for the remote store.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadCredentials {
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl UploadCredentials {
    /// Store account name.
    #[must_use]
    pub fn cloud_name(&self) -> &str {
        &self.cloud_name
    }

    /// Store API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Store API secret.
    #[must_use]
    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for UploadCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[hidden]")
            .finish()
    }
}

/// One or more credential values are absent or blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {}", .missing.join(", "))]
pub struct MissingCredentials {
    missing: Vec<&'static str>,
}

impl MissingCredentials {
    /// Create from the list of missing variable names.
    #[must_use]
    pub fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }

    /// Names of the missing variables.
    #[must_use]
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }
}

/// Process-wide store configuration with init-on-first-use semantics.
pub struct StoreConfiguration {
    source: Box<dyn CredentialSource>,
    configured: OnceCell<UploadCredentials>,
}

impl fmt::Debug for StoreConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfiguration")
            .field("configured", &self.configured.get().is_some())
            .finish_non_exhaustive()
    }
}

impl StoreConfiguration {
    /// Create a configuration backed by `source`.
    #[must_use]
    pub fn new(source: impl CredentialSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            configured: OnceCell::new(),
        }
    }

    /// Create a configuration backed by the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(EnvCredentialSource)
    }

    /// Read all three values from the source.
    ///
    /// Blank values count as missing. Nothing is cached.
    pub fn resolve_credentials(&self) -> Result<UploadCredentials, MissingCredentials> {
        let read = |name: &str| {
            self.source
                .var(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let cloud_name = read(STORE_NAME_VAR);
        let api_key = read(STORE_API_KEY_VAR);
        let api_secret = read(STORE_API_SECRET_VAR);

        match (cloud_name, api_key, api_secret) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Ok(UploadCredentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            (cloud_name, api_key, api_secret) => {
                let missing = [
                    (STORE_NAME_VAR, cloud_name.is_none()),
                    (STORE_API_KEY_VAR, api_key.is_none()),
                    (STORE_API_SECRET_VAR, api_secret.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(MissingCredentials::new(missing))
            }
        }
    }

    /// Configure the store client on first success; a no-op afterwards.
    ///
    /// Concurrent first calls may both resolve, but only one result is kept
    /// and both are equivalent.
    pub fn configure_store_client_once(&self) -> Result<&UploadCredentials, MissingCredentials> {
        if let Some(credentials) = self.configured.get() {
            return Ok(credentials);
        }

        let credentials = self.resolve_credentials()?;
        Ok(self.configured.get_or_init(|| {
            info!(cloud_name = %credentials.cloud_name, "Asset store client configured");
            credentials
        }))
    }

    /// Whether uploads can currently proceed.
    pub fn is_configured(&self) -> bool {
        self.configured.get().is_some() || self.resolve_credentials().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source whose values can change between reads, counting lookups.
    #[derive(Default)]
    struct MutableSource {
        values: Mutex<HashMap<String, String>>,
        reads: AtomicUsize,
    }

    impl MutableSource {
        fn set(&self, name: &str, value: &str) {
            self.values
                .lock()
                .unwrap()
                .insert(name.to_string(), value.to_string());
        }
    }

    impl CredentialSource for Arc<MutableSource> {
        fn var(&self, name: &str) -> Option<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.values.lock().unwrap().get(name).cloned()
        }
    }

    #[test]
    fn test_resolve_complete() {
        let config = StoreConfiguration::new(StaticCredentialSource::complete("demo", "key", "secret"));
        let credentials = config.resolve_credentials().unwrap();
        assert_eq!(credentials.cloud_name(), "demo");
        assert_eq!(credentials.api_key(), "key");
        assert_eq!(credentials.api_secret(), "secret");
    }

    #[test]
    fn test_resolve_names_every_missing_value() {
        let config = StoreConfiguration::new(StaticCredentialSource::empty().with(STORE_NAME_VAR, "demo"));
        let err = config.resolve_credentials().unwrap_err();
        assert_eq!(err.missing(), &[STORE_API_KEY_VAR, STORE_API_SECRET_VAR]);
        assert_eq!(err.to_string(), "missing STORE_API_KEY, STORE_API_SECRET");
    }

    #[test]
    fn test_blank_value_is_missing() {
        let config = StoreConfiguration::new(StaticCredentialSource::complete("demo", "key", "   "));
        let err = config.resolve_credentials().unwrap_err();
        assert_eq!(err.missing(), &[STORE_API_SECRET_VAR]);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_configure_once_memoizes() {
        let source = Arc::new(MutableSource::default());
        source.set(STORE_NAME_VAR, "demo");
        source.set(STORE_API_KEY_VAR, "key");
        source.set(STORE_API_SECRET_VAR, "secret");
        let config = StoreConfiguration::new(source.clone());

        let first = config.configure_store_client_once().unwrap().clone();
        let reads = source.reads.load(Ordering::SeqCst);

        // Later changes are not observed once configured.
        source.set(STORE_NAME_VAR, "other");
        let second = config.configure_store_client_once().unwrap();

        assert_eq!(&first, second);
        assert_eq!(second.cloud_name(), "demo");
        assert_eq!(source.reads.load(Ordering::SeqCst), reads);
    }

    #[test]
    fn test_incomplete_is_rechecked() {
        let source = Arc::new(MutableSource::default());
        source.set(STORE_NAME_VAR, "demo");
        source.set(STORE_API_KEY_VAR, "key");
        let config = StoreConfiguration::new(source.clone());

        assert!(config.configure_store_client_once().is_err());
        assert!(!config.is_configured());

        source.set(STORE_API_SECRET_VAR, "secret");
        assert!(config.configure_store_client_once().is_ok());
        assert!(config.is_configured());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = StoreConfiguration::new(StaticCredentialSource::complete("demo", "key", "hunter2"));
        let credentials = config.resolve_credentials().unwrap();
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[hidden]"));
    }

    #[test]
    fn test_concurrent_first_access() {
        let config = Arc::new(StoreConfiguration::new(StaticCredentialSource::complete(
            "demo", "key", "secret",
        )));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let config = config.clone();
                std::thread::spawn(move || config.configure_store_client_once().unwrap().clone())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().cloud_name(), "demo");
        }
    }
}
