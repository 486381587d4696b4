//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Image upload configuration.
    #[serde(default)]
    pub upload: UploadSettings,
    /// Fallback object store configuration.
    pub storage: StorageSettings,
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
    /// Maximum accepted request body, in bytes.
    ///
    /// Kept well above the image size limit so oversize files reach the
    /// validator and get a proper `too-large` answer.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    8 * 1024 * 1024
}

/// Image upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Try the external image endpoint before the object store.
    #[serde(default = "default_use_external_storage")]
    pub use_external_storage: bool,
    /// URL of the external image endpoint.
    #[serde(default)]
    pub primary_endpoint: Option<String>,
    /// Timeout for the external endpoint call.
    #[serde(default = "default_timeout_secs")]
    pub primary_timeout_secs: u64,
    /// Timeout for the object store write.
    #[serde(default = "default_timeout_secs")]
    pub fallback_timeout_secs: u64,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            use_external_storage: default_use_external_storage(),
            primary_endpoint: None,
            primary_timeout_secs: default_timeout_secs(),
            fallback_timeout_secs: default_timeout_secs(),
        }
    }
}

impl UploadSettings {
    /// Whether the external endpoint should be tried at all.
    ///
    /// A missing endpoint disables the external path.
    #[must_use]
    pub fn external_enabled(&self) -> bool {
        self.use_external_storage
            && self
                .primary_endpoint
                .as_deref()
                .is_some_and(|url| !url.trim().is_empty())
    }
}

fn default_use_external_storage() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

/// Fallback object store configuration.
///
/// Flat on purpose so each field can be overridden through a single
/// environment variable, e.g. `STOREFRONT__STORAGE__BUCKET`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Provider kind: `s3`, `azure_blob`, `local` or `memory`.
    pub provider: String,
    /// Base URL under which stored objects are publicly reachable.
    pub public_base_url: String,
    /// S3 endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// S3 bucket name.
    #[serde(default)]
    pub bucket: Option<String>,
    /// S3 access key ID.
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// S3 region.
    #[serde(default)]
    pub region: Option<String>,
    /// Azure storage account name.
    #[serde(default)]
    pub account: Option<String>,
    /// Azure storage access key.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Azure container name.
    #[serde(default)]
    pub container: Option<String>,
    /// Root directory for the local filesystem provider.
    #[serde(default)]
    pub root: Option<String>,
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
            .add_source(config::Environment::with_prefix("STOREFRONT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
