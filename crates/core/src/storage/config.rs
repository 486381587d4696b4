//! Storage configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use storefront_shared::StorageSettings;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Supabase, Cloudflare R2, AWS S3
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory store
    Memory,
}

impl StorageProvider {
    /// Create S3-compatible provider (Supabase, Cloudflare R2, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Build a provider from flat settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown provider kind or a
    /// missing field required by the chosen provider.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        fn required(value: Option<&String>, field: &str) -> Result<String, StorageError> {
            value
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| StorageError::configuration(format!("storage.{field} is required")))
        }

        match settings.provider.as_str() {
            "s3" => Ok(Self::s3(
                required(settings.endpoint.as_ref(), "endpoint")?,
                required(settings.bucket.as_ref(), "bucket")?,
                required(settings.access_key_id.as_ref(), "access_key_id")?,
                required(settings.secret_access_key.as_ref(), "secret_access_key")?,
                settings.region.as_deref().unwrap_or("auto"),
            )),
            "azure_blob" => Ok(Self::azure_blob(
                required(settings.account.as_ref(), "account")?,
                required(settings.access_key.as_ref(), "access_key")?,
                required(settings.container.as_ref(), "container")?,
            )),
            "local" => Ok(Self::local_fs(required(settings.root.as_ref(), "root")?)),
            "memory" => Ok(Self::Memory),
            other => Err(StorageError::configuration(format!(
                "unknown storage provider '{other}'"
            ))),
        }
    }

    /// Get the provider name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Directory the HTTP server exposes stored objects from, and the URL path
/// it is mounted at. Only the local filesystem provider has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMount {
    /// URL path, e.g. `/uploads`.
    pub path: String,
    /// Directory objects are written into.
    pub root: PathBuf,
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Base URL under which stored objects are publicly reachable.
    pub public_base_url: String,
    /// Write timeout in seconds (default: 30).
    pub write_timeout_secs: u64,
}

impl StorageConfig {
    /// Default write timeout: 30 seconds.
    pub const DEFAULT_WRITE_TIMEOUT: u64 = 30;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider, public_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            public_base_url: public_base_url.into(),
            write_timeout_secs: Self::DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Build a config from flat settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the provider settings are invalid.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        let provider = StorageProvider::from_settings(settings)?;
        if settings.public_base_url.trim().is_empty() {
            return Err(StorageError::configuration(
                "storage.public_base_url is required",
            ));
        }
        Ok(Self::new(provider, settings.public_base_url.clone()))
    }

    /// Set write timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, secs: u64) -> Self {
        self.write_timeout_secs = secs;
        self
    }

    /// Where local filesystem objects must be served for their public URLs
    /// to resolve. `None` for remote providers, or when the public base URL
    /// has no path to mount under.
    #[must_use]
    pub fn local_mount(&self) -> Option<LocalMount> {
        let StorageProvider::LocalFs { root } = &self.provider else {
            return None;
        };

        let path = url_path(&self.public_base_url).trim_end_matches('/');
        if path.is_empty() {
            return None;
        }

        Some(LocalMount {
            path: path.to_string(),
            root: root.clone(),
        })
    }
}

/// Path component of `url`, without query or fragment.
fn url_path(url: &str) -> &str {
    let path = match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map_or("", |i| &rest[i..]),
        None => url,
    };
    path.split(['?', '#']).next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use rstest::rstest;

    fn settings(provider: &str) -> StorageSettings {
        StorageSettings {
            provider: provider.to_string(),
            public_base_url: "https://cdn.example.com/product-images".to_string(),
            ..StorageSettings::default()
        }
    }

    #[test]
    fn test_storage_provider_s3() {
        let provider = StorageProvider::s3(
            "https://project.supabase.co/storage/v1/s3",
            "product-images",
            "access_key",
            "secret_key",
            "auto",
        );
        assert_eq!(provider.name(), "s3");
        assert_eq!(provider.bucket(), "product-images");
    }

    #[test]
    fn test_storage_provider_azure() {
        let provider = StorageProvider::azure_blob("storefront", "access_key", "images");
        assert_eq!(provider.name(), "azure_blob");
        assert_eq!(provider.bucket(), "images");
    }

    #[test]
    fn test_storage_provider_local() {
        let provider = StorageProvider::local_fs("./storage");
        assert_eq!(provider.name(), "local");
    }

    #[test]
    fn test_from_settings_s3() {
        let settings = StorageSettings {
            endpoint: Some("https://project.supabase.co/storage/v1/s3".to_string()),
            bucket: Some("product-images".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..settings("s3")
        };
        let provider = StorageProvider::from_settings(&settings).expect("valid s3 settings");
        assert_eq!(provider.name(), "s3");
        assert!(matches!(provider, StorageProvider::S3 { ref region, .. } if region == "auto"));
    }

    #[test]
    fn test_from_settings_missing_field() {
        let err = StorageProvider::from_settings(&settings("s3")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "storage configuration error: storage.endpoint is required"
        );
    }

    #[test]
    fn test_from_settings_unknown_provider() {
        let err = StorageProvider::from_settings(&settings("ftp")).unwrap_err();
        assert!(matches!(err, StorageError::Configuration(_)));
    }

    #[test]
    fn test_config_from_settings_requires_public_url() {
        let mut settings = settings("memory");
        settings.public_base_url = "  ".to_string();
        assert!(StorageConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_from_settings_local() {
        let settings = StorageSettings {
            root: Some("./uploads".to_string()),
            ..settings("local")
        };
        let provider = StorageProvider::from_settings(&settings).expect("valid local settings");
        assert!(matches!(provider, StorageProvider::LocalFs { ref root } if root == Path::new("./uploads")));
    }

    #[rstest]
    #[case("http://127.0.0.1:8080/uploads", Some("/uploads"))]
    #[case("http://127.0.0.1:8080/static/uploads/", Some("/static/uploads"))]
    #[case("/uploads", Some("/uploads"))]
    #[case("http://127.0.0.1:8080", None)]
    #[case("http://127.0.0.1:8080/", None)]
    fn test_local_mount_path(#[case] base: &str, #[case] expected: Option<&str>) {
        let config = StorageConfig::new(StorageProvider::local_fs("./uploads"), base);
        let mount = config.local_mount();
        assert_eq!(mount.as_ref().map(|m| m.path.as_str()), expected);
        if let Some(mount) = mount {
            assert_eq!(mount.root, Path::new("./uploads"));
        }
    }

    #[test]
    fn test_remote_provider_has_no_local_mount() {
        let config = StorageConfig::new(
            StorageProvider::azure_blob("storefront", "access_key", "images"),
            "https://storefront.blob.core.windows.net/images",
        );
        assert!(config.local_mount().is_none());
    }

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::from_settings(&settings("memory")).expect("valid settings");
        assert_eq!(config.provider.name(), "memory");
        assert_eq!(config.write_timeout_secs, StorageConfig::DEFAULT_WRITE_TIMEOUT);
    }
}
