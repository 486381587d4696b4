//! Storage service implementation using Apache OpenDAL.

use std::time::Duration;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Object store used for fallback image uploads.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                finish(builder)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                finish(builder)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                finish(builder)
            }
            StorageProvider::Memory => finish(services::Memory::default()),
        }
    }

    /// Write an object under `key`, bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, or `Timeout` if the write stalls.
    pub async fn write_object(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        let secs = self.config.write_timeout_secs;

        match tokio::time::timeout(Duration::from_secs(secs), self.operator.write(key, bytes))
            .await
        {
            Ok(written) => written
                .map(|_| ())
                .map_err(|e| StorageError::from_opendal(&e, key)),
            Err(_) => Err(StorageError::Timeout { secs }),
        }
    }

    /// Public URL of the object stored under `key`.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    /// Size in bytes of a stored object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be accessed.
    pub async fn object_size(&self, key: &str) -> Result<u64, StorageError> {
        let meta = self
            .operator
            .stat(key)
            .await
            .map_err(|e| StorageError::from_opendal(&e, key))?;
        Ok(meta.content_length())
    }

    /// Check if an object exists in storage.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Turn a configured OpenDAL builder into an operator.
fn finish<B: opendal::Builder>(builder: B) -> Result<Operator, StorageError> {
    Operator::new(builder)
        .map(|op| op.finish())
        .map_err(|e| StorageError::configuration(e.to_string()))
}
