//! Upload to the managed object store.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use super::error::ImageUploadError;
use super::key::generate_fallback_key;
use super::types::{UploadRequest, UploadResult};
use crate::storage::{StorageError, StorageService};

/// Object store capability needed by the fallback path.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`.
    fn put(&self, key: &str, bytes: Bytes)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Publicly reachable URL of the object under `key`.
    fn resolve_public_url(&self, key: &str) -> String;
}

impl ObjectStore for StorageService {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        self.write_object(key, bytes).await
    }

    fn resolve_public_url(&self, key: &str) -> String {
        self.public_url(key)
    }
}

/// Stores images in an `ObjectStore` under freshly generated keys.
pub struct FallbackUploader<S> {
    store: Arc<S>,
}

impl<S: ObjectStore> FallbackUploader<S> {
    /// Create a new fallback uploader.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Store the image and resolve its public URL.
    ///
    /// # Errors
    ///
    /// Returns `ImageUploadError::Storage` with the store's message if the
    /// write fails. There is no further fallback.
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadResult, ImageUploadError> {
        let key = generate_fallback_key(&request.filename, &request.content_type);

        self.store
            .put(&key, request.bytes.clone())
            .await
            .map_err(|e| ImageUploadError::Storage(e.to_string()))?;

        Ok(UploadResult::fallback(self.store.resolve_public_url(&key)))
    }
}
