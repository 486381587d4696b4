//! Image upload types and data structures.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// System that ultimately persisted the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// External image endpoint.
    External,
    /// Managed object store used as fallback.
    FallbackStore,
}

impl Provider {
    /// Wire name of the provider.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::FallbackStore => "fallback-store",
        }
    }
}

/// How the upload completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// Stored by the preferred path.
    Ok,
    /// Stored by the fallback path.
    Fallback,
}

impl UploadStatus {
    /// Wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Fallback => "fallback",
        }
    }
}

/// A single image handed over by the caller.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename as selected by the user.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl UploadRequest {
    /// Create a new upload request.
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Publicly reachable URL of the stored image.
    pub url: String,
    /// Where the image was stored.
    pub provider: Provider,
    /// Whether the preferred path was used.
    pub status: UploadStatus,
    /// Provider name reported by the external endpoint (e.g. `cloudinary`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_provider: Option<String>,
}

impl UploadResult {
    /// Result of a successful external upload.
    #[must_use]
    pub fn external(url: impl Into<String>, remote_provider: Option<String>) -> Self {
        Self {
            url: url.into(),
            provider: Provider::External,
            status: UploadStatus::Ok,
            remote_provider,
        }
    }

    /// Result of a successful fallback upload.
    #[must_use]
    pub fn fallback(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            provider: Provider::FallbackStore,
            status: UploadStatus::Fallback,
            remote_provider: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_size() {
        let req = UploadRequest::new("banner.webp", "image/webp", vec![0u8; 2048]);
        assert_eq!(req.size(), 2048);
    }

    #[test]
    fn test_result_constructors() {
        let ext = UploadResult::external("https://img.example.com/x.png", Some("cloudinary".into()));
        assert_eq!(ext.provider, Provider::External);
        assert_eq!(ext.status, UploadStatus::Ok);

        let fb = UploadResult::fallback("https://cdn.example.com/x.png");
        assert_eq!(fb.provider, Provider::FallbackStore);
        assert_eq!(fb.status, UploadStatus::Fallback);
        assert!(fb.remote_provider.is_none());
    }

    #[test]
    fn test_wire_names_match_serde() {
        for provider in [Provider::External, Provider::FallbackStore] {
            let json = serde_json::to_value(provider).expect("serialize");
            assert_eq!(json, provider.as_str());
        }
        for status in [UploadStatus::Ok, UploadStatus::Fallback] {
            let json = serde_json::to_value(status).expect("serialize");
            assert_eq!(json, status.as_str());
        }
    }
}
