//! Image upload error types.

use storefront_shared::AppError;
use thiserror::Error;

use super::validation::ValidationFailure;

/// Terminal failures of an image upload.
///
/// Transient failures of the external endpoint are not listed here: they
/// are recovered by the fallback and never reach the caller.
#[derive(Debug, Error)]
pub enum ImageUploadError {
    /// File size exceeds maximum allowed.
    #[error("file size {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Content type not allowed.
    #[error("only jpg, jpeg, png, webp formats allowed")]
    UnsupportedType {
        /// The rejected content type.
        content_type: String,
    },

    /// No identity token for the external endpoint.
    #[error("please log in to upload")]
    Unauthenticated,

    /// Fallback store failed. Carries the store's message unchanged.
    #[error("{0}")]
    Storage(String),
}

impl ImageUploadError {
    /// Stable kind tag used in API responses.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => "too-large",
            Self::UnsupportedType { .. } => "unsupported-type",
            Self::Unauthenticated => "unauthenticated",
            Self::Storage(_) => "storage-error",
        }
    }
}

impl From<ValidationFailure> for ImageUploadError {
    fn from(failure: ValidationFailure) -> Self {
        match failure {
            ValidationFailure::TooLarge { size, max } => Self::TooLarge { size, max },
            ValidationFailure::UnsupportedType { content_type } => {
                Self::UnsupportedType { content_type }
            }
        }
    }
}

impl From<ImageUploadError> for AppError {
    fn from(err: ImageUploadError) -> Self {
        let message = err.to_string();
        match err {
            ImageUploadError::TooLarge { .. } => Self::PayloadTooLarge(message),
            ImageUploadError::UnsupportedType { .. } => Self::UnsupportedMediaType(message),
            ImageUploadError::Unauthenticated => Self::Unauthorized(message),
            ImageUploadError::Storage(_) => Self::ExternalService(message),
        }
    }
}
