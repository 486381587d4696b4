//! Image ingestion path.
//!
//! This module provides the upload flow used by every image field in the
//! storefront admin and partner portals:
//! - Local validation (size and type)
//! - Authenticated upload to the external image endpoint
//! - Fallback to the managed object store
//! - Orchestration of the above as a single state machine per request

mod error;
mod fallback;
mod key;
mod primary;
mod service;
mod state;
mod types;
mod validation;


pub use error::ImageUploadError;
pub use fallback::{FallbackUploader, ObjectStore};
pub use key::generate_fallback_key;
pub use primary::{HttpPrimaryUploader, PrimaryUpload, PrimaryUploadError, PrimaryUploader};
pub use service::ImageUploadService;
pub use state::UploadState;
pub use types::{Provider, UploadRequest, UploadResult, UploadStatus};
pub use validation::{
    ALLOWED_IMAGE_SUBTYPES, MAX_IMAGE_BYTES, ValidationFailure, ValidationOutcome,
    canonical_content_type, validate,
};
