//! Image upload orchestrator.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::error::ImageUploadError;
use super::fallback::{FallbackUploader, ObjectStore};
use super::primary::PrimaryUploader;
use super::state::UploadState;
use super::types::{UploadRequest, UploadResult};
use super::validation::{ValidationOutcome, validate};

/// Runs the validate → external → fallback path for one image at a time.
///
/// Each call to [`upload`](Self::upload) is an independent state machine;
/// the service holds no per-request state and can be shared freely.
pub struct ImageUploadService<P, S> {
    primary: Option<Arc<P>>,
    fallback: FallbackUploader<S>,
}

impl<P: PrimaryUploader, S: ObjectStore> ImageUploadService<P, S> {
    /// Create a service that tries `primary` before the object store.
    #[must_use]
    pub fn new(primary: Arc<P>, store: Arc<S>) -> Self {
        Self {
            primary: Some(primary),
            fallback: FallbackUploader::new(store),
        }
    }

    /// Create a service that writes straight to the object store.
    #[must_use]
    pub fn fallback_only(store: Arc<S>) -> Self {
        Self {
            primary: None,
            fallback: FallbackUploader::new(store),
        }
    }

    /// Whether the external endpoint is tried.
    #[must_use]
    pub fn external_enabled(&self) -> bool {
        self.primary.is_some()
    }

    /// Validate a candidate file without uploading it.
    #[must_use]
    pub fn validate(&self, size_bytes: u64, content_type: &str) -> ValidationOutcome {
        validate(size_bytes, content_type)
    }

    /// Upload one image.
    ///
    /// `token` is the caller's identity token for the external endpoint.
    /// It is not needed when the external endpoint is disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is too large or not an accepted image type
    /// - The external endpoint is enabled and `token` is missing or blank
    /// - The fallback store write fails
    #[tracing::instrument(
        skip_all,
        fields(filename = %request.filename, size = request.size())
    )]
    pub async fn upload(
        &self,
        request: UploadRequest,
        token: Option<&str>,
    ) -> Result<UploadResult, ImageUploadError> {
        let mut run = UploadRun::default();

        run.advance(UploadState::Validating);
        if let Err(failure) = validate(request.size(), &request.content_type).into_result() {
            run.advance(UploadState::Rejected);
            debug!(reason = %failure, "Image rejected by validation");
            return Err(failure.into());
        }

        if let Some(primary) = &self.primary {
            run.advance(UploadState::UploadingPrimary);

            let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
                run.advance(UploadState::Failed);
                return Err(ImageUploadError::Unauthenticated);
            };

            match primary.upload(&request, token).await {
                Ok(upload) => {
                    run.advance(UploadState::Succeeded);
                    info!(
                        remote_provider = upload.provider.as_deref().unwrap_or("unknown"),
                        "Image stored by external endpoint"
                    );
                    return Ok(UploadResult::external(upload.url, upload.provider));
                }
                Err(e) => {
                    warn!(error = %e, "External upload failed, falling back to object store");
                }
            }
        }

        run.advance(UploadState::UploadingFallback);
        match self.fallback.upload(&request).await {
            Ok(result) => {
                run.advance(UploadState::Succeeded);
                info!(url = %result.url, "Image stored by fallback store");
                Ok(result)
            }
            Err(e) => {
                run.advance(UploadState::Failed);
                error!(error = %e, "Fallback upload failed");
                Err(e)
            }
        }
    }
}

/// State tracker for a single upload.
#[derive(Debug)]
struct UploadRun {
    state: UploadState,
}

impl Default for UploadRun {
    fn default() -> Self {
        Self {
            state: UploadState::Idle,
        }
    }
}

impl UploadRun {
    fn advance(&mut self, next: UploadState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal upload transition {:?} -> {next:?}",
            self.state
        );
        debug!(from = ?self.state, to = ?next, "Upload state transition");
        self.state = next;
    }
}
