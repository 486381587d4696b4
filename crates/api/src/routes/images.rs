//! Image upload route.

use axum::{
    Json, Router,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use storefront_core::image::UploadRequest;
use storefront_shared::AppError;
use tracing::{info, warn};

use crate::{AppState, middleware::BearerToken, response::ApiError};

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Filename used when the client sends none.
const DEFAULT_FILENAME: &str = "upload";

/// Creates the image routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/images", post(upload_image))
}

/// POST `/images`
/// Upload one image through the external endpoint or the fallback store.
async fn upload_image(
    State(state): State<AppState>,
    token: BearerToken,
    multipart: Multipart,
) -> Response {
    let request = match read_file_field(multipart).await {
        Ok(request) => request,
        Err(e) => return ApiError(e).into_response(),
    };

    match state.images.upload(request, token.as_deref()).await {
        Ok(result) => {
            info!(
                provider = result.provider.as_str(),
                status = result.status.as_str(),
                "Image uploaded"
            );
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Image upload rejected");
            ApiError(AppError::from(e)).into_response()
        }
    }
}

/// Pull the `file` field out of the multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or(DEFAULT_FILENAME).to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(UploadRequest::new(filename, content_type, bytes));
    }

    Err(AppError::BadRequest(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
#[path = "images_tests.rs"]
mod tests;
