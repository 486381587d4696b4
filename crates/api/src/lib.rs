//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - The image upload endpoint
//! - Static serving of locally stored images
//! - Bearer token extraction
//! - JSON error responses

pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use storefront_core::image::{HttpPrimaryUploader, ImageUploadService};
use storefront_core::storage::{LocalMount, StorageService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Image upload service as wired in production.
pub type ImageService = ImageUploadService<HttpPrimaryUploader, StorageService>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Image ingestion path.
    pub images: Arc<ImageService>,
    /// Maximum accepted request body, in bytes.
    pub body_limit_bytes: usize,
    /// Directory to serve stored images from when the fallback store is
    /// the local filesystem.
    pub local_mount: Option<LocalMount>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new().nest("/api/v1", routes::api_routes());

    if let Some(mount) = &state.local_mount {
        router = router.nest_service(&mount.path, ServeDir::new(&mount.root));
    }

    router
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
