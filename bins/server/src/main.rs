//! Storefront image service
//!
//! Main entry point for the image upload backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_api::{AppState, ImageService, create_router};
use storefront_core::image::{HttpPrimaryUploader, ImageUploadService};
use storefront_core::storage::{StorageConfig, StorageService};
use storefront_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Create fallback object store
    let storage_config = StorageConfig::from_settings(&config.storage)?
        .with_write_timeout(config.upload.fallback_timeout_secs);
    let storage = Arc::new(StorageService::from_config(storage_config)?);
    let local_mount = storage.config().local_mount();
    if let Some(mount) = &local_mount {
        info!(
            path = %mount.path,
            root = %mount.root.display(),
            "Serving locally stored images"
        );
    }
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Fallback store configured"
    );

    // Create image upload service
    let images: ImageService = match config.upload.primary_endpoint.as_deref() {
        Some(endpoint) if config.upload.external_enabled() => {
            let primary = HttpPrimaryUploader::new(
                endpoint,
                Duration::from_secs(config.upload.primary_timeout_secs),
            )?;
            info!(endpoint = primary.endpoint(), "External image endpoint enabled");
            ImageUploadService::new(Arc::new(primary), storage)
        }
        _ => {
            info!("External image endpoint disabled, uploads go to the fallback store");
            ImageUploadService::fallback_only(storage)
        }
    };

    // Create application state
    let state = AppState {
        images: Arc::new(images),
        body_limit_bytes: config.server.body_limit_bytes,
        local_mount,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
