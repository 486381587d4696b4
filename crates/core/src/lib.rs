//! Image ingestion logic for the storefront.
//!
//! A product, category or banner image goes through a single path: it is
//! validated locally, sent to the external image endpoint, and stored in
//! the managed object store when that endpoint is unavailable.
//!
//! # Modules
//!
//! - `image` - Validation, uploaders and the upload orchestrator
//! - `storage` - OpenDAL-backed object store used as the fallback

pub mod image;
pub mod storage;
