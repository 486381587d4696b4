//! Object storage for fallback image uploads using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: Supabase Storage, Cloudflare R2, AWS S3
//! - Azure Blob Storage
//! - Local filesystem (development only)
//! - In-memory (tests and demos)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("key", data)      │ public_base_url + "/" + key        │
//! │ op.stat("key")             │                                    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{LocalMount, StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::StorageService;
