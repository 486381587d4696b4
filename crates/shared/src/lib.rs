//! Shared errors and configuration for the storefront image service.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, ServerConfig, StorageSettings, UploadSettings};
pub use error::{AppError, AppResult};
