//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object not found in storage.
    #[error("object not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Write did not complete within the configured timeout.
    #[error("storage write timed out after {secs}s")]
    Timeout {
        /// Configured timeout in seconds.
        secs: u64,
    },

    /// Provider-side failure. The provider's message is kept as is.
    #[error("{0}")]
    Operation(String),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl StorageError {
    /// Map an OpenDAL failure on `key`, keeping the provider's message.
    pub(crate) fn from_opendal(err: &opendal::Error, key: &str) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::not_found(key),
            _ => Self::Operation(provider_message(err)),
        }
    }
}

/// The message the provider reported, without OpenDAL's
/// `kind (status) at operation, context: {..} => ` prefix or its
/// `, source: ..` suffix.
fn provider_message(err: &opendal::Error) -> String {
    let rendered = err.to_string();
    let without_source = match std::error::Error::source(err) {
        Some(source) => rendered
            .strip_suffix(format!(", source: {source}").as_str())
            .unwrap_or(&rendered),
        None => &rendered,
    };

    match without_source.split_once(" => ") {
        Some((_, message)) => message.to_string(),
        None => err.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_message_is_verbatim() {
        let err = StorageError::operation("The resource already exists");
        assert_eq!(err.to_string(), "The resource already exists");
    }

    #[test]
    fn test_from_opendal_strips_prefix() {
        let err = opendal::Error::new(
            opendal::ErrorKind::PermissionDenied,
            "new row violates row-level security policy",
        )
        .with_operation("write")
        .with_context("path", "a.png");

        let mapped = StorageError::from_opendal(&err, "a.png");
        assert_eq!(
            mapped.to_string(),
            "new row violates row-level security policy"
        );
    }

    #[test]
    fn test_from_opendal_not_found_uses_key() {
        let err = opendal::Error::new(opendal::ErrorKind::NotFound, "file not found");

        let mapped = StorageError::from_opendal(&err, "1718000000000-abc.png");
        assert!(
            matches!(mapped, StorageError::NotFound { ref key } if key == "1718000000000-abc.png")
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = StorageError::Timeout { secs: 30 };
        assert_eq!(err.to_string(), "storage write timed out after 30s");
    }
}
