//! Local image validation.
//!
//! Runs before any network call. A file that fails here never reaches
//! either uploader.

use thiserror::Error;

/// Largest accepted image: 1 MiB.
pub const MAX_IMAGE_BYTES: u64 = 1024 * 1024;

/// Accepted image subtypes.
pub const ALLOWED_IMAGE_SUBTYPES: [&str; 4] = ["jpeg", "jpg", "png", "webp"];

/// Reason a file was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// File exceeds `MAX_IMAGE_BYTES`.
    #[error("file size {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Content type outside the allow-set.
    #[error("only jpg, jpeg, png, webp formats allowed, got '{content_type}'")]
    UnsupportedType {
        /// The rejected content type.
        content_type: String,
    },
}

/// Local pass/fail judgment on a candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// File may be uploaded.
    Pass,
    /// File must be rejected.
    Fail(ValidationFailure),
}

impl ValidationOutcome {
    /// Whether the file passed validation.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Convert into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the failure reason when validation failed.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        match self {
            Self::Pass => Ok(()),
            Self::Fail(failure) => Err(failure),
        }
    }
}

/// Validate a candidate image by size and declared content type.
///
/// Size is checked first.
#[must_use]
pub fn validate(size_bytes: u64, content_type: &str) -> ValidationOutcome {
    if size_bytes > MAX_IMAGE_BYTES {
        return ValidationOutcome::Fail(ValidationFailure::TooLarge {
            size: size_bytes,
            max: MAX_IMAGE_BYTES,
        });
    }

    if canonical_content_type(content_type).is_none() {
        return ValidationOutcome::Fail(ValidationFailure::UnsupportedType {
            content_type: content_type.to_string(),
        });
    }

    ValidationOutcome::Pass
}

/// Canonical MIME type for an accepted image content type.
///
/// Accepts `image/<subtype>` or a bare subtype, case-insensitively, and
/// ignores parameters after `;`. Returns `None` for anything else.
#[must_use]
pub fn canonical_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let subtype = match essence.split_once('/') {
        Some(("image", subtype)) => subtype,
        Some(_) => return None,
        None => essence.as_str(),
    };

    match subtype {
        "jpeg" => Some("image/jpeg"),
        "jpg" => Some("image/jpg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/jpeg")]
    #[case("image/jpg")]
    #[case("image/png")]
    #[case("image/webp")]
    #[case("IMAGE/PNG")]
    #[case("image/webp; q=0.9")]
    #[case("png")]
    fn test_accepts_allowed_types(#[case] content_type: &str) {
        assert_eq!(validate(1024, content_type), ValidationOutcome::Pass);
    }

    #[rstest]
    #[case("image/gif")]
    #[case("image/svg+xml")]
    #[case("application/pdf")]
    #[case("text/png")]
    #[case("")]
    fn test_rejects_other_types(#[case] content_type: &str) {
        assert_eq!(
            validate(1024, content_type),
            ValidationOutcome::Fail(ValidationFailure::UnsupportedType {
                content_type: content_type.to_string()
            })
        );
    }

    #[test]
    fn test_size_boundary() {
        assert!(validate(MAX_IMAGE_BYTES, "image/png").is_pass());
        assert_eq!(
            validate(MAX_IMAGE_BYTES + 1, "image/png"),
            ValidationOutcome::Fail(ValidationFailure::TooLarge {
                size: MAX_IMAGE_BYTES + 1,
                max: MAX_IMAGE_BYTES,
            })
        );
    }

    #[test]
    fn test_size_checked_before_type() {
        let outcome = validate(MAX_IMAGE_BYTES * 2, "application/pdf");
        assert!(matches!(
            outcome,
            ValidationOutcome::Fail(ValidationFailure::TooLarge { .. })
        ));
    }

    #[test]
    fn test_canonical_content_type() {
        assert_eq!(canonical_content_type(" Image/JPEG "), Some("image/jpeg"));
        assert_eq!(canonical_content_type("webp"), Some("image/webp"));
        assert_eq!(canonical_content_type("image/bmp"), None);
    }

    #[test]
    fn test_into_result() {
        assert!(validate(10, "image/png").into_result().is_ok());
        assert!(validate(10, "image/gif").into_result().is_err());
    }
}
