//! Object keys for fallback uploads.

use chrono::Utc;
use uuid::Uuid;

use super::validation::canonical_content_type;

/// Longest extension kept from the original filename.
const MAX_EXTENSION_LEN: usize = 8;

/// Generate a collision-free object key for a fallback upload.
///
/// Format: `{unix_millis}-{random}.{ext}`. The extension comes from the
/// original filename and falls back to one derived from the content type.
#[must_use]
pub fn generate_fallback_key(filename: &str, content_type: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple();
    let ext = file_extension(filename).unwrap_or_else(|| content_type_extension(content_type));

    format!("{millis}-{suffix}.{ext}")
}

/// Sanitized lowercase extension of `filename`, if it has a usable one.
fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    (!ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN).then_some(ext)
}

fn content_type_extension(content_type: &str) -> String {
    match canonical_content_type(content_type) {
        Some("image/jpeg" | "image/jpg") => "jpg",
        Some("image/png") => "png",
        Some("image/webp") => "webp",
        _ => "bin",
    }
    .to_string()
}
