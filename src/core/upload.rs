use crate::utils::error::{Result, TryOnError};
use chrono::{DateTime, Utc};

pub const ALLOWED_UPLOAD_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

pub const UPLOAD_DIR: &str = "uploads";

pub fn validate_upload_type(content_type: Option<&str>) -> Result<&str> {
    match content_type {
        Some(ct) if ALLOWED_UPLOAD_TYPES.contains(&ct) => Ok(ct),
        other => Err(TryOnError::UploadRejected {
            message: format!(
                "File type not allowed: {}. Allowed types: {}",
                other.unwrap_or("unknown"),
                ALLOWED_UPLOAD_TYPES.join(", ")
            ),
        }),
    }
}

/// `<unix-millis>-<name>` where `<name>` is the last path component of the
/// client's file name with whitespace replaced by `_`.
pub fn stored_filename(original: &str, now: DateTime<Utc>) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let name = if matches!(cleaned.as_str(), "" | "." | "..") {
        "upload".to_string()
    } else {
        cleaned
    };
    format!("{}-{}", now.timestamp_millis(), name)
}

pub fn public_url(filename: &str) -> String {
    format!("/{}/{}", UPLOAD_DIR, filename)
}
