use crate::core::{AssetPath, AssetStore, EncodedImage};
use crate::utils::error::Result;
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use std::path::Path;

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// MIME type implied by the file extension, or [`FALLBACK_MIME_TYPE`].
pub fn mime_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}

pub async fn load_image<S: AssetStore>(store: &S, asset: &AssetPath) -> Result<EncodedImage> {
    let bytes = store.read_asset(asset).await?;

    let image = EncodedImage {
        mime_type: mime_type_for(asset.relative()).to_string(),
        data: general_purpose::STANDARD.encode(&bytes),
    };

    if !image.is_image() {
        tracing::warn!(
            "MIME type for {} is not an image type: {}; sending it anyway",
            asset,
            image.mime_type
        );
    }
    tracing::debug!(
        "Loaded image {} ({} bytes, {})",
        asset,
        bytes.len(),
        image.mime_type
    );

    Ok(image)
}
