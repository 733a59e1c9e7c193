use crate::core::{AssetPath, AssetStore, ImageReference};
use crate::utils::error::{Result, TryOnError};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Public asset tree on local disk (uploads and catalog garments).
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
    max_image_bytes: u64,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, max_image_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_image_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Reads at most `limit + 1` bytes, so a result longer than `limit` means the
/// file is over the ceiling no matter what its metadata said earlier.
async fn read_capped(path: &Path, limit: u64) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut data = Vec::new();
    file.take(limit.saturating_add(1))
        .read_to_end(&mut data)
        .await?;
    Ok(data)
}

impl AssetStore for LocalAssetStore {
    async fn read_asset(&self, asset: &AssetPath) -> Result<Vec<u8>> {
        let reference = asset.reference();
        let unreadable = |e: std::io::Error| {
            tracing::error!("Failed to read asset {}: {}", reference, e);
            TryOnError::asset(reference.as_str(), e.to_string())
        };

        let root = tokio::fs::canonicalize(&self.root).await.map_err(unreadable)?;
        let full_path = tokio::fs::canonicalize(root.join(asset.relative()))
            .await
            .map_err(unreadable)?;

        // symlinks inside the tree must not lead outside it
        if !full_path.starts_with(&root) {
            return Err(TryOnError::input(format!(
                "Image path escapes the asset directory: {}",
                reference
            )));
        }

        let metadata = tokio::fs::metadata(&full_path).await.map_err(unreadable)?;
        if !metadata.is_file() {
            return Err(TryOnError::asset(reference.as_str(), "not a regular file"));
        }
        let too_large = |size: u64| {
            TryOnError::asset(
                reference.as_str(),
                format!(
                    "file is {} bytes, limit is {} bytes",
                    size, self.max_image_bytes
                ),
            )
        };
        if metadata.len() > self.max_image_bytes {
            return Err(too_large(metadata.len()));
        }

        tracing::debug!("Reading asset {}", full_path.display());
        let data = read_capped(&full_path, self.max_image_bytes)
            .await
            .map_err(unreadable)?;
        // the file grew after the metadata check
        if data.len() as u64 > self.max_image_bytes {
            return Err(too_large(data.len() as u64));
        }
        Ok(data)
    }

    async fn write_asset(&self, relative_path: &str, data: &[u8]) -> Result<()> {
        let asset = AssetPath::resolve(ImageReference::new(relative_path))?;
        let full_path = self.root.join(asset.relative());

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}
