use crate::utils::error::{Result, TryOnError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Locator of a stored image, as sent by the client (for example
/// `/uploads/1700000000000-me.png` or `/garments/shirt-1.png`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the image relative to the public asset root.
    ///
    /// Absolute http(s) URLs contribute only their path. Anything that could
    /// climb out of the asset root (`..`, a drive prefix, NUL bytes) is rejected
    /// here, before the filesystem is touched.
    pub fn relative_path(&self) -> Result<PathBuf> {
        let raw = self.0.trim();
        if raw.contains('\0') {
            return Err(TryOnError::input(format!(
                "Image path contains null bytes: {}",
                raw
            )));
        }

        let path_part = match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url.path().to_string(),
            Ok(url) => {
                return Err(TryOnError::input(format!(
                    "Unsupported image URL scheme '{}': {}",
                    url.scheme(),
                    raw
                )))
            }
            Err(_) => raw.to_string(),
        };

        let mut relative = PathBuf::new();
        for component in Path::new(path_part.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(TryOnError::input(format!(
                        "Image path escapes the asset directory: {}",
                        raw
                    )))
                }
            }
        }

        if relative.as_os_str().is_empty() {
            return Err(TryOnError::input(format!(
                "Image path does not name a file: {}",
                raw
            )));
        }
        Ok(relative)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An [`ImageReference`] that passed the lexical containment check, paired
/// with its path under the asset root. Stores only accept this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPath {
    reference: ImageReference,
    relative: PathBuf,
}

impl AssetPath {
    pub fn resolve(reference: ImageReference) -> Result<Self> {
        let relative = reference.relative_path()?;
        Ok(Self {
            reference,
            relative,
        })
    }

    pub fn reference(&self) -> &ImageReference {
        &self.reference
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.reference.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Standard base64, padded.
    pub data: String,
}

impl EncodedImage {
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Raw JSON body of `POST /api/tryon`. Fields are optional so that a missing
/// field is reported with our own message instead of a deserializer error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TryOnPayload {
    pub user_image_url: Option<String>,
    pub garment_image_url: Option<String>,
}

/// Raw JSON body of `POST /api/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryOnRequest {
    pub user_image: AssetPath,
    pub garment_image: AssetPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelPart {
    Text(String),
    Image(EncodedImage),
}

/// Ordered parts sent to the image model in a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub parts: Vec<ModelPart>,
}

impl ModelRequest {
    /// The model is told the first image is the person and the second the
    /// garment, so the order here is part of the contract.
    pub fn try_on(prompt: &str, user_image: EncodedImage, garment_image: EncodedImage) -> Self {
        Self {
            parts: vec![
                ModelPart::Text(prompt.to_string()),
                ModelPart::Image(user_image),
                ModelPart::Image(garment_image),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}
