pub mod account;
pub mod image_loader;
pub mod interpreter;
pub mod prompt;
pub mod tryon;
pub mod upload;

pub use crate::domain::model::{
    AssetPath, Candidate, Content, EncodedImage, ImageReference, InlineData, ModelPart,
    ModelRequest, ModelResponse, PromptFeedback, RegisterPayload, ResponsePart, TryOnPayload,
    TryOnRequest,
};
pub use crate::domain::ports::{AssetStore, ImageModel};
pub use crate::utils::error::Result;
