// Adapters layer: concrete implementations for external systems (disk, image model, database).

pub mod catalog;
pub mod gemini;
pub mod storage;

pub use catalog::{Catalog, Garment, NewGarment, User, UserImage};
pub use gemini::{GeminiClient, GeminiSettings};
pub use storage::LocalAssetStore;
